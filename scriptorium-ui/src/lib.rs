//! scriptorium-ui library - pipeline dashboard
//!
//! Server-rendered HTML over the pipeline backend's REST API. The dashboard
//! holds no state of its own: every page fetches what it shows, and every
//! action is forwarded to the backend.

use axum::Router;
use scriptorium_common::config::DashboardConfig;
use scriptorium_common::ApiClient;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Backend REST client
    pub client: ApiClient,
    /// Effective configuration, shown on the health page
    pub config: DashboardConfig,
}

impl AppState {
    pub fn new(client: ApiClient, config: DashboardConfig) -> Self {
        Self { client, config }
    }

    /// State for an already-resolved config
    pub fn from_config(config: DashboardConfig) -> scriptorium_common::Result<Self> {
        let client = ApiClient::from_config(&config)?;
        Ok(Self::new(client, config))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
