//! Error types for scriptorium-ui
//!
//! Page handlers fail with a `UiError`, which renders as a full HTML page
//! carrying the user-facing message. The underlying backend error is logged,
//! never shown.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ui::layout::{self, Nav};

/// Page-level error
#[derive(Debug, Error)]
pub enum UiError {
    /// A backend call failed; `message` is what the operator sees
    #[error("{message}")]
    Backend {
        message: &'static str,
        #[source]
        source: scriptorium_common::Error,
    },

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),
}

/// Result type for page handlers
pub type UiResult<T> = Result<T, UiError>;

impl UiError {
    /// Adapter for `map_err`: attach the user-facing message to a backend error
    pub fn backend(message: &'static str) -> impl FnOnce(scriptorium_common::Error) -> UiError {
        move |source| UiError::Backend { message, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            UiError::Backend { source, .. } if source.is_not_found() => StatusCode::NOT_FOUND,
            UiError::Backend { .. } => StatusCode::BAD_GATEWAY,
            UiError::NotFound(_) => StatusCode::NOT_FOUND,
            UiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for UiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            UiError::Backend { message, source } => {
                tracing::error!(error = %source, status = status.as_u16(), "{}", message);
            }
            other => tracing::warn!(status = status.as_u16(), "{}", other),
        }

        let body = format!(
            r#"<section class="card error-page">
    {banner}
    <p><a href="/">Back to Projects</a></p>
</section>"#,
            banner = layout::error_banner(&self.to_string()),
        );

        (status, layout::page("Error", Nav::None, &body)).into_response()
    }
}
