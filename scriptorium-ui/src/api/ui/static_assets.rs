//! Embedded stylesheet and selector script

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

const DASHBOARD_CSS: &str = include_str!("../../../static/dashboard.css");
const SELECTOR_JS: &str = include_str!("../../../static/selector.js");

/// GET /static/dashboard.css
pub async fn serve_css() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        DASHBOARD_CSS,
    )
        .into_response()
}

/// GET /static/selector.js
///
/// Turns drag-and-drop between selector zones into `drop:` ops and wires up
/// delete confirmations. Every page works without it.
pub async fn serve_selector_js() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript")],
        SELECTOR_JS,
    )
        .into_response()
}
