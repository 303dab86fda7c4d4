//! Dashboard pages
//!
//! Every page is rendered server-side from fresh backend data. Form actions
//! are POSTs that redirect back with a flash message in the query string.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::AppState;

mod draft_form;
pub mod layout;
mod project_details;
mod projects;
mod scriptures;
mod static_assets;
mod task_details;
mod task_form;
mod tasks;
mod widgets;

/// Uploaded Paratext folders can be large
const UPLOAD_BODY_LIMIT: usize = 256 * 1024 * 1024;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::project_list))
        .route(
            "/projects",
            post(projects::upload_project).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/projects/:id", get(project_details::project_details))
        .route("/projects/:id/delete", post(projects::delete_project))
        .route("/projects/:id/extract", post(project_details::create_extract_task))
        .route(
            "/projects/:id/download_drafts",
            get(project_details::download_drafts),
        )
        .route("/projects/:id/tasks/new", get(task_form::new_task_form))
        .route("/projects/:id/tasks", post(task_form::create_task))
        .route("/tasks", get(tasks::task_list))
        .route("/tasks/:id", get(task_details::task_details))
        .route("/tasks/:id/delete", post(tasks::delete_task))
        .route("/tasks/:id/drafts/new", get(draft_form::new_draft_form))
        .route("/tasks/:id/drafts", post(draft_form::create_draft))
        .route("/scriptures", get(scriptures::scripture_list))
        .route("/scriptures/:id", get(scriptures::scripture_details))
        .route("/static/dashboard.css", get(static_assets::serve_css))
        .route("/static/selector.js", get(static_assets::serve_selector_js))
}
