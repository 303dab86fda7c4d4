//! Project list, upload and delete

use axum::{
    extract::{Multipart, Path, Query, State},
    response::{Html, Redirect},
};
use scriptorium_common::client::UploadFile;
use scriptorium_common::progress::filter_projects;
use scriptorium_common::Error;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::layout::{self, escape, segment, Flash, Nav};
use crate::error::{UiError, UiResult};
use crate::AppState;

const NO_FILES: &str = "Please select a folder to upload. A 'Settings.xml' is required.";
const UPLOAD_FAILED: &str = "Failed to create project. Please check the files and try again.";

#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /
pub async fn project_list(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
    Query(flash): Query<Flash>,
) -> UiResult<Html<String>> {
    let projects = state
        .client
        .list_projects(0, 1000)
        .await
        .map_err(UiError::backend("Failed to fetch projects."))?;

    let cards: String = filter_projects(&projects, &query.q)
        .into_iter()
        .map(|p| {
            format!(
                r#"<div class="card project-card">
    <h2><a href="/projects/{href}">{name}</a></h2>
    <p class="muted">{full_name}</p>
    <p><strong>Language:</strong> {lang} ({iso})</p>
    <p class="truncate"><strong>ID:</strong> {id}</p>
</div>"#,
                href = segment(&p.id),
                name = escape(&p.name),
                full_name = escape(&p.full_name),
                lang = escape(&p.lang),
                iso = escape(&p.iso_code),
                id = escape(&p.id),
            )
        })
        .collect();

    let body = format!(
        r#"{flash}
<section class="card">
    <h2>Upload a Project Folder</h2>
    <form method="post" action="/projects" enctype="multipart/form-data">
        <label for="files">Select Project Folder (containing Settings.xml)</label>
        <input type="file" id="files" name="files" webkitdirectory directory multiple>
        <p class="hint">Click "Choose Files" and select the project folder containing all your project files</p>
        <button type="submit">Create Project</button>
    </form>
</section>
<div class="page-header">
    <h1>Paratext Projects</h1>
    <form method="get" action="/">
        <input type="text" name="q" value="{q}" placeholder="Search for Projects...">
    </form>
</div>
<div class="grid">{cards}</div>"#,
        flash = flash.render(),
        q = escape(&query.q),
    );

    Ok(layout::page("Projects", Nav::Projects, &body))
}

/// POST /projects
///
/// Forwards every file part to the backend, keeping the browser-supplied
/// relative path as the part's file name.
pub async fn upload_project(State(state): State<AppState>, mut multipart: Multipart) -> Redirect {
    let mut files = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed upload: {}", e);
                return layout::redirect_error("/", UPLOAD_FAILED);
            }
        };

        let Some(relative_path) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string)
        else {
            continue;
        };

        match field.bytes().await {
            Ok(bytes) => files.push(UploadFile {
                relative_path,
                bytes: bytes.to_vec(),
            }),
            Err(e) => {
                warn!("Failed to read uploaded file {}: {}", relative_path, e);
                return layout::redirect_error("/", UPLOAD_FAILED);
            }
        }
    }

    if files.is_empty() {
        return layout::redirect_error("/", NO_FILES);
    }

    let count = files.len();
    match state.client.create_project(files).await {
        Ok(project) => {
            info!(project_id = %project.id, files = count, "Project created");
            layout::redirect_notice("/", &format!("Project \"{}\" created successfully!", project.name))
        }
        Err(Error::Decode(e)) => {
            warn!("Project created but response not decodable: {}", e);
            layout::redirect_notice("/", "Project \"unknown name\" created successfully!")
        }
        Err(e) => {
            error!(error = %e, files = count, "Project upload failed");
            layout::redirect_error("/", UPLOAD_FAILED)
        }
    }
}

/// POST /projects/:id/delete
pub async fn delete_project(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    match state.client.delete_project(&id).await {
        Ok(()) => {
            info!(project_id = %id, "Project deleted");
            layout::redirect_notice("/", &format!("Project \"{}\" deleted.", id))
        }
        Err(e) => {
            error!(project_id = %id, error = %e, "Project delete failed");
            layout::redirect_error(
                &format!("/projects/{}", segment(&id)),
                "Failed to delete project.",
            )
        }
    }
}
