//! Project details page, extract task trigger and draft download

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use scriptorium_common::client::{DraftQuery, TaskQuery};
use scriptorium_common::model::{Draft, ExtractTaskCreate, Task, TaskKind};
use scriptorium_common::progress::{
    best_checkpoint, drafts_for_experiment, sort_tasks_by_created,
};
use scriptorium_common::timestamp::format_timestamp;
use tracing::{error, info, warn};

use super::layout::{self, escape, segment, status_badge, Flash, Nav};
use super::widgets;
use crate::error::{UiError, UiResult};
use crate::AppState;

const NOT_EXTRACTED_TITLE: &str = "You cannot create a new task for a project that has not been extracted. No scripture file was found associated with this project.";

/// GET /projects/:id
///
/// Project, drafts, scripture and tasks are fetched concurrently. Only a
/// failed project fetch fails the page; the others degrade to a banner.
pub async fn project_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(flash): Query<Flash>,
) -> UiResult<Html<String>> {
    let client = &state.client;
    let draft_query = DraftQuery {
        project_id: Some(id.clone()),
        experiment_name: None,
    };
    let task_query = TaskQuery::for_project(id.clone());

    let (project, drafts, scriptures, tasks) = tokio::join!(
        client.get_project(&id),
        client.list_drafts(&draft_query),
        client.list_scriptures(Some(&id), 0, 100),
        client.list_tasks(&task_query),
    );

    let project = project.map_err(UiError::backend("Failed to fetch project details."))?;

    let mut banners = flash.render();
    let drafts = drafts.unwrap_or_else(|e| {
        error!(project_id = %id, error = %e, "Failed to fetch drafts");
        banners.push_str(&layout::warning_banner("Failed to fetch drafts."));
        Vec::new()
    });
    let scripture = match scriptures {
        Ok(list) => list.into_iter().next(),
        Err(e) => {
            error!(project_id = %id, error = %e, "Failed to fetch scripture");
            banners.push_str(&layout::warning_banner("Failed to fetch scriptures."));
            None
        }
    };
    let mut tasks = tasks.unwrap_or_else(|e| {
        error!(project_id = %id, error = %e, "Failed to fetch tasks");
        banners.push_str(&layout::warning_banner("Failed to fetch tasks."));
        Vec::new()
    });
    sort_tasks_by_created(&mut tasks);

    let href = segment(&project.id);

    let scripture_note = match &scripture {
        Some(s) => format!(
            r#"<span class="muted">(scripture file: <a href="/scriptures/{}">{}</a>)</span>"#,
            segment(&s.id),
            escape(&s.id)
        ),
        None => String::new(),
    };

    let extract_section = if scripture.is_none() {
        format!(
            r#"<section class="card">
    <p class="text-error">We could not find a scripture file. Have you extracted this project?</p>
    <form method="post" action="/projects/{href}/extract">
        <button type="submit">Create Extract Task</button>
    </form>
</section>"#
        )
    } else {
        String::new()
    };

    let new_task = if scripture.is_some() {
        format!(r#"<a class="button" href="/projects/{href}/tasks/new">New Task</a>"#)
    } else {
        format!(
            r#"<button type="button" disabled title="{}">New Task</button>"#,
            escape(NOT_EXTRACTED_TITLE)
        )
    };

    let download = if drafts.is_empty() {
        String::new()
    } else {
        format!(r#"<a class="button" href="/projects/{href}/download_drafts">Download Drafts</a>"#)
    };

    let cards: String = tasks.iter().map(|t| task_card(t, &drafts)).collect();

    let body = format!(
        r#"{banners}
<div class="page-header">
    <a class="back" href="/">&larr;</a>
    <div>
        <h1>Project Details: {name}</h1>
        <strong>{full_name}</strong> {scripture_note}
    </div>
    <form method="post" action="/projects/{href}/delete" data-confirm="Delete project {name}?">
        <button type="submit" class="danger">Delete Project</button>
    </form>
</div>
{extract_section}
<section>
    <div class="section-header">
        <h2>Tasks</h2>
        {new_task}
        {download}
    </div>
    <div class="grid">{cards}</div>
</section>"#,
        name = escape(&project.name),
        full_name = escape(&project.full_name),
    );

    Ok(layout::page(&project.name, Nav::Projects, &body))
}

fn task_card(task: &Task, drafts: &[Draft]) -> String {
    if task.kind == TaskKind::Train {
        return train_task_card(task, drafts);
    }

    let experiment = task
        .experiment_name()
        .map(|name| format!(r#"<div class="small">{}</div>"#, escape(name)))
        .unwrap_or_default();

    format!(
        r#"<div class="card task-card">
    <div class="card-title"><a href="/tasks/{href}">{kind}</a> {badge}</div>
    {experiment}
    {times}
</div>"#,
        href = segment(&task.id),
        kind = task.kind,
        badge = status_badge(task.status),
        times = task_times(task),
    )
}

/// Best-BLEU checkpoint beside that experiment's drafts; nothing without results
fn train_task_card(task: &Task, drafts: &[Draft]) -> String {
    let Some(params) = task.train_params() else {
        return String::new();
    };
    let Some(results) = params.results.as_ref() else {
        return String::new();
    };
    let Some((checkpoint, metrics)) = best_checkpoint(results) else {
        return String::new();
    };

    let metric = |name: &str| match metrics.get(name) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => "undefined".to_string(),
        Some(other) => other.to_string(),
    };

    let experiment_drafts = drafts_for_experiment(drafts, &params.experiment_name);

    format!(
        r#"<div class="card task-card train">
    <div class="card-split">
        <div>
            <div class="card-title"><a href="/tasks/{href}">{kind}</a> {badge}</div>
            <p><strong>{experiment}</strong></p>
            <div class="checkpoint">
                <p class="muted">{checkpoint}</p>
                <p><strong>BLEU:</strong> {bleu}</p>
                <p><strong>ChrF3:</strong> {chrf3}</p>
            </div>
            {times}
        </div>
        {drafts}
    </div>
</div>"#,
        href = segment(&task.id),
        kind = task.kind,
        badge = status_badge(task.status),
        experiment = escape(&params.experiment_name),
        checkpoint = escape(checkpoint),
        bleu = escape(&metric("BLEU")),
        chrf3 = escape(&metric("chrF3")),
        times = task_times(task),
        drafts = widgets::draft_groups(&experiment_drafts),
    )
}

fn task_times(task: &Task) -> String {
    format!(
        r#"<p><strong>Created:</strong> {}</p>
    <p><strong>Started:</strong> {}</p>
    <p><strong>Ended:</strong> {}</p>"#,
        format_timestamp(Some(&task.created_at), ""),
        format_timestamp(task.started_at.as_deref(), ""),
        format_timestamp(task.ended_at.as_deref(), ""),
    )
}

/// POST /projects/:id/extract
pub async fn create_extract_task(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    let back = format!("/projects/{}", segment(&id));
    let body = ExtractTaskCreate {
        project_id: id.clone(),
    };

    match state.client.create_extract_task(&body).await {
        Ok(task) => {
            info!(project_id = %id, task_id = %task.id, "Extract task created");
            layout::redirect_notice(&back, "Extract task created successfully!")
        }
        Err(e) => {
            error!(project_id = %id, error = %e, "Extract task creation failed");
            layout::redirect_error(&back, "Failed to create extract task.")
        }
    }
}

/// GET /projects/:id/download_drafts
///
/// Streams the backend's zip back as an attachment.
pub async fn download_drafts(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.client.download_project_drafts(&id).await {
        Ok(download) => {
            let content_type = if download.content_type.is_empty() {
                "application/zip".to_string()
            } else {
                download.content_type
            };
            let disposition = format!("attachment; filename=\"{}_drafts.zip\"", id.replace('"', ""));
            info!(project_id = %id, bytes = download.bytes.len(), "Drafts downloaded");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                download.bytes,
            )
                .into_response()
        }
        Err(e) => {
            warn!(project_id = %id, error = %e, "Draft download failed");
            layout::redirect_error(&format!("/projects/{}", segment(&id)), "Failed to download drafts.")
                .into_response()
        }
    }
}
