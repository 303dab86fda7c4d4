//! Task queue page and task delete

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use scriptorium_common::client::TaskQuery;
use scriptorium_common::progress::relevant_id;
use scriptorium_common::timestamp::format_timestamp;
use tracing::{error, info};

use super::layout::{self, escape, segment, status_badge, Flash, Nav};
use crate::error::{UiError, UiResult};
use crate::AppState;

/// GET /tasks
pub async fn task_list(
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> UiResult<Html<String>> {
    let tasks = state
        .client
        .list_tasks(&TaskQuery::default())
        .await
        .map_err(UiError::backend("Failed to fetch tasks."))?;

    let rows: String = tasks
        .iter()
        .map(|task| {
            format!(
                r#"<tr>
    <td><a href="/tasks/{href}">{id}</a></td>
    <td class="capitalize">{kind}</td>
    <td>{badge}</td>
    <td>{created}</td>
</tr>"#,
                href = segment(&task.id),
                id = escape(&relevant_id(task)),
                kind = task.kind,
                badge = status_badge(task.status),
                created = format_timestamp(Some(&task.created_at), ""),
            )
        })
        .collect();

    let body = format!(
        r#"{flash}
<h1>Task Queue</h1>
<div class="card flush">
    <table class="tasks">
        <thead>
            <tr><th>Identifier</th><th>Kind</th><th>Status</th><th>Created At</th></tr>
        </thead>
        <tbody>{rows}</tbody>
    </table>
</div>"#,
        flash = flash.render(),
    );

    Ok(layout::page("Tasks", Nav::Tasks, &body))
}

/// POST /tasks/:id/delete
pub async fn delete_task(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    match state.client.delete_task(&id).await {
        Ok(()) => {
            info!(task_id = %id, "Task deleted");
            layout::redirect_notice("/tasks", "Task deleted.")
        }
        Err(e) => {
            error!(task_id = %id, error = %e, "Task delete failed");
            layout::redirect_error(&format!("/tasks/{}", segment(&id)), "Failed to delete task.")
        }
    }
}
