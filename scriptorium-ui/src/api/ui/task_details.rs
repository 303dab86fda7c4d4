//! Task details page with kind-specific results

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use scriptorium_common::books::parse_corpus;
use scriptorium_common::client::DraftQuery;
use scriptorium_common::model::{AlignTaskParams, Task, TaskParams, TrainTaskParams};
use scriptorium_common::progress::{CompletionReport, ResultTable};
use scriptorium_common::timestamp::format_timestamp;
use scriptorium_common::ApiClient;
use tracing::{error, warn};

use super::layout::{self, escape, segment, status_badge, Flash, Nav};
use super::widgets;
use crate::error::{UiError, UiResult};
use crate::AppState;

fn card(header: &str, content: &str) -> String {
    format!(
        r#"<section>
    <h2>{}</h2>
    <div class="card scroll">{}</div>
</section>"#,
        escape(header),
        content
    )
}

/// GET /tasks/:id
pub async fn task_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(flash): Query<Flash>,
) -> UiResult<Html<String>> {
    let task = state
        .client
        .get_task(&id)
        .await
        .map_err(UiError::backend("Failed to fetch task details."))?;

    let results = match task.typed_parameters() {
        Ok(TaskParams::Align(params)) => align_results(&params),
        Ok(TaskParams::Train(params)) => train_results(&state.client, &task, &params).await,
        Ok(_) => card(
            "Results",
            &escape(&format!(
                "Results display for task.kind (=\"{}\") not implemented",
                task.kind
            )),
        ),
        Err(e) => {
            warn!(task_id = %task.id, error = %e, "Task parameters not decodable");
            layout::warning_banner("Task parameters could not be decoded. See the raw data below.")
        }
    };

    let experiment = task
        .experiment_name()
        .map(|name| format!(r#"<div class="subtitle">{}</div>"#, escape(name)))
        .unwrap_or_default();

    let raw = serde_json::to_string_pretty(&task.parameters).unwrap_or_default();

    let body = format!(
        r#"{flash}
<div class="page-header">
    <a class="back" href="/tasks">&larr;</a>
    <div>
        <h1>Task Details: {kind}</h1>
        <div><strong>Status:</strong> {badge}</div>
        {experiment}
    </div>
    <form method="post" action="/tasks/{href}/delete" data-confirm="Delete this task?">
        <button type="submit" class="danger">Delete Task</button>
    </form>
</div>
<section>
    <h2>Task Information</h2>
    <div class="card">
        <p><strong>Created:</strong> {created}</p>
        <p><strong>Started:</strong> {started}</p>
        <p><strong>Ended:</strong> {ended}</p>
        <p><strong>Error:</strong> {error}</p>
    </div>
</section>
{results}
<section>
    <details>
        <summary>Raw Data</summary>
        <pre class="card">{raw}</pre>
    </details>
</section>"#,
        flash = flash.render(),
        kind = task.kind,
        badge = status_badge(task.status),
        href = segment(&task.id),
        created = format_timestamp(Some(&task.created_at), ""),
        started = format_timestamp(task.started_at.as_deref(), "Not started"),
        ended = format_timestamp(task.ended_at.as_deref(), "N/A"),
        error = escape(task.error.as_deref().filter(|e| !e.is_empty()).unwrap_or("N/A")),
        raw = escape(&raw),
    );

    Ok(layout::page(
        &format!("Task {}", task.kind),
        Nav::Tasks,
        &body,
    ))
}

fn align_results(params: &AlignTaskParams) -> String {
    match &params.results {
        Some(rows) => card("Results", &widgets::result_table(&ResultTable::from_align(rows))),
        None => card("No Results", ""),
    }
}

/// Results, source data with book completion, and drafts for a train task
///
/// The target scripture and the experiment's drafts are fetched concurrently;
/// either failing only blanks its part of the page.
async fn train_results(client: &ApiClient, task: &Task, params: &TrainTaskParams) -> String {
    let Some(results) = &params.results else {
        return "<section>No results</section>".to_string();
    };

    let draft_query = DraftQuery {
        project_id: None,
        experiment_name: Some(params.experiment_name.clone()),
    };
    let (scripture, drafts) = tokio::join!(
        client.get_scripture(&params.target_scripture_file),
        client.list_drafts(&draft_query),
    );

    let scripture = scripture.unwrap_or_else(|e| {
        error!(task_id = %task.id, error = %e, "Failed to fetch target scripture");
        None
    });
    let drafts = drafts.unwrap_or_else(|e| {
        error!(task_id = %task.id, error = %e, "Failed to fetch drafts");
        Vec::new()
    });

    let corpus = match params.training_corpus.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(corpus) => {
            let chips: String = parse_corpus(corpus)
                .iter()
                .map(|c| format!(r#"<span class="tag">{}</span>"#, escape(c)))
                .collect();
            format!(r#"<div class="corpus"><strong>Training Corpus:</strong> {}</div>"#, chips)
        }
        None => r#"<div class="muted">All available data was used for training</div>"#.to_string(),
    };

    let completion = scripture
        .as_ref()
        .map(|s| widgets::completion_grid(&CompletionReport::build(&s.stats.details, &drafts)))
        .unwrap_or_default();

    let mut out = card("Results", &widgets::result_table(&ResultTable::from_train(results)));
    out.push_str(&card("Source Data", &format!("{}<hr>{}", corpus, completion)));

    // Drafts need a target scripture to be drafted into
    if scripture.is_some() {
        let new_draft = format!(
            r#"<div class="actions"><a class="button" href="/tasks/{}/drafts/new">New Draft</a></div>"#,
            segment(&task.id)
        );
        out.push_str(&card(
            "Drafts",
            &format!("{}{}", widgets::draft_sources(&drafts), new_draft),
        ));
    }
    out
}
