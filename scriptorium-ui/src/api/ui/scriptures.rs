//! Scripture file list and details

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use scriptorium_common::model::StatsSummary;
use scriptorium_common::progress::{percent, CompletionReport};
use serde::Deserialize;

use super::layout::{self, escape, segment, Nav};
use super::widgets;
use crate::error::{UiError, UiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ScriptureListQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /scriptures
///
/// `q` is passed through to the backend's own text query.
pub async fn scripture_list(
    State(state): State<AppState>,
    Query(query): Query<ScriptureListQuery>,
) -> UiResult<Html<String>> {
    let scriptures = state
        .client
        .list_scriptures(Some(query.q.trim()), 0, 100)
        .await
        .map_err(UiError::backend("Failed to fetch scriptures."))?;

    let rows: String = if scriptures.is_empty() {
        let message = if query.q.trim().is_empty() {
            "No scriptures available."
        } else {
            "No scriptures found matching your search."
        };
        format!(r#"<tr><td colspan="4" class="empty">{}</td></tr>"#, message)
    } else {
        scriptures
            .iter()
            .map(|s| {
                let stats = match s.stats.summary {
                    Some(summary) => format!(
                        r#"<span class="stat">OT: {}%</span> <span class="stat">NT: {}%</span>"#,
                        percent(summary.old_testament),
                        percent(summary.new_testament)
                    ),
                    None => r#"<span class="muted">No stats available</span>"#.to_string(),
                };
                format!(
                    r#"<tr>
    <td><a href="/scriptures/{href}">{name}</a></td>
    <td>{lang}</td>
    <td>{stats}</td>
    <td class="path">{path}</td>
</tr>"#,
                    href = segment(&s.id),
                    name = escape(&s.name),
                    lang = escape(&s.lang_code),
                    path = escape(&s.path),
                )
            })
            .collect()
    };

    let body = format!(
        r#"<div class="page-header">
    <h1>Scripture Files</h1>
    <form method="get" action="/scriptures">
        <input type="text" name="q" value="{q}" placeholder="Search scriptures...">
    </form>
</div>
<div class="card flush">
    <table class="scriptures">
        <thead>
            <tr><th>Name</th><th>Language Code</th><th>Statistics</th><th>Path</th></tr>
        </thead>
        <tbody>{rows}</tbody>
    </table>
</div>"#,
        q = escape(&query.q),
    );

    Ok(layout::page("Scriptures", Nav::Scriptures, &body))
}

/// GET /scriptures/:id
pub async fn scripture_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> UiResult<Html<String>> {
    let scripture = state
        .client
        .get_scripture(&id)
        .await
        .map_err(UiError::backend("Failed to fetch scripture details."))?
        .ok_or_else(|| UiError::NotFound("Scripture not found".to_string()))?;

    let summary = scripture
        .stats
        .summary
        .as_ref()
        .map(overall_progress)
        .unwrap_or_default();

    let report = CompletionReport::build(&scripture.stats.details, &[]);

    let body = format!(
        r#"<div class="page-header">
    <a class="back" href="/scriptures">&larr;</a>
    <h1>{name}</h1>
</div>
<section class="card">
    <h2>Scripture Information</h2>
    <div class="info-grid">
        <div><label>Name</label><div>{name}</div></div>
        <div><label>Language Code</label><div>{lang}</div></div>
        <div class="wide"><label>Path</label><div class="path">{path}</div></div>
    </div>
    {summary}
</section>
<section class="card">
    {grid}
</section>"#,
        name = escape(&scripture.name),
        lang = escape(&scripture.lang_code),
        path = escape(&scripture.path),
        grid = widgets::completion_grid(&report),
    );

    Ok(layout::page(&scripture.name, Nav::Scriptures, &body))
}

fn overall_progress(summary: &StatsSummary) -> String {
    let tile = |value: f64, label: &str| {
        format!(
            r#"<div class="tile"><div class="tile-value">{}%</div><div class="tile-label">{}</div></div>"#,
            percent(value),
            label
        )
    };
    format!(
        r#"<h3>Overall Progress</h3>
    <div class="tiles">{}{}{}{}</div>"#,
        tile(summary.whole_bible, "Whole Bible"),
        tile(summary.old_testament, "Old Testament"),
        tile(summary.new_testament, "New Testament"),
        tile(summary.deuterocanonical, "Deuterocanonical"),
    )
}
