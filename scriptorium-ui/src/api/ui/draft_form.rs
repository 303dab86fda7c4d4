//! New-draft form for a finished train task

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use futures::future::join_all;
use scriptorium_common::forms::{DraftForm, DraftSourceProjects};
use scriptorium_common::model::{ParatextProject, Task, TrainTaskParams};
use scriptorium_common::selection::{BookOp, BookSelection};
use scriptorium_common::ApiClient;
use tracing::{error, info, warn};

use super::layout::{self, escape, segment, Flash, Nav};
use super::widgets;
use crate::error::{UiError, UiResult};
use crate::AppState;

const CREATE_FAILED: &str = "Failed to create translation task. Please try again.";
const LOAD_ALL_FAILED: &str = "Failed to load additional projects. Please try again.";

/// Form state carried between reloads
#[derive(Debug, Clone, Default)]
struct DraftFormInput {
    source: Option<String>,
    books: BookSelection,
    show_all: bool,
}

impl DraftFormInput {
    fn from_fields(fields: &HashMap<String, String>) -> Self {
        Self {
            source: fields.get("source").filter(|s| !s.is_empty()).cloned(),
            books: BookSelection::from_query(fields.get("books").map(String::as_str)),
            show_all: fields.get("all").is_some_and(|v| v == "1"),
        }
    }

    /// Apply a submitted `op`; the two list toggles are handled here, the
    /// rest are book picker ops
    fn apply_op(&mut self, op: &str) -> UiResult<()> {
        match op {
            "" => {}
            "show-all" => self.show_all = true,
            "hide-all" => self.show_all = false,
            other => {
                let op = other
                    .parse::<BookOp>()
                    .map_err(|e| UiError::BadRequest(e.to_string()))?;
                self.books.apply(&op);
            }
        }
        Ok(())
    }

    fn state_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("source", self.source.clone().unwrap_or_default()),
            ("books", self.books.to_query_value()),
            ("all", if self.show_all { "1" } else { "" }.to_string()),
        ]
    }
}

async fn load_train_task(client: &ApiClient, id: &str) -> UiResult<(Task, TrainTaskParams)> {
    let task = client
        .get_task(id)
        .await
        .map_err(UiError::backend("Failed to fetch task details."))?;
    let params = task.train_params().ok_or_else(|| {
        UiError::BadRequest(format!("Task {} is not a train task with readable parameters", id))
    })?;
    Ok((task, params))
}

/// Projects whose scripture files fed the training; lookups that fail are skipped
async fn training_source_projects(client: &ApiClient, params: &TrainTaskParams) -> Vec<ParatextProject> {
    let lookups = params.source_scripture_files.iter().map(|filename| async move {
        client.projects_by_scripture(filename).await.unwrap_or_else(|e| {
            warn!(scripture = %filename, error = %e, "Failed to look up source project");
            Vec::new()
        })
    });
    join_all(lookups).await.into_iter().flatten().collect()
}

/// GET /tasks/:id/drafts/new
pub async fn new_draft_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
    Query(flash): Query<Flash>,
) -> UiResult<Html<String>> {
    let fields = layout::first_values(pairs);
    let mut input = DraftFormInput::from_fields(&fields);
    input.apply_op(fields.get("op").map(String::as_str).unwrap_or_default())?;

    let (task, params) = load_train_task(&state.client, &id).await?;
    let client = &state.client;

    let (scripture, from_training, all) = tokio::join!(
        client.get_scripture(&params.target_scripture_file),
        training_source_projects(client, &params),
        async {
            if input.show_all {
                Some(client.list_projects(0, 1000).await)
            } else {
                None
            }
        },
    );

    let mut banners = flash.render();
    let details = match scripture {
        Ok(Some(s)) => s.stats.details,
        Ok(None) => BTreeMap::new(),
        Err(e) => {
            error!(task_id = %id, error = %e, "Failed to fetch target scripture");
            BTreeMap::new()
        }
    };
    let all = match all {
        Some(Ok(projects)) => projects,
        Some(Err(e)) => {
            error!(error = %e, "Failed to load all projects");
            banners.push_str(&layout::error_banner(LOAD_ALL_FAILED));
            Vec::new()
        }
        None => Vec::new(),
    };
    let sources = DraftSourceProjects::assemble(from_training, &all);

    let body = format!(
        r#"{banners}
<section class="card">
    <h2>Create New Draft</h2>
    <p class="muted">{experiment}</p>
    <form method="get" action="/tasks/{href}/drafts/new">
        <input type="hidden" name="all" value="{all_value}">
        <div class="field">
            <label>Source Project</label>
            {projects}
        </div>
        <div class="field">
            {books}
        </div>
        <div class="actions">
            <a class="button secondary" href="/tasks/{href}">Cancel</a>
            <button type="submit" formmethod="post" formaction="/tasks/{href}/drafts">Create Draft</button>
        </div>
    </form>
</section>"#,
        experiment = escape(&params.experiment_name),
        href = segment(&task.id),
        all_value = if input.show_all { "1" } else { "" },
        projects = source_project_picker(&sources, &input),
        books = widgets::book_selector(&input.books, &details),
    );

    Ok(layout::page("New Draft", Nav::Tasks, &body))
}

fn project_radio(project: &ParatextProject, input: &DraftFormInput, from_training: bool) -> String {
    let checked = if input.source.as_deref() == Some(project.id.as_str()) {
        " checked"
    } else {
        ""
    };
    let tag = if from_training {
        r#" <span class="tag success">From Training</span>"#
    } else {
        ""
    };
    format!(
        r#"<label class="radio-row"><input type="radio" name="source" value="{id}"{checked}> {label}{tag}</label>"#,
        id = escape(&project.id),
        label = escape(&project.picker_label()),
    )
}

fn source_project_picker(sources: &DraftSourceProjects, input: &DraftFormInput) -> String {
    let mut out = String::new();

    if !sources.from_training.is_empty() {
        let radios: String = sources
            .from_training
            .iter()
            .map(|p| project_radio(p, input, true))
            .collect();
        out.push_str(&format!(
            r#"<h4>From Training Sources</h4><div class="radio-list">{}</div>"#,
            radios
        ));
    }

    if input.show_all {
        let list = if sources.others.is_empty() {
            r#"<div class="muted">No additional projects available.</div>"#.to_string()
        } else {
            let radios: String = sources
                .others
                .iter()
                .map(|p| project_radio(p, input, false))
                .collect();
            format!(r#"<div class="radio-list scroll">{}</div>"#, radios)
        };
        out.push_str(&format!(
            r#"<div class="list-header"><h4>All Available Projects</h4><button type="submit" name="op" value="hide-all" class="link">Hide</button></div>{}"#,
            list
        ));
    } else {
        out.push_str(
            r#"<button type="submit" name="op" value="show-all" class="link">Show other projects...</button>"#,
        );
        if sources.from_training.is_empty() {
            out.push_str(
                r#"<div class="muted">No projects found from training sources. Try "Show other projects" to see all available projects.</div>"#,
            );
        }
    }

    // A chosen project outside the visible lists stays in the same radio group
    let visible = sources
        .from_training
        .iter()
        .chain(input.show_all.then_some(&sources.others).into_iter().flatten())
        .any(|p| Some(p.id.as_str()) == input.source.as_deref());
    if let (false, Some(source)) = (visible, &input.source) {
        let label = sources
            .find(source)
            .map(ParatextProject::picker_label)
            .unwrap_or_else(|| source.clone());
        out.push_str(&format!(
            r#"<h4>Previously selected</h4><div class="radio-list"><label class="radio-row"><input type="radio" name="source" value="{id}" checked> {label}</label></div>"#,
            id = escape(source),
            label = escape(&label),
        ));
    }

    out
}

/// POST /tasks/:id/drafts
pub async fn create_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> UiResult<Redirect> {
    let input = DraftFormInput::from_fields(&layout::first_values(pairs));
    let (task, _) = load_train_task(&state.client, &id).await?;

    let back = |message: &str| {
        let mut pairs = input.state_pairs();
        pairs.push(("error", message.to_string()));
        Redirect::to(&layout::with_query(
            &format!("/tasks/{}/drafts/new", segment(&id)),
            &pairs,
        ))
    };

    let project = match &input.source {
        Some(source) => match state.client.get_project(source).await {
            Ok(project) => Some(project),
            Err(e) => {
                error!(project_id = %source, error = %e, "Failed to fetch source project");
                return Ok(back(CREATE_FAILED));
            }
        },
        None => None,
    };

    let form = DraftForm {
        source_project_id: input.source.clone(),
        book_names: input.books.books().to_vec(),
    };
    let body = match form.build(&task, project.as_ref()) {
        Ok(body) => body,
        Err(e) => return Ok(back(&e.to_string())),
    };

    match state.client.create_draft_task(&body).await {
        Ok(created) => {
            info!(
                train_task_id = %id,
                task_id = %created.id,
                books = body.book_names.len(),
                "Draft task created"
            );
            Ok(layout::redirect_notice(
                &format!("/tasks/{}", segment(&id)),
                "Draft task created successfully!",
            ))
        }
        Err(e) => {
            error!(train_task_id = %id, error = %e, "Draft task creation failed");
            Ok(back(CREATE_FAILED))
        }
    }
}
