//! Create-task form for align and train tasks
//!
//! The form is a GET form: selector buttons reload the page with the op
//! applied, and the final submit switches to POST. All form state travels
//! in the fields, so a failed submit can redirect back without losing it.

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use futures::future::join_all;
use scriptorium_common::forms::{
    resolve_lang_codes, unique_lang_codes, AlignForm, LangCodeOption, LangCodeSelection, TrainForm,
    CUSTOM_CHOICE,
};
use scriptorium_common::model::{ParatextProject, Scripture, TaskKind, TrainMode};
use scriptorium_common::selection::{ScriptureSelection, SelectorOp};
use scriptorium_common::ApiClient;
use tracing::{error, info, warn};

use super::layout::{self, escape, segment, Flash, Nav};
use super::widgets;
use crate::error::{UiError, UiResult};
use crate::AppState;

const LOAD_FAILED: &str = "Failed to load form data";
const CREATE_FAILED: &str = "Failed to create task. Please check your inputs and try again.";

const LANG_CHOICE_PREFIX: &str = "lang_choice.";
const LANG_CUSTOM_PREFIX: &str = "lang_custom.";

/// Everything the task form submits
#[derive(Debug, Clone)]
struct TaskFormInput {
    kind: TaskKind,
    selection: ScriptureSelection,
    op: Option<SelectorOp>,
    training_corpus: String,
    train_mode: Option<TrainMode>,
    lang_choices: BTreeMap<String, String>,
    lang_customs: BTreeMap<String, String>,
}

impl TaskFormInput {
    fn from_fields(fields: &HashMap<String, String>) -> UiResult<Self> {
        let field = |name: &str| fields.get(name).map(String::as_str).unwrap_or_default();

        let kind = match field("kind") {
            "" => TaskKind::Align,
            raw => raw
                .parse::<TaskKind>()
                .map_err(|e| UiError::BadRequest(e.to_string()))?,
        };
        if !matches!(kind, TaskKind::Align | TaskKind::Train) {
            return Err(UiError::BadRequest(format!(
                "{} tasks cannot be created from this form",
                kind
            )));
        }

        let op = match field("op") {
            "" => None,
            raw => Some(
                raw.parse::<SelectorOp>()
                    .map_err(|e| UiError::BadRequest(e.to_string()))?,
            ),
        };

        let train_mode = match field("train_mode") {
            "" => None,
            raw => Some(
                raw.parse::<TrainMode>()
                    .map_err(|e| UiError::BadRequest(e.to_string()))?,
            ),
        };

        let prefixed = |prefix: &str| -> BTreeMap<String, String> {
            fields
                .iter()
                .filter_map(|(k, v)| k.strip_prefix(prefix).map(|code| (code.to_string(), v.clone())))
                .collect()
        };

        Ok(Self {
            kind,
            selection: ScriptureSelection::from_query(
                fields.get("selected").map(String::as_str),
                fields.get("search").map(String::as_str),
            ),
            op,
            training_corpus: field("training_corpus").to_string(),
            train_mode,
            lang_choices: prefixed(LANG_CHOICE_PREFIX),
            lang_customs: prefixed(LANG_CUSTOM_PREFIX),
        })
    }

    fn lang_option(&self, code: &str, options: Vec<String>) -> LangCodeOption {
        LangCodeOption::from_form(
            code,
            options,
            self.lang_choices.get(code).map(String::as_str),
            self.lang_customs.get(code).map(String::as_str),
        )
    }

    /// Query pairs that reproduce this form
    fn state_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("kind".to_string(), self.kind.as_str().to_string()),
            ("selected".to_string(), self.selection.to_query_value()),
            ("search".to_string(), self.selection.search().to_string()),
            ("training_corpus".to_string(), self.training_corpus.clone()),
            (
                "train_mode".to_string(),
                self.train_mode.map(train_mode_value).unwrap_or_default().to_string(),
            ),
        ];
        for (code, value) in &self.lang_choices {
            pairs.push((format!("{}{}", LANG_CHOICE_PREFIX, code), value.clone()));
        }
        for (code, value) in &self.lang_customs {
            pairs.push((format!("{}{}", LANG_CUSTOM_PREFIX, code), value.clone()));
        }
        pairs
    }
}

fn train_mode_value(mode: TrainMode) -> &'static str {
    match mode {
        TrainMode::Ot => "ot",
        TrainMode::EarlyNt => "early_nt",
        TrainMode::Nt => "nt",
    }
}

async fn load_form_data(
    client: &ApiClient,
    project_id: &str,
) -> UiResult<(ParatextProject, Vec<Scripture>)> {
    let (project, scriptures) = tokio::join!(
        client.get_project(project_id),
        client.list_scriptures(None, 0, 100),
    );
    let project = project.map_err(UiError::backend("Failed to fetch project details."))?;
    let scriptures = scriptures.map_err(UiError::backend(LOAD_FAILED))?;
    Ok((project, scriptures))
}

/// Suggested script codes for each language; a failed lookup leaves only "Custom"
async fn fetch_lang_options(client: &ApiClient, codes: &[String]) -> Vec<Vec<String>> {
    join_all(codes.iter().map(|code| async move {
        client.lang_codes(code).await.unwrap_or_else(|e| {
            warn!(lang_code = %code, error = %e, "Failed to fetch language code options");
            Vec::new()
        })
    }))
    .await
}

/// GET /projects/:id/tasks/new
pub async fn new_task_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(fields): Query<HashMap<String, String>>,
    Query(flash): Query<Flash>,
) -> UiResult<Html<String>> {
    let mut input = TaskFormInput::from_fields(&fields)?;
    let (project, scriptures) = load_form_data(&state.client, &id).await?;

    if let Some(op) = &input.op {
        input.selection.apply(op);
    }

    let lang_options = match input.kind {
        TaskKind::Train => {
            let codes = unique_lang_codes(&project, input.selection.ids(), &scriptures);
            let suggestions = fetch_lang_options(&state.client, &codes).await;
            codes
                .iter()
                .zip(suggestions)
                .map(|(code, options)| input.lang_option(code, options))
                .collect()
        }
        _ => Vec::new(),
    };

    let body = render_form(&project, &scriptures, &input, &lang_options, &flash);
    Ok(layout::page(
        &format!("New Task: {}", project.name),
        Nav::Projects,
        &body,
    ))
}

fn render_form(
    project: &ParatextProject,
    scriptures: &[Scripture],
    input: &TaskFormInput,
    lang_options: &[LangCodeOption],
    flash: &Flash,
) -> String {
    let href = segment(&project.id);

    let kind_link = |kind: TaskKind| {
        let mut pairs = input.state_pairs();
        pairs[0].1 = kind.as_str().to_string();
        let class = if kind == input.kind { " active" } else { "" };
        format!(
            r#"<a class="toggle{class}" href="{url}">{label}</a>"#,
            url = escape(&layout::with_query(&format!("/projects/{}/tasks/new", href), &pairs)),
            label = kind.label(),
        )
    };

    let fields = match input.kind {
        TaskKind::Train => format!(
            r#"<div class="field">
    <label for="training_corpus">Training Corpus</label>
    <input type="text" id="training_corpus" name="training_corpus" value="{corpus}" placeholder="e.g., NT or MAT-ACT;1CO">
    <p class="hint">Leave blank for all</p>
</div>
<div class="field">
    <label for="train_mode">Train Mode</label>
    <select id="train_mode" name="train_mode">{modes}</select>
</div>
<div class="field">
    <label>Scripture Files</label>
    {selector}
</div>
<div class="field">
    <label>Language Codes</label>
    {lang_codes}
</div>"#,
            corpus = escape(&input.training_corpus),
            modes = train_mode_options(input.train_mode),
            selector = widgets::scripture_selector(&input.selection, scriptures, false),
            lang_codes = lang_code_rows(lang_options),
        ),
        _ => format!(
            r#"<div class="field">
    <label>Source Projects</label>
    {selector}
</div>"#,
            selector = widgets::scripture_selector(&input.selection, scriptures, true),
        ),
    };

    format!(
        r#"{flash}
<section class="card">
    <h2>Create New Task</h2>
    <p class="muted">Project: {name}</p>
    <form method="get" action="/projects/{href}/tasks/new" class="task-form">
        <input type="hidden" name="kind" value="{kind}">
        <div class="field">
            <label>Task Type</label>
            <div class="toggle-group">{align}{train}</div>
        </div>
        {fields}
        <div class="actions">
            <button type="submit" formmethod="post" formaction="/projects/{href}/tasks">Create {label} Task</button>
            <a class="button secondary" href="/projects/{href}">Cancel</a>
        </div>
    </form>
</section>"#,
        flash = flash.render(),
        name = escape(&project.name),
        kind = input.kind.as_str(),
        align = kind_link(TaskKind::Align),
        train = kind_link(TaskKind::Train),
        label = input.kind.label(),
    )
}

fn train_mode_options(current: Option<TrainMode>) -> String {
    let mut out = String::from(r#"<option value="">Default</option>"#);
    for (mode, label) in [
        (TrainMode::Ot, "Old Testament"),
        (TrainMode::EarlyNt, "Early New Testament"),
        (TrainMode::Nt, "New Testament"),
    ] {
        let selected = if current == Some(mode) { " selected" } else { "" };
        out.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            train_mode_value(mode),
            selected,
            label
        ));
    }
    out
}

/// One radio group per language: suggested codes plus "Custom"
fn lang_code_rows(options: &[LangCodeOption]) -> String {
    if options.is_empty() {
        return r#"<div class="muted">No language codes to configure</div>"#.to_string();
    }

    options
        .iter()
        .map(|opt| {
            let choice_name = escape(&format!("{}{}", LANG_CHOICE_PREFIX, opt.lang_code));
            let radios: String = opt
                .options
                .iter()
                .map(|value| {
                    let checked = if opt.is_selected(value) { " checked" } else { "" };
                    format!(
                        r#"<label class="chip-radio"><input type="radio" name="{choice_name}" value="{v}"{checked}> {v}</label>"#,
                        v = escape(value),
                    )
                })
                .collect();

            let (custom_checked, custom_value) = match &opt.selection {
                LangCodeSelection::Custom(v) => (" checked", v.as_str()),
                LangCodeSelection::Option(_) => ("", ""),
            };

            format!(
                r#"<div class="lang-row">
    <label>{display} Language Code</label>
    <div class="toggle-group">
        {radios}
        <label class="chip-radio"><input type="radio" name="{choice_name}" value="{custom}"{custom_checked}> Custom</label>
    </div>
    <input type="text" name="{custom_name}" value="{custom_value}" placeholder="Enter custom language code">
</div>"#,
                display = escape(&opt.display_name),
                custom = CUSTOM_CHOICE,
                custom_name = escape(&format!("{}{}", LANG_CUSTOM_PREFIX, opt.lang_code)),
                custom_value = escape(custom_value),
            )
        })
        .collect()
}

/// POST /projects/:id/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<HashMap<String, String>>,
) -> UiResult<Redirect> {
    let input = TaskFormInput::from_fields(&fields)?;
    let (project, scriptures) = load_form_data(&state.client, &id).await?;

    let form_url = |message: &str| {
        let mut pairs = input.state_pairs();
        pairs.push(("error".to_string(), message.to_string()));
        Redirect::to(&layout::with_query(
            &format!("/projects/{}/tasks/new", segment(&id)),
            &pairs,
        ))
    };

    let created = match input.kind {
        TaskKind::Align => {
            let form = AlignForm {
                source_scripture_files: input.selection.ids().to_vec(),
            };
            let body = match form.build(&project, &scriptures) {
                Ok(body) => body,
                Err(e) => return Ok(form_url(&e.to_string())),
            };
            state.client.create_align_task(&body).await
        }
        _ => {
            let codes = unique_lang_codes(&project, input.selection.ids(), &scriptures);
            let options: Vec<LangCodeOption> = codes
                .iter()
                .map(|code| input.lang_option(code, Vec::new()))
                .collect();
            let form = TrainForm {
                training_corpus: input.training_corpus.clone(),
                source_scripture_files: input.selection.ids().to_vec(),
                lang_codes: resolve_lang_codes(&options),
                train_mode: input.train_mode,
            };
            let body = match form.build(&project) {
                Ok(body) => body,
                Err(e) => return Ok(form_url(&e.to_string())),
            };
            state.client.create_train_task(&body).await
        }
    };

    match created {
        Ok(task) => {
            info!(project_id = %id, task_id = %task.id, kind = %input.kind, "Task created");
            Ok(layout::redirect_notice(
                &format!("/projects/{}", segment(&id)),
                &format!("{} task created successfully!", input.kind.label()),
            ))
        }
        Err(e) => {
            error!(project_id = %id, kind = %input.kind, error = %e, "Task creation failed");
            Ok(form_url(CREATE_FAILED))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_input_defaults_to_align() {
        let input = TaskFormInput::from_fields(&HashMap::new()).unwrap();
        assert_eq!(input.kind, TaskKind::Align);
        assert!(input.selection.is_empty());
        assert!(input.op.is_none());
    }

    #[test]
    fn test_input_rejects_other_kinds_and_bad_ops() {
        assert!(TaskFormInput::from_fields(&fields(&[("kind", "draft")])).is_err());
        assert!(TaskFormInput::from_fields(&fields(&[("op", "explode")])).is_err());
        assert!(TaskFormInput::from_fields(&fields(&[("train_mode", "gospels")])).is_err());
    }

    #[test]
    fn test_input_collects_lang_fields() {
        let input = TaskFormInput::from_fields(&fields(&[
            ("kind", "train"),
            ("selected", "en-NIV84,fr-LSG"),
            ("lang_choice.en", "eng_Latn"),
            ("lang_choice.abc", CUSTOM_CHOICE),
            ("lang_custom.abc", " abc_Latn "),
            ("train_mode", "early_nt"),
        ]))
        .unwrap();

        assert_eq!(input.selection.ids(), ["en-NIV84", "fr-LSG"]);
        assert_eq!(input.train_mode, Some(TrainMode::EarlyNt));

        let options = vec![
            input.lang_option("abc", Vec::new()),
            input.lang_option("en", vec!["eng_Latn".to_string()]),
        ];
        let resolved = resolve_lang_codes(&options);
        assert_eq!(resolved["abc"], "abc_Latn");
        assert_eq!(resolved["en"], "eng_Latn");
    }

    #[test]
    fn test_state_pairs_round_trip() {
        let input = TaskFormInput::from_fields(&fields(&[
            ("kind", "train"),
            ("selected", "a,b"),
            ("search", "en"),
            ("lang_choice.en", "eng_Latn"),
        ]))
        .unwrap();
        let pairs: HashMap<String, String> = input.state_pairs().into_iter().collect();
        let again = TaskFormInput::from_fields(&pairs).unwrap();
        assert_eq!(again.kind, TaskKind::Train);
        assert_eq!(again.selection, input.selection);
        assert_eq!(again.lang_choices, input.lang_choices);
    }

    #[test]
    fn test_lang_code_rows_mark_selection() {
        let input = TaskFormInput::from_fields(&HashMap::new()).unwrap();
        let rows = lang_code_rows(&[
            input.lang_option("en", vec!["eng_Latn".to_string(), "eng_Brai".to_string()]),
            input.lang_option("xyz", Vec::new()),
        ]);
        assert!(rows.contains(r#"value="eng_Latn" checked"#));
        assert!(rows.contains("en Language Code"));
        assert!(rows.contains(&format!(r#"value="{}" checked> Custom"#, CUSTOM_CHOICE)));
        assert!(lang_code_rows(&[]).contains("No language codes to configure"));
    }
}
