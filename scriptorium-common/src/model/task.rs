use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Kind of backend job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Align,
    Train,
    Draft,
    Extract,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Align => "align",
            TaskKind::Train => "train",
            TaskKind::Draft => "draft",
            TaskKind::Extract => "extract",
        }
    }

    /// Capitalized form used in headings and flash messages
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Align => "Align",
            TaskKind::Train => "Train",
            TaskKind::Draft => "Draft",
            TaskKind::Extract => "Extract",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "align" => Ok(TaskKind::Align),
            "train" => Ok(TaskKind::Train),
            "draft" => Ok(TaskKind::Draft),
            "extract" => Ok(TaskKind::Extract),
            other => Err(Error::InvalidInput(format!("unknown task kind: {}", other))),
        }
    }
}

/// Backend job status
///
/// Unrecognized values map to `Unknown`; a missing or null status is `Queued`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Portion of the canon a train task is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainMode {
    Ot,
    EarlyNt,
    Nt,
}

impl FromStr for TrainMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "ot" => Ok(TrainMode::Ot),
            "early_nt" => Ok(TrainMode::EarlyNt),
            "nt" => Ok(TrainMode::Nt),
            other => Err(Error::InvalidInput(format!("unknown train mode: {}", other))),
        }
    }
}

/// One checkpoint's metrics; values arrive as strings or numbers
pub type Metrics = IndexMap<String, Value>;

/// Checkpoint name -> metrics, in the order the backend reported them
pub type TrainResults = IndexMap<String, Metrics>;

/// One align result row; column order follows the backend
pub type ResultRow = IndexMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignTaskParams {
    #[serde(default)]
    pub target_scripture_file: String,
    #[serde(default)]
    pub experiment_name: String,
    #[serde(default)]
    pub source_scripture_files: Vec<String>,
    #[serde(default)]
    pub results: Option<Vec<ResultRow>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainTaskParams {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub target_scripture_file: String,
    #[serde(default)]
    pub experiment_name: String,
    #[serde(default)]
    pub source_scripture_files: Vec<String>,
    #[serde(default)]
    pub training_corpus: Option<String>,
    #[serde(default)]
    pub lang_codes: BTreeMap<String, String>,
    #[serde(default)]
    pub train_mode: Option<TrainMode>,
    #[serde(default)]
    pub related_task_ids: Option<Vec<String>>,
    #[serde(default)]
    pub results: Option<TrainResults>,
}

impl TrainTaskParams {
    /// ISO code of the target language: the scripture filename up to the first `-`
    pub fn target_iso_code(&self) -> &str {
        self.target_scripture_file
            .split('-')
            .next()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslateTaskParams {
    #[serde(default)]
    pub experiment_name: String,
    #[serde(default)]
    pub train_task_id: String,
    #[serde(default)]
    pub source_project_id: String,
    #[serde(default)]
    pub book_names: Vec<String>,
    #[serde(default)]
    pub source_script_code: String,
    #[serde(default)]
    pub target_script_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractTaskParams {
    #[serde(default)]
    pub project_id: String,
}

/// Parameters decoded according to the task's kind
#[derive(Debug, Clone, PartialEq)]
pub enum TaskParams {
    Align(AlignTaskParams),
    Train(TrainTaskParams),
    Draft(TranslateTaskParams),
    Extract(ExtractTaskParams),
}

/// Backend job record
///
/// `parameters` is kept as raw JSON so the raw view always renders, even
/// when the shape does not match what the dashboard expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub kind: TaskKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub parameters: Value,
}

impl Task {
    /// Decode `parameters` according to `kind`
    pub fn typed_parameters(&self) -> Result<TaskParams> {
        let raw = self.parameters.clone();
        let decoded = match self.kind {
            TaskKind::Align => serde_json::from_value(raw).map(TaskParams::Align),
            TaskKind::Train => serde_json::from_value(raw).map(TaskParams::Train),
            TaskKind::Draft => serde_json::from_value(raw).map(TaskParams::Draft),
            TaskKind::Extract => serde_json::from_value(raw).map(TaskParams::Extract),
        };
        decoded.map_err(|e| {
            Error::Decode(format!("{} task {} parameters: {}", self.kind, self.id, e))
        })
    }

    /// Train parameters, if this is a train task with decodable parameters
    pub fn train_params(&self) -> Option<TrainTaskParams> {
        match self.typed_parameters() {
            Ok(TaskParams::Train(p)) => Some(p),
            _ => None,
        }
    }

    /// Experiment name carried in the parameters, if any
    pub fn experiment_name(&self) -> Option<&str> {
        self.parameters
            .get("experiment_name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body for `POST /tasks/align_task`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignTaskCreate {
    pub project_id: String,
    pub target_scripture_file: String,
    pub source_scripture_files: Vec<String>,
}

/// Body for `POST /tasks/train_task`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainTaskCreate {
    pub project_id: String,
    pub source_scripture_files: Vec<String>,
    /// Empty means "all available data"
    pub training_corpus: String,
    pub lang_codes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_mode: Option<TrainMode>,
}

/// Body for `POST /tasks/draft_task`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftTaskCreate {
    pub experiment_name: String,
    pub train_task_id: String,
    pub source_project_id: String,
    pub book_names: Vec<String>,
    pub source_script_code: String,
    pub target_script_code: String,
}

/// Body for `POST /tasks/extract_task`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractTaskCreate {
    pub project_id: String,
}

/// One entry of a backend 422 response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(default)]
    pub loc: Vec<Value>,
    pub msg: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
}

/// Backend 422 response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpValidationError {
    #[serde(default)]
    pub detail: Option<Vec<ValidationError>>,
}

impl HttpValidationError {
    /// `loc.path: msg` entries joined with `; `, or None when there are none
    pub fn summary(&self) -> Option<String> {
        let detail = self.detail.as_ref().filter(|d| !d.is_empty())?;
        let parts: Vec<String> = detail
            .iter()
            .map(|e| {
                let loc: Vec<String> = e
                    .loc
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                if loc.is_empty() {
                    e.msg.clone()
                } else {
                    format!("{}: {}", loc.join("."), e.msg)
                }
            })
            .collect();
        Some(parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_unknown_and_missing() {
        let t: Task = serde_json::from_value(json!({
            "id": "t1", "kind": "align", "status": "paused", "parameters": {}
        }))
        .unwrap();
        assert_eq!(t.status, TaskStatus::Unknown);

        let t: Task = serde_json::from_value(json!({
            "id": "t2", "kind": "align", "parameters": {}
        }))
        .unwrap();
        assert_eq!(t.status, TaskStatus::Queued);

        let t: Task = serde_json::from_value(json!({
            "id": "t3", "kind": "align", "status": null, "parameters": {}
        }))
        .unwrap();
        assert_eq!(t.status, TaskStatus::Queued);
    }

    #[test]
    fn test_typed_parameters_train() {
        let t: Task = serde_json::from_value(json!({
            "id": "t1",
            "kind": "train",
            "status": "completed",
            "created_at": "2024-01-01T00:00:00",
            "parameters": {
                "project_id": "P1",
                "target_scripture_file": "abc-P1",
                "experiment_name": "exp-1",
                "source_scripture_files": ["en-NIV84"],
                "lang_codes": {"abc": "abc_Latn", "en": "eng_Latn"},
                "train_mode": "early_nt",
                "results": {"checkpoint-1000": {"BLEU": "12.5", "chrF3": 40.1}}
            }
        }))
        .unwrap();

        let params = t.train_params().unwrap();
        assert_eq!(params.target_iso_code(), "abc");
        assert_eq!(params.train_mode, Some(TrainMode::EarlyNt));
        assert_eq!(params.results.unwrap().len(), 1);
        assert_eq!(t.experiment_name(), Some("exp-1"));
    }

    #[test]
    fn test_results_keep_backend_order() {
        let align: Task = serde_json::from_str(
            r#"{"id": "a1", "kind": "align", "parameters": {
                "results": [{"source": "en-NIV84", "alignment_score": 0.81}]
            }}"#,
        )
        .unwrap();
        let Ok(TaskParams::Align(params)) = align.typed_parameters() else {
            panic!("expected align parameters");
        };
        let row = &params.results.unwrap()[0];
        assert_eq!(
            row.keys().map(String::as_str).collect::<Vec<_>>(),
            ["source", "alignment_score"]
        );

        let train: Task = serde_json::from_str(
            r#"{"id": "t1", "kind": "train", "parameters": {"results": {
                "checkpoint-9000": {"chrF3": 41, "BLEU": 13},
                "checkpoint-1000": {"chrF3": 40, "BLEU": 12}
            }}}"#,
        )
        .unwrap();
        let results = train.train_params().unwrap().results.unwrap();
        assert_eq!(
            results.keys().map(String::as_str).collect::<Vec<_>>(),
            ["checkpoint-9000", "checkpoint-1000"]
        );
        assert_eq!(
            results["checkpoint-9000"].keys().map(String::as_str).collect::<Vec<_>>(),
            ["chrF3", "BLEU"]
        );
    }

    #[test]
    fn test_typed_parameters_mismatch_is_decode_error() {
        let t: Task = serde_json::from_value(json!({
            "id": "t1", "kind": "extract", "parameters": {"project_id": 42}
        }))
        .unwrap();
        assert!(matches!(t.typed_parameters(), Err(Error::Decode(_))));
        assert!(t.experiment_name().is_none());
    }

    #[test]
    fn test_train_create_omits_absent_mode() {
        let body = TrainTaskCreate {
            project_id: "P".to_string(),
            source_scripture_files: vec![],
            training_corpus: String::new(),
            lang_codes: BTreeMap::new(),
            train_mode: None,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert!(v.get("train_mode").is_none());
        assert_eq!(v["training_corpus"], "");
    }

    #[test]
    fn test_kind_parse_and_label() {
        assert_eq!("Train".parse::<TaskKind>().unwrap(), TaskKind::Train);
        assert_eq!(TaskKind::Align.label(), "Align");
        assert!("bogus".parse::<TaskKind>().is_err());
    }

    #[test]
    fn test_validation_error_summary() {
        let body: HttpValidationError = serde_json::from_value(json!({
            "detail": [
                {"loc": ["body", "project_id"], "msg": "field required", "type": "missing"},
                {"loc": ["query", 0], "msg": "bad", "type": "value_error"}
            ]
        }))
        .unwrap();
        assert_eq!(
            body.summary().unwrap(),
            "body.project_id: field required; query.0: bad"
        );
        assert!(HttpValidationError::default().summary().is_none());
    }
}
