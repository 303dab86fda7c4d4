//! Aggregation of backend results for display
//!
//! Everything here is a pure function over records already fetched from the
//! backend: per-book completion roll-ups, draft grouping, checkpoint ranking
//! and tabular views of task results.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::books::{self, BookGroup, Testament, BOOK_GROUPS};
use crate::model::{Draft, Metrics, ParatextProject, ResultRow, Task, TaskParams, TrainResults};
use crate::timestamp::parse_timestamp;

/// Completion state of one book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    NotStarted,
    InProgress,
    Complete,
}

impl ProgressState {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 100.0 {
            ProgressState::Complete
        } else if percent > 0.0 {
            ProgressState::InProgress
        } else {
            ProgressState::NotStarted
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressState::NotStarted => "not-started",
            ProgressState::InProgress => "in-progress",
            ProgressState::Complete => "complete",
        }
    }
}

/// Color band of a chip's fill bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillTone {
    Complete,
    High,
    Low,
}

impl FillTone {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 100.0 {
            FillTone::Complete
        } else if percent > 50.0 {
            FillTone::High
        } else {
            FillTone::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FillTone::Complete => "complete",
            FillTone::High => "high",
            FillTone::Low => "low",
        }
    }
}

/// One book chip in a completion grid
#[derive(Debug, Clone, PartialEq)]
pub struct BookProgress {
    pub code: String,
    pub percent: f64,
    pub drafted: bool,
    pub state: ProgressState,
}

impl BookProgress {
    pub fn new(code: impl Into<String>, percent: f64, drafted: bool) -> Self {
        Self {
            code: code.into(),
            percent,
            drafted,
            state: ProgressState::from_percent(percent),
        }
    }

    pub fn name(&self) -> &str {
        books::book_name(&self.code)
    }

    /// Bar width, capped at 100
    pub fn fill_percent(&self) -> f64 {
        self.percent.clamp(0.0, 100.0)
    }

    pub fn tone(&self) -> FillTone {
        FillTone::from_percent(self.percent)
    }
}

/// Roll-up of one book group
#[derive(Debug, Clone)]
pub struct GroupReport {
    pub group: &'static BookGroup,
    pub chips: Vec<BookProgress>,
    pub completed: usize,
    pub drafted: usize,
}

/// Per-book completion across the 66-book canon
#[derive(Debug, Clone)]
pub struct CompletionReport {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub drafted: usize,
    pub not_started: usize,
    pub ot_completed: usize,
    pub ot_drafted: usize,
    pub nt_completed: usize,
    pub nt_drafted: usize,
    pub groups: Vec<GroupReport>,
}

impl CompletionReport {
    /// Build the report from per-book percentages and the drafts produced so far
    ///
    /// A book counts as drafted when some draft names it. Book codes outside
    /// the canon are ignored.
    pub fn build(details: &BTreeMap<String, f64>, drafts: &[Draft]) -> Self {
        let drafted_books: BTreeSet<&str> = drafts.iter().map(|d| d.book_name.as_str()).collect();

        let mut report = CompletionReport {
            total: 0,
            completed: 0,
            in_progress: 0,
            drafted: 0,
            not_started: 0,
            ot_completed: 0,
            ot_drafted: 0,
            nt_completed: 0,
            nt_drafted: 0,
            groups: Vec::with_capacity(BOOK_GROUPS.len()),
        };

        for group in BOOK_GROUPS {
            let chips: Vec<BookProgress> = group
                .books
                .iter()
                .map(|code| {
                    let percent = details.get(*code).copied().unwrap_or(0.0);
                    BookProgress::new(*code, percent, drafted_books.contains(code))
                })
                .collect();

            let completed = chips
                .iter()
                .filter(|c| c.state == ProgressState::Complete)
                .count();
            let in_progress = chips
                .iter()
                .filter(|c| c.state == ProgressState::InProgress)
                .count();
            let drafted = chips.iter().filter(|c| c.drafted).count();

            report.total += chips.len();
            report.completed += completed;
            report.in_progress += in_progress;
            report.drafted += drafted;
            match group.testament {
                Testament::Old => {
                    report.ot_completed += completed;
                    report.ot_drafted += drafted;
                }
                Testament::New => {
                    report.nt_completed += completed;
                    report.nt_drafted += drafted;
                }
            }

            report.groups.push(GroupReport {
                group,
                chips,
                completed,
                drafted,
            });
        }

        report.not_started = report.total - report.completed - report.in_progress;
        report
    }

    pub fn testament_total(testament: Testament) -> usize {
        books::testament_books(testament).count()
    }
}

/// Drafts grouped by source scripture, groups in first-seen order
pub fn group_drafts_by_source(drafts: &[Draft]) -> Vec<(String, Vec<&Draft>)> {
    let mut groups: Vec<(String, Vec<&Draft>)> = Vec::new();
    for draft in drafts {
        match groups
            .iter_mut()
            .find(|(source, _)| *source == draft.source_scripture_name)
        {
            Some((_, members)) => members.push(draft),
            None => groups.push((draft.source_scripture_name.clone(), vec![draft])),
        }
    }
    groups
}

/// Unique source scripture names, sorted
pub fn sorted_draft_sources(drafts: &[Draft]) -> Vec<&str> {
    drafts
        .iter()
        .map(|d| d.source_scripture_name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn drafts_for_experiment<'a>(drafts: &'a [Draft], experiment: &str) -> Vec<&'a Draft> {
    drafts
        .iter()
        .filter(|d| d.train_experiment_name == experiment)
        .collect()
}

/// Numeric value of a metric that may arrive as a string or a number
pub fn metric_as_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Checkpoint with the highest BLEU; missing or unparseable BLEU counts as 0
///
/// Ties go to the checkpoint the backend listed last.
pub fn best_checkpoint(results: &TrainResults) -> Option<(&str, &Metrics)> {
    let mut best: Option<(&str, &Metrics, f64)> = None;
    for (key, metrics) in results {
        let bleu = metric_as_f64(metrics.get("BLEU")).unwrap_or(0.0);
        match best {
            Some((_, _, top)) if bleu < top => {}
            _ => best = Some((key, metrics, bleu)),
        }
    }
    best.map(|(key, metrics, _)| (key, metrics))
}

/// `fraction * 100` rounded half away from zero
pub fn percent(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

/// Stable sort by parsed `created_at`; unparseable timestamps sort first
pub fn sort_tasks_by_created(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| parse_timestamp(&t.created_at));
}

/// Identifier shown for a task in the task list
pub fn relevant_id(task: &Task) -> String {
    match task.typed_parameters() {
        Ok(TaskParams::Train(p)) => p.experiment_name,
        Ok(TaskParams::Draft(p)) => p.experiment_name,
        Ok(TaskParams::Align(p)) => p.target_scripture_file,
        Ok(TaskParams::Extract(p)) => p.project_id,
        Err(e) => {
            tracing::debug!(task_id = %task.id, error = %e, "Task parameters not decodable");
            "error".to_string()
        }
    }
}

pub fn filter_projects<'a>(projects: &'a [ParatextProject], needle: &str) -> Vec<&'a ParatextProject> {
    projects.iter().filter(|p| p.matches(needle)).collect()
}

/// Header row plus string cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Align results: headers are the first row's keys, in backend order
    pub fn from_align(results: &[ResultRow]) -> Self {
        let Some(first) = results.first() else {
            return Self::default();
        };
        let headers: Vec<String> = first.keys().cloned().collect();
        let rows = results
            .iter()
            .map(|row| headers.iter().map(|h| cell_text(row.get(h))).collect())
            .collect();
        Self { headers, rows }
    }

    /// Train results: one row per checkpoint, `score` column first
    pub fn from_train(results: &TrainResults) -> Self {
        let Some(first) = results.values().next() else {
            return Self::default();
        };
        let metrics: Vec<String> = first.keys().cloned().collect();
        let mut headers = Vec::with_capacity(metrics.len() + 1);
        headers.push("score".to_string());
        headers.extend(metrics.iter().cloned());

        let rows = results
            .iter()
            .map(|(checkpoint, values)| {
                let mut row = Vec::with_capacity(headers.len());
                row.push(checkpoint.clone());
                row.extend(metrics.iter().map(|m| cell_text(values.get(m))));
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
