//! Selector state for the dual-list scripture picker and the book picker
//!
//! State is a plain ordered list of ids; it round-trips through query
//! strings so every page render is a pure function of the request.
//! Operations mirror the interactive widget: click-to-toggle, drag between
//! zones, clear, and "add defaults".

use std::fmt;
use std::str::FromStr;

use crate::model::Scripture;
use crate::{Error, Result};

/// Alignment sources offered by the "Add Defaults" action
pub const DEFAULT_ALIGNMENT_SOURCES: &[&str] = &[
    "en-NIV84",
    "en-NIV11R",
    "en-ESVUK16",
    "en-NLT",
    "en-NRSV",
    "en-NASB",
];

/// Drop zone of the dual-list selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Available,
    Selected,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Available => "available",
            Zone::Selected => "selected",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "available" => Ok(Zone::Available),
            "selected" => Ok(Zone::Selected),
            other => Err(Error::InvalidInput(format!("unknown drop zone: {}", other))),
        }
    }
}

/// Operation submitted by the scripture selector widget
///
/// Wire form: `toggle:<id>`, `drop:<source>:<target>:<id>`, `clear`,
/// `defaults`, `search`, `clear-search`. The id is always the last component
/// and may itself contain `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorOp {
    Toggle(String),
    Drop { id: String, source: Zone, target: Zone },
    Clear,
    AddDefaults,
    Search,
    ClearSearch,
}

impl FromStr for SelectorOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "clear" => return Ok(SelectorOp::Clear),
            "defaults" => return Ok(SelectorOp::AddDefaults),
            "search" => return Ok(SelectorOp::Search),
            "clear-search" => return Ok(SelectorOp::ClearSearch),
            _ => {}
        }

        if let Some(id) = s.strip_prefix("toggle:") {
            if id.is_empty() {
                return Err(Error::InvalidInput("toggle without id".to_string()));
            }
            return Ok(SelectorOp::Toggle(id.to_string()));
        }

        if let Some(rest) = s.strip_prefix("drop:") {
            let mut parts = rest.splitn(3, ':');
            let source = parts.next().unwrap_or_default().parse::<Zone>()?;
            let target = parts.next().unwrap_or_default().parse::<Zone>()?;
            let id = parts.next().unwrap_or_default();
            if id.is_empty() {
                return Err(Error::InvalidInput("drop without id".to_string()));
            }
            return Ok(SelectorOp::Drop {
                id: id.to_string(),
                source,
                target,
            });
        }

        Err(Error::InvalidInput(format!("unknown selector op: {}", s)))
    }
}

/// Split a comma-separated id list, dropping blanks
pub fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Dual-list scripture selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptureSelection {
    selected: Vec<String>,
    search: String,
}

impl ScriptureSelection {
    pub fn new(selected: Vec<String>, search: impl Into<String>) -> Self {
        let mut selection = Self {
            selected: Vec::with_capacity(selected.len()),
            search: search.into(),
        };
        for id in selected {
            if !selection.is_selected(&id) {
                selection.selected.push(id);
            }
        }
        selection
    }

    /// Rebuild from `selected=a,b,c` and `search=...` query values
    pub fn from_query(selected: Option<&str>, search: Option<&str>) -> Self {
        Self::new(
            selected.map(split_ids).unwrap_or_default(),
            search.unwrap_or_default().trim(),
        )
    }

    /// Comma-separated form for the `selected` query value
    pub fn to_query_value(&self) -> String {
        self.selected.join(",")
    }

    pub fn ids(&self) -> &[String] {
        &self.selected
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    /// Unselected scriptures whose id or language code contains the search term
    pub fn available<'a>(&self, all: &'a [Scripture]) -> Vec<&'a Scripture> {
        let needle = self.search.to_lowercase();
        all.iter()
            .filter(|s| !self.is_selected(&s.id))
            .filter(|s| {
                s.id.to_lowercase().contains(&needle) || s.lang_code.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Selected ids resolved to scriptures in selection order; unknown ids are skipped
    pub fn selected<'a>(&self, all: &'a [Scripture]) -> Vec<&'a Scripture> {
        self.selected
            .iter()
            .filter_map(|id| all.iter().find(|s| &s.id == id))
            .collect()
    }

    /// Click semantics: remove if present, append otherwise
    pub fn toggle(&mut self, id: &str) {
        if self.is_selected(id) {
            self.selected.retain(|s| s != id);
        } else {
            self.selected.push(id.to_string());
        }
    }

    /// Drag semantics: only a move between different zones changes anything
    pub fn drop_item(&mut self, id: &str, source: Zone, target: Zone) {
        if source == target {
            return;
        }
        match target {
            Zone::Selected => {
                if !self.is_selected(id) {
                    self.selected.push(id.to_string());
                }
            }
            Zone::Available => self.selected.retain(|s| s != id),
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Append each default not already selected, keeping the defaults' order
    pub fn add_defaults(&mut self, defaults: &[&str]) {
        for id in defaults {
            if !self.is_selected(id) {
                self.selected.push((*id).to_string());
            }
        }
    }

    pub fn apply(&mut self, op: &SelectorOp) {
        match op {
            SelectorOp::Toggle(id) => self.toggle(id),
            SelectorOp::Drop { id, source, target } => self.drop_item(id, *source, *target),
            SelectorOp::Clear => self.clear(),
            SelectorOp::AddDefaults => self.add_defaults(DEFAULT_ALIGNMENT_SOURCES),
            SelectorOp::Search => {}
            SelectorOp::ClearSearch => self.search.clear(),
        }
    }
}

/// Operation submitted by the book picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookOp {
    Toggle(String),
    SelectNone,
}

impl FromStr for BookOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "none" {
            return Ok(BookOp::SelectNone);
        }
        match s.strip_prefix("toggle:") {
            Some(code) if !code.is_empty() => Ok(BookOp::Toggle(code.to_string())),
            _ => Err(Error::InvalidInput(format!("unknown book op: {}", s))),
        }
    }
}

/// Ordered set of book codes chosen for drafting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookSelection {
    books: Vec<String>,
}

impl BookSelection {
    pub fn from_query(raw: Option<&str>) -> Self {
        let mut selection = Self::default();
        for code in raw.map(split_ids).unwrap_or_default() {
            if !selection.contains(&code) {
                selection.books.push(code);
            }
        }
        selection
    }

    pub fn to_query_value(&self) -> String {
        self.books.join(",")
    }

    pub fn books(&self) -> &[String] {
        &self.books
    }

    pub fn count(&self) -> usize {
        self.books.len()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.books.iter().any(|b| b == code)
    }

    pub fn toggle(&mut self, code: &str) {
        if self.contains(code) {
            self.books.retain(|b| b != code);
        } else {
            self.books.push(code.to_string());
        }
    }

    pub fn select_none(&mut self) {
        self.books.clear();
    }

    pub fn apply(&mut self, op: &BookOp) {
        match op {
            BookOp::Toggle(code) => self.toggle(code),
            BookOp::SelectNone => self.select_none(),
        }
    }
}

/// Tooltip suffix for a book chip: "Complete", "N% complete", or nothing
pub fn completion_text(percent: f64) -> Option<String> {
    if percent >= 100.0 {
        Some("Complete".to_string())
    } else if percent > 0.0 {
        Some(format!("{}% complete", percent))
    } else {
        None
    }
}
