use serde::{Deserialize, Serialize};

/// Uploaded Paratext project as reported by `GET /projects/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParatextProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    /// ISO 639 language code of the project text
    pub iso_code: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub path: String,
    /// ISO timestamp string, see [`crate::timestamp`]
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub scripture_filename: String,
    #[serde(default)]
    pub extract_task_id: Option<String>,
}

impl ParatextProject {
    /// Case-insensitive match of `needle` against name or id
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.id.to_lowercase().contains(&needle)
    }

    /// Label used in project pickers: `name (iso)` plus full name when it differs
    pub fn picker_label(&self) -> String {
        if !self.full_name.is_empty() && self.full_name != self.name {
            format!("{} ({}) - {}", self.name, self.iso_code, self.full_name)
        } else {
            format!("{} ({})", self.name, self.iso_code)
        }
    }
}
