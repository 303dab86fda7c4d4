use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extracted scripture file with completion statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scripture {
    pub id: String,
    pub name: String,
    pub lang_code: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub stats: ScriptureStats,
}

/// Per-book completion (0-100) plus testament-level fractions (0.0-1.0)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptureStats {
    #[serde(default)]
    pub details: BTreeMap<String, f64>,
    #[serde(default)]
    pub summary: Option<StatsSummary>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    #[serde(default)]
    pub whole_bible: f64,
    #[serde(default)]
    pub old_testament: f64,
    #[serde(default)]
    pub new_testament: f64,
    #[serde(default)]
    pub deuterocanonical: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_stats() {
        let json = r#"{
            "id": "en-KJV",
            "name": "KJV",
            "lang_code": "en",
            "path": "/data/en-KJV.txt",
            "stats": {
                "details": {"GEN": 100, "EXO": 42.5},
                "summary": {"whole_bible": 0.5, "old_testament": 0.6,
                            "new_testament": 0.3, "deuterocanonical": 0}
            }
        }"#;
        let s: Scripture = serde_json::from_str(json).unwrap();
        assert_eq!(s.stats.details["GEN"], 100.0);
        assert_eq!(s.stats.details["EXO"], 42.5);
        assert!(!s.stats.details.contains_key("REV"));
        assert_eq!(s.stats.summary.unwrap().old_testament, 0.6);
    }

    #[test]
    fn test_deserialize_without_stats() {
        let json = r#"{"id": "x", "name": "X", "lang_code": "x"}"#;
        let s: Scripture = serde_json::from_str(json).unwrap();
        assert!(s.stats.details.is_empty());
        assert!(s.stats.summary.is_none());
    }
}
