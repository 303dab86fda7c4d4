use serde::{Deserialize, Serialize};

/// Machine-translation draft for one book from one source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub project_id: String,
    pub source_scripture_name: String,
    /// USFM book code, e.g. `MAT`
    pub book_name: String,
    pub train_experiment_name: String,
    /// A rendered PDF is available for download
    #[serde(default)]
    pub has_pdf: bool,
}
