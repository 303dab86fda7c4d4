//! Domain records exchanged with the pipeline backend
//!
//! These are flat records passed through unmodified from the backend's JSON.
//! The dashboard imposes no lifecycle on them; every value shown is fetched
//! fresh from the backend.

mod draft;
mod project;
mod scripture;
mod task;

pub use draft::Draft;
pub use project::ParatextProject;
pub use scripture::{Scripture, ScriptureStats, StatsSummary};
pub use task::{
    AlignTaskCreate, AlignTaskParams, DraftTaskCreate, ExtractTaskCreate, ExtractTaskParams,
    HttpValidationError, Metrics, ResultRow, Task, TaskKind, TaskParams, TaskStatus, TrainMode,
    TrainResults, TrainTaskCreate, TrainTaskParams, TranslateTaskParams, ValidationError,
};
