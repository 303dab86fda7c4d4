//! # Scriptorium Common Library
//!
//! Shared code for the Scriptorium dashboard:
//! - Domain records passed through from the pipeline backend
//! - HTTP client facade over the backend's REST API
//! - Canon catalog (book codes, names, groupings)
//! - Scripture and book selector state
//! - Progress and task-result aggregation
//! - Task creation form assembly
//! - Configuration loading

pub mod books;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod model;
pub mod progress;
pub mod selection;
pub mod timestamp;

pub use client::ApiClient;
pub use error::{Error, Result};
