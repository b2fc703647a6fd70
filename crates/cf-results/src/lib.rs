//! cf-results: design point and parametric study storage.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::{TopologySignature, topology_fingerprint};
pub use store::ResultStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Design point not found: {name}")]
    DesignNotFound { name: String },

    #[error("Study not found: {name}")]
    StudyNotFound { name: String },

    #[error("Invalid name '{name}': use letters, digits, '-', '_' or '.'")]
    InvalidName { name: String },

    #[error("Invalid record: {what}")]
    InvalidRecord { what: String },
}
