//! Error types for the cf-app service layer.

use std::path::PathBuf;

use cf_network::NetworkError;

/// Application error type wrapping the backend crates for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Plant error: {0}")]
    Project(String),

    #[error("Failed to read plant file: {path}")]
    PlantFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Plant compilation failed: {0}")]
    Compile(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Study not found: {0}")]
    StudyNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<cf_project::ProjectError> for AppError {
    fn from(err: cf_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<cf_results::ResultsError> for AppError {
    fn from(err: cf_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}

impl From<cf_components::ComponentError> for AppError {
    fn from(err: cf_components::ComponentError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<cf_fluids::FluidError> for AppError {
    fn from(err: cf_fluids::FluidError) -> Self {
        AppError::Compile(err.to_string())
    }
}
