//! Shared application service layer for cycleflow.
//!
//! Loads plant files, compiles them into networks, runs design and
//! offdesign solves and parametric studies, and stores design points and
//! study records. The CLI is a thin shell over this crate.

pub mod compile;
pub mod error;
pub mod presets;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod run_service;
pub mod study;
pub mod sweep;

// Re-export key types for convenience
pub use compile::{build_fluid_model, compile_plant, newton_config};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage, StudyProgress};
pub use project_service::{PlantSummary, load_plant, save_plant, summarize};
pub use query::{Table, bus_table, component_table, connection_table, study_table};
pub use run_service::{
    SolveRequest, SolveResponse, StudyOutcome, StudyRequest, StudyResponse, list_designs,
    load_study, open_store, run_studies, run_studies_with_progress, solve_plant,
    solve_plant_with_progress,
};
pub use study::{StudyPlan, StudyVariable, run_study};
