//! Error types for solver operations.

use cf_components::ComponentError;
use cf_core::error::CfError;
use cf_fluids::FluidError;
use thiserror::Error;

/// Errors that can occur during network solving.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The problem is not well posed: wrong equation count, missing fluid,
    /// inconsistent specification.
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Did not converge: residual norm {residual_norm:.3e} after {iterations} iterations")]
    ConvergenceFailed {
        residual_norm: f64,
        iterations: usize,
    },

    #[error("Singular system: {what}")]
    SingularSystem { what: String },

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Graph error: {0}")]
    Graph(#[from] cf_graph::GraphError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        SolverError::Configuration { what: what.into() }
    }
}

impl From<SolverError> for CfError {
    fn from(e: SolverError) -> Self {
        CfError::InvalidArg {
            what: e.to_string(),
        }
    }
}
