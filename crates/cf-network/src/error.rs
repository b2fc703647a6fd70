//! Error classification for network solves.

use cf_components::ComponentError;
use cf_core::error::CfError;
use cf_graph::GraphError;
use cf_results::ResultsError;
use cf_solver::SolverError;
use thiserror::Error;

/// Everything a network operation can fail with, in four classes.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Over- or under-specified network, unknown labels, missing fluid,
    /// offdesign without a matching design point.
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    /// Newton did not reach the tolerance; the network is unchanged and
    /// may be re-solved with other start values or settings.
    #[error(
        "Convergence failure after {iterations} iterations (residual norm {residual_norm:.3e}): {reason}"
    )]
    ConvergenceFailure {
        residual_norm: f64,
        iterations: usize,
        reason: String,
    },

    /// Structurally invalid system: an equation depends on no unknown or
    /// an unknown appears in no equation.
    #[error("Singular system: {what}")]
    SingularSystem { what: String },

    #[error("Design point storage: {0}")]
    Io(#[from] ResultsError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;

impl NetworkError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        NetworkError::Configuration { what: what.into() }
    }

    /// Whether another attempt (other start values, relaxed settings) may
    /// succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, NetworkError::ConvergenceFailure { .. })
    }
}

impl From<SolverError> for NetworkError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::Configuration { what } => NetworkError::Configuration { what },
            SolverError::Component(c) => c.into(),
            SolverError::Graph(g) => g.into(),
            SolverError::ConvergenceFailed {
                residual_norm,
                iterations,
            } => NetworkError::ConvergenceFailure {
                residual_norm,
                iterations,
                reason: "residual above tolerance".into(),
            },
            SolverError::Fluid(f) => NetworkError::ConvergenceFailure {
                residual_norm: f64::NAN,
                iterations: 0,
                reason: format!("property evaluation failed during iteration: {f}"),
            },
            SolverError::SingularSystem { what } => NetworkError::SingularSystem { what },
        }
    }
}

impl From<ComponentError> for NetworkError {
    fn from(e: ComponentError) -> Self {
        NetworkError::config(e.to_string())
    }
}

impl From<GraphError> for NetworkError {
    fn from(e: GraphError) -> Self {
        NetworkError::config(e.to_string())
    }
}

impl From<NetworkError> for CfError {
    fn from(e: NetworkError) -> Self {
        CfError::InvalidArg {
            what: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_errors_are_classified() {
        let e: NetworkError = SolverError::ConvergenceFailed {
            residual_norm: 1.0,
            iterations: 50,
        }
        .into();
        assert!(e.is_recoverable());

        let e: NetworkError = SolverError::SingularSystem {
            what: "x".into(),
        }
        .into();
        assert!(matches!(e, NetworkError::SingularSystem { .. }));

        let e: NetworkError = SolverError::Component(ComponentError::MissingDesignValue {
            param: "kA".into(),
        })
        .into();
        assert!(matches!(e, NetworkError::Configuration { .. }));
    }

    #[test]
    fn property_failures_are_not_blamed_on_start_values() {
        let e: NetworkError = SolverError::Fluid(cf_fluids::FluidError::OutOfRange {
            what: "IF97 T(p,h)".into(),
        })
        .into();
        let NetworkError::ConvergenceFailure { reason, .. } = &e else {
            panic!("unexpected {e:?}");
        };
        assert!(reason.starts_with("property evaluation failed during iteration"));
        assert!(reason.contains("IF97 T(p,h)"));
        assert!(e.is_recoverable());
    }
}
