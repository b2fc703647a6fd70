//! Fluid property errors.

use cf_core::CfError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Value out of the backend's valid range.
    #[error("Value out of range for {what}")]
    OutOfRange { what: String },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    /// Operation not supported (e.g., mixtures, unsupported species).
    #[error("Not supported: {what}")]
    NotSupported { what: String },

    /// Backend (CoolProp) error.
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl From<FluidError> for CfError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::InvalidArg { what } => CfError::InvalidArg { what },
            other => CfError::Invariant {
                what: format!("fluid: {other}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::NonPhysical { what: "pressure" };
        assert!(err.to_string().contains("pressure"));

        let err = FluidError::Backend {
            message: "CoolProp failed".into(),
        };
        assert!(err.to_string().contains("CoolProp"));
    }

    #[test]
    fn error_to_cf_error() {
        let fluid_err = FluidError::NotSupported {
            what: "mixtures".into(),
        };
        let cf_err: CfError = fluid_err.into();
        assert!(matches!(cf_err, CfError::Invariant { .. }));
    }
}
