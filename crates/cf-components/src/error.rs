//! Error types for component operations.

use cf_core::error::CfError;
use cf_fluids::FluidError;
use thiserror::Error;

/// Errors that can occur while configuring or evaluating components.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid value for {param}: {value} ({reason})")]
    InvalidParam {
        param: String,
        value: f64,
        reason: &'static str,
    },

    #[error("{kind} has no parameter '{param}'")]
    UnknownParam { kind: &'static str, param: String },

    #[error("'{param}' is listed in both the design and offdesign sets")]
    ConflictingModes { param: String },

    #[error("Design point has no value for '{param}'")]
    MissingDesignValue { param: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Fluid property error: {0}")]
    Fluid(#[from] FluidError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<ComponentError> for CfError {
    fn from(e: ComponentError) -> Self {
        CfError::InvalidArg {
            what: e.to_string(),
        }
    }
}
