//! Steady-state network solver for thermodynamic cycles.
//!
//! The unknowns are mass flow, pressure and specific enthalpy of every
//! connection that is not fixed by its specification. Component models,
//! connection specifications and energy buses contribute residual
//! equations; the square system is solved by Newton's method with a
//! finite difference Jacobian evaluated column-parallel.

pub mod error;
pub mod initialization;
pub mod jacobian;
pub mod layout;
pub mod newton;
pub mod problem;
pub mod solve;
pub mod steady;

pub use error::{SolverError, SolverResult};
pub use layout::{ConnectionValues, VariableLayout};
pub use newton::{NewtonConfig, NewtonResult};
pub use problem::{BusBinding, SteadyProblem};
pub use solve::solve;
pub use steady::{SteadySolution, connection_states, port_streams};
