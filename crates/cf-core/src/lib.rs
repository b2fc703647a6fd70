//! cf-core: stable foundation for cycleflow.
//!
//! Contains:
//! - units (uom SI types, constructors and the user-facing unit system)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact IDs for components, connections and buses)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{CfError, CfResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
