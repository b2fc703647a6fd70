//! cf-fluids: fluid property calculations for cycleflow.
//!
//! Provides:
//! - Species definitions for steam, ORC and gas loops
//! - Mass-fraction compositions
//! - Fully evaluated thermodynamic states and saturation data
//! - `FluidModel` trait with IF97, CoolProp (feature `coolprop`) and
//!   perfect gas backends, plus a router dispatching by composition
//!
//! # Example
//!
//! ```no_run
//! use cf_fluids::{Composition, FluidModel, RoutedModel, Species, StateInput};
//! use cf_core::units::{bar, celsius};
//!
//! let model = RoutedModel::standard();
//! let water = Composition::pure(Species::Water);
//! let state = model
//!     .state(StateInput::PT { p: bar(150.0), t: celsius(600.0) }, &water)
//!     .unwrap();
//! println!("h = {} J/kg", state.enthalpy());
//! ```

pub mod composition;
#[cfg(feature = "coolprop")]
pub mod coolprop;
pub mod error;
pub mod if97;
pub mod model;
pub mod perfect_gas;
pub mod router;
pub mod species;
pub mod state;

pub use composition::Composition;
#[cfg(feature = "coolprop")]
pub use coolprop::CoolPropModel;
pub use error::{FluidError, FluidResult};
pub use if97::If97Model;
pub use model::FluidModel;
pub use perfect_gas::PerfectGasModel;
pub use router::RoutedModel;
pub use species::Species;
pub use state::{Saturation, SpecEnthalpy, SpecEntropy, StateInput, StateProps, ThermoState};
