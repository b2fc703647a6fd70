//! cf-components: component library for steady-state cycle networks.
//!
//! Provides equation-oriented models for:
//! - Sources, sinks and cycle closers
//! - Turbines (with Stodola cone law) and pumps
//! - Simple heat exchangers, two-stream heat exchangers and condensers
//!
//! Every model implements [`ComponentModel`]: for its current parameter
//! set it emits a fixed number of residual equations over the streams at
//! its ports. Connection specifications, energy buses and design point
//! records live here too, so the solver only depends on this crate.
//!
//! # Example
//!
//! ```no_run
//! use cf_components::{Component, ComponentKind, Param};
//!
//! let mut tu = Component::new("turbine", ComponentKind::Turbine.build());
//! tu.set_param(Param::EtaS, Some(0.9)).unwrap();
//! assert_eq!(tu.kind(), "Turbine");
//! ```

pub mod bus;
pub mod common;
pub mod component;
pub mod connection;
pub mod cycle_closer;
pub mod design;
pub mod equation;
pub mod error;
pub mod heat_exchanger;
pub mod param;
pub mod pump;
pub mod simple_heat_exchanger;
pub mod source_sink;
pub mod traits;
pub mod turbine;

// Re-exports
pub use bus::{Bus, BusBase, BusMember, Characteristic};
pub use component::{Component, ComponentKind, Model};
pub use connection::{ConnAttr, ConnectionSpec};
pub use cycle_closer::CycleCloser;
pub use design::{ComponentDesign, StreamRecord};
pub use equation::{Equation, EquationKind, Equations};
pub use error::{ComponentError, ComponentResult};
pub use heat_exchanger::{ExchangerKind, HeatExchanger};
pub use param::{ModeSets, Param, ParamValues};
pub use pump::Pump;
pub use simple_heat_exchanger::SimpleHeatExchanger;
pub use source_sink::{Sink, Source};
pub use traits::{
    ComponentModel, GuessContext, PortGuess, PortStreams, PressureRelation, Stream, mass_balance,
};
pub use turbine::{ConeReference, Turbine};
