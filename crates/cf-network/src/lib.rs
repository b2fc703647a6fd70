//! cf-network: labelled steady-state plant networks.
//!
//! A [`Network`] owns components, connections and energy buses by label,
//! converts user units, and solves in design or offdesign [`Mode`]. A
//! converged design solve can be saved as a design point and later used
//! as the reference of offdesign runs.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cf_components::{ComponentKind, ConnAttr, Param};
//! use cf_fluids::{Composition, RoutedModel, Species};
//! use cf_network::{Mode, Network};
//!
//! let mut net = Network::new("expansion", Arc::new(RoutedModel::standard()));
//! net.add_component("source", ComponentKind::Source)?;
//! net.add_component("turbine", ComponentKind::Turbine)?;
//! net.add_component("sink", ComponentKind::Sink)?;
//! net.connect("1", "source", 0, "turbine", 0)?;
//! net.connect("2", "turbine", 0, "sink", 0)?;
//! net.set_fluid("1", Composition::pure(Species::Water))?;
//! net.set_attr("1", ConnAttr::M, Some(10.0))?;
//! net.set_attr("1", ConnAttr::P, Some(150e5))?;
//! net.set_attr("1", ConnAttr::T, Some(873.15))?;
//! net.set_attr("2", ConnAttr::P, Some(0.1e5))?;
//! net.set_param("turbine", Param::EtaS, Some(0.9))?;
//! net.solve(Mode::Design, None)?;
//! # Ok::<(), cf_network::NetworkError>(())
//! ```

pub mod error;
pub mod mode;
pub mod network;
pub mod results;

pub use error::{NetworkError, NetworkResult};
pub use mode::Mode;
pub use network::{ConnectionEntry, Network, SolveReport};
pub use results::{BusMemberRow, BusRow, ComponentRow, ConnectionRow, NetworkResults};
