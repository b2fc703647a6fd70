//! cf-graph: plant topology for cycleflow.
//!
//! Provides:
//! - Multi-port components and directed connections between
//!   `(component, port index)` pairs
//! - Incremental builder with structural validation (complete ports,
//!   no unresolved cycles, at most one cycle closer per fluid branch)
//! - Fluid branches: connections linked through component passes
//!
//! # Example
//!
//! ```
//! use cf_graph::{GraphBuilder, PortLayout, PortRef};
//!
//! let mut builder = GraphBuilder::new();
//! let source = builder.add_component("source", PortLayout::source(), false);
//! let pump = builder.add_component("pump", PortLayout::through(), false);
//! let sink = builder.add_component("sink", PortLayout::sink(), false);
//! builder.connect("1", PortRef::new(source, 0), PortRef::new(pump, 0));
//! builder.connect("2", PortRef::new(pump, 0), PortRef::new(sink, 0));
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.connections().len(), 2);
//! assert_eq!(graph.branch_count(), 1);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub(crate) mod validate;

pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{ComponentNode, Connection, Graph, PortKind, PortLayout, PortRef};
