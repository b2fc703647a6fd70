//! Incremental graph builder.

use cf_core::{CompId, ConnId};

use crate::error::GraphResult;
use crate::graph::{ComponentNode, Connection, Graph, PortLayout, PortRef};
use crate::validate;

/// Builder for constructing a graph incrementally.
///
/// Use `add_component` and `connect` to build up the graph,
/// then call `build()` to validate and freeze it into an immutable `Graph`.
#[derive(Debug, Default, Clone)]
pub struct GraphBuilder {
    components: Vec<ComponentNode>,
    connections: Vec<Connection>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component and return its ID.
    pub fn add_component(
        &mut self,
        label: impl Into<String>,
        layout: PortLayout,
        closes_cycle: bool,
    ) -> CompId {
        let id = CompId::from_index(self.components.len());
        self.components.push(ComponentNode {
            id,
            label: label.into(),
            layout,
            closes_cycle,
        });
        id
    }

    /// Add a directed connection from an outlet port to an inlet port.
    ///
    /// Port indices are checked by `build()`.
    pub fn connect(&mut self, label: impl Into<String>, source: PortRef, target: PortRef) -> ConnId {
        let id = ConnId::from_index(self.connections.len());
        self.connections.push(Connection {
            id,
            label: label.into(),
            source,
            target,
        });
        id
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Validate and freeze the topology.
    pub fn build(self) -> GraphResult<Graph> {
        validate::validate_labels(&self.components, &self.connections)?;
        let (inlets, outlets) = validate::attach_ports(&self.components, &self.connections)?;
        let order = validate::flow_order(&self.components, &self.connections)?;
        let (branch_of, branch_count) =
            validate::fluid_branches(&self.components, self.connections.len(), &inlets, &outlets);
        validate::validate_closers(&self.components, &inlets, &branch_of)?;

        Ok(Graph {
            components: self.components,
            connections: self.connections,
            inlets,
            outlets,
            branch_of,
            branch_count,
            order,
        })
    }
}
