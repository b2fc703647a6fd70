//! Core graph data structures.

use cf_core::{CompId, ConnId};

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    Inlet,
    Outlet,
}

impl PortKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortKind::Inlet => "inlet",
            PortKind::Outlet => "outlet",
        }
    }
}

/// Port counts of a component and which inlet feeds which outlet.
///
/// A pass `(i, o)` means the fluid entering inlet `i` leaves through
/// outlet `o`; passes define fluid branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortLayout {
    pub inlets: usize,
    pub outlets: usize,
    pub passes: Vec<(usize, usize)>,
}

impl PortLayout {
    /// One outlet, nothing in.
    pub fn source() -> Self {
        Self {
            inlets: 0,
            outlets: 1,
            passes: Vec::new(),
        }
    }

    /// One inlet, nothing out.
    pub fn sink() -> Self {
        Self {
            inlets: 1,
            outlets: 0,
            passes: Vec::new(),
        }
    }

    /// Single stream straight through.
    pub fn through() -> Self {
        Self {
            inlets: 1,
            outlets: 1,
            passes: vec![(0, 0)],
        }
    }

    /// Two separate streams, side 1 and side 2.
    pub fn two_sided() -> Self {
        Self {
            inlets: 2,
            outlets: 2,
            passes: vec![(0, 0), (1, 1)],
        }
    }

    pub fn port_count(&self, kind: PortKind) -> usize {
        match kind {
            PortKind::Inlet => self.inlets,
            PortKind::Outlet => self.outlets,
        }
    }
}

/// One end of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub comp: CompId,
    pub port: usize,
}

impl PortRef {
    pub fn new(comp: CompId, port: usize) -> Self {
        Self { comp, port }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNode {
    pub id: CompId,
    pub label: String,
    pub layout: PortLayout,
    /// Edges entering this component do not count as graph dependencies.
    pub closes_cycle: bool,
}

/// Directed stream from an outlet port to an inlet port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnId,
    pub label: String,
    pub source: PortRef,
    pub target: PortRef,
}

/// Validated, immutable plant topology.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) components: Vec<ComponentNode>,
    pub(crate) connections: Vec<Connection>,
    /// Per component, connection at each inlet port.
    pub(crate) inlets: Vec<Vec<ConnId>>,
    /// Per component, connection at each outlet port.
    pub(crate) outlets: Vec<Vec<ConnId>>,
    /// Per connection, dense fluid branch index.
    pub(crate) branch_of: Vec<usize>,
    pub(crate) branch_count: usize,
    /// Components in flow order with cycle-closer edges cut.
    pub(crate) order: Vec<CompId>,
}

impl Graph {
    pub fn components(&self) -> &[ComponentNode] {
        &self.components
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn component(&self, id: CompId) -> Option<&ComponentNode> {
        self.components.get(id.index())
    }

    pub fn connection(&self, id: ConnId) -> Option<&Connection> {
        self.connections.get(id.index())
    }

    /// Connections at the inlet ports of a component, by port index.
    pub fn inlets(&self, comp: CompId) -> &[ConnId] {
        self.inlets.get(comp.index()).map_or(&[], |v| v.as_slice())
    }

    /// Connections at the outlet ports of a component, by port index.
    pub fn outlets(&self, comp: CompId) -> &[ConnId] {
        self.outlets.get(comp.index()).map_or(&[], |v| v.as_slice())
    }

    pub fn branch_of(&self, conn: ConnId) -> usize {
        self.branch_of[conn.index()]
    }

    pub fn branch_count(&self) -> usize {
        self.branch_count
    }

    /// Connections of one fluid branch, in id order.
    pub fn branch_members(&self, branch: usize) -> Vec<ConnId> {
        self.branch_of
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == branch)
            .map(|(i, _)| ConnId::from_index(i))
            .collect()
    }

    /// Components ordered upstream to downstream.
    pub fn flow_order(&self) -> &[CompId] {
        &self.order
    }

    pub fn find_component(&self, label: &str) -> Option<CompId> {
        self.components.iter().find(|c| c.label == label).map(|c| c.id)
    }

    pub fn find_connection(&self, label: &str) -> Option<ConnId> {
        self.connections.iter().find(|c| c.label == label).map(|c| c.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_kind_names() {
        assert_eq!(PortKind::Inlet.as_str(), "inlet");
        assert_ne!(PortKind::Inlet, PortKind::Outlet);
    }

    #[test]
    fn layouts() {
        assert_eq!(PortLayout::source().port_count(PortKind::Outlet), 1);
        assert_eq!(PortLayout::sink().port_count(PortKind::Inlet), 1);
        assert_eq!(PortLayout::two_sided().passes, vec![(0, 0), (1, 1)]);
    }
}
