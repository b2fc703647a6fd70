//! Graph validation logic.

use std::collections::HashSet;

use cf_core::{CompId, ConnId};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;

use crate::error::{GraphError, GraphResult};
use crate::graph::{ComponentNode, Connection, PortKind};

type PortTable = Vec<Vec<ConnId>>;

pub(crate) fn validate_labels(
    components: &[ComponentNode],
    connections: &[Connection],
) -> GraphResult<()> {
    if components.is_empty() {
        return Err(GraphError::Empty);
    }

    let mut seen = HashSet::new();
    for comp in components {
        if !seen.insert(comp.label.as_str()) {
            return Err(GraphError::DuplicateLabel {
                what: "component",
                label: comp.label.clone(),
            });
        }
        if comp
            .layout
            .passes
            .iter()
            .any(|&(i, o)| i >= comp.layout.inlets || o >= comp.layout.outlets)
        {
            return Err(GraphError::InvalidLayout {
                component: comp.label.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for conn in connections {
        if !seen.insert(conn.label.as_str()) {
            return Err(GraphError::DuplicateLabel {
                what: "connection",
                label: conn.label.clone(),
            });
        }
    }
    Ok(())
}

/// Attach every connection to its ports and require every port to be used
/// exactly once.
pub(crate) fn attach_ports(
    components: &[ComponentNode],
    connections: &[Connection],
) -> GraphResult<(PortTable, PortTable)> {
    let mut inlets: Vec<Vec<Option<ConnId>>> = components
        .iter()
        .map(|c| vec![None; c.layout.inlets])
        .collect();
    let mut outlets: Vec<Vec<Option<ConnId>>> = components
        .iter()
        .map(|c| vec![None; c.layout.outlets])
        .collect();

    for conn in connections {
        for (end, kind) in [(conn.source, PortKind::Outlet), (conn.target, PortKind::Inlet)] {
            let comp = components
                .get(end.comp.index())
                .ok_or(GraphError::InvalidCompRef {
                    connection: conn.label.clone(),
                    index: end.comp.index(),
                })?;
            let table = match kind {
                PortKind::Inlet => &mut inlets[end.comp.index()],
                PortKind::Outlet => &mut outlets[end.comp.index()],
            };
            let slot = table.get_mut(end.port).ok_or_else(|| GraphError::PortOutOfRange {
                connection: conn.label.clone(),
                component: comp.label.clone(),
                kind: kind.as_str(),
                port: end.port,
                available: comp.layout.port_count(kind),
            })?;
            if slot.is_some() {
                return Err(GraphError::PortAlreadyConnected {
                    component: comp.label.clone(),
                    kind: kind.as_str(),
                    port: end.port,
                });
            }
            *slot = Some(conn.id);
        }
    }

    let finish = |table: Vec<Vec<Option<ConnId>>>, kind: PortKind| -> GraphResult<PortTable> {
        table
            .into_iter()
            .zip(components)
            .map(|(ports, comp)| {
                ports
                    .into_iter()
                    .enumerate()
                    .map(|(port, slot)| {
                        slot.ok_or_else(|| GraphError::UnconnectedPort {
                            component: comp.label.clone(),
                            kind: kind.as_str(),
                            port,
                        })
                    })
                    .collect()
            })
            .collect()
    };

    Ok((finish(inlets, PortKind::Inlet)?, finish(outlets, PortKind::Outlet)?))
}

/// Topological order with edges into cycle closers removed; any remaining
/// cycle is unresolved.
pub(crate) fn flow_order(
    components: &[ComponentNode],
    connections: &[Connection],
) -> GraphResult<Vec<CompId>> {
    let mut graph: DiGraph<CompId, ()> = DiGraph::with_capacity(components.len(), connections.len());
    let nodes: Vec<NodeIndex> = components.iter().map(|c| graph.add_node(c.id)).collect();

    for conn in connections {
        if components[conn.target.comp.index()].closes_cycle {
            continue;
        }
        graph.add_edge(
            nodes[conn.source.comp.index()],
            nodes[conn.target.comp.index()],
            (),
        );
    }

    toposort(&graph, None)
        .map(|order| order.into_iter().map(|n| graph[n]).collect())
        .map_err(|cycle| GraphError::UnresolvedCycle {
            component: components[graph[cycle.node_id()].index()].label.clone(),
        })
}

/// Union connections linked through component passes; returns a dense
/// branch index per connection, numbered by first appearance.
pub(crate) fn fluid_branches(
    components: &[ComponentNode],
    connection_count: usize,
    inlets: &PortTable,
    outlets: &PortTable,
) -> (Vec<usize>, usize) {
    let mut sets = UnionFind::<usize>::new(connection_count);
    for comp in components {
        let idx = comp.id.index();
        for &(i, o) in &comp.layout.passes {
            sets.union(inlets[idx][i].index(), outlets[idx][o].index());
        }
    }

    let roots = sets.into_labeling();
    let mut dense: Vec<Option<usize>> = vec![None; connection_count];
    let mut branch_of = Vec::with_capacity(connection_count);
    let mut count = 0;
    for root in roots {
        let branch = *dense[root].get_or_insert_with(|| {
            count += 1;
            count - 1
        });
        branch_of.push(branch);
    }
    (branch_of, count)
}

pub(crate) fn validate_closers(
    components: &[ComponentNode],
    inlets: &PortTable,
    branch_of: &[usize],
) -> GraphResult<()> {
    let mut owner: Vec<(usize, &str)> = Vec::new();
    for comp in components.iter().filter(|c| c.closes_cycle) {
        let Some(conn) = inlets[comp.id.index()].first() else {
            continue;
        };
        let branch = branch_of[conn.index()];
        if let Some((_, first)) = owner.iter().find(|(b, _)| *b == branch) {
            return Err(GraphError::MultipleCycleClosers {
                first: first.to_string(),
                second: comp.label.clone(),
            });
        }
        owner.push((branch, comp.label.as_str()));
    }
    Ok(())
}
