//! Design and offdesign specification sets.

use std::fmt;
use std::str::FromStr;

use cf_components::{Bus, Component, ComponentDesign, ConnectionSpec};
use cf_graph::Graph;
use cf_results::DesignPoint;

use crate::error::{NetworkError, NetworkResult};

/// Which specification set a solve uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// User specifications; characteristics such as `kA` are results.
    #[default]
    Design,
    /// Design-only specifications released, offdesign ones fixed at their
    /// design point values.
    Offdesign,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Design => "design",
            Mode::Offdesign => "offdesign",
        })
    }
}

impl FromStr for Mode {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "design" => Ok(Mode::Design),
            "offdesign" | "off-design" | "off_design" => Ok(Mode::Offdesign),
            other => Err(NetworkError::config(format!("unknown mode '{other}'"))),
        }
    }
}

/// Specifications handed to the solver for one run.
pub(crate) struct ModeSpecs {
    pub components: Vec<Component>,
    pub connections: Vec<ConnectionSpec>,
    pub buses: Vec<Bus>,
}

/// Offdesign copies of every component, connection and bus.
///
/// The design point must already be checked against the topology.
pub(crate) fn offdesign_specs(
    graph: &Graph,
    components: &[Component],
    connections: &[ConnectionSpec],
    buses: &[Bus],
    design: &DesignPoint,
) -> NetworkResult<ModeSpecs> {
    let stream = |label: &str| {
        design
            .connection(label)
            .map(|c| c.stream())
            .ok_or_else(|| {
                NetworkError::config(format!(
                    "design point '{}' has no connection {label}",
                    design.name
                ))
            })
    };

    let mut comps = Vec::with_capacity(components.len());
    for (node, component) in graph.components().iter().zip(components) {
        let record = design.component(&component.label).ok_or_else(|| {
            NetworkError::config(format!(
                "design point '{}' has no component {}",
                design.name, component.label
            ))
        })?;
        let ports = |ids: &[cf_core::ConnId]| -> NetworkResult<Vec<_>> {
            ids.iter()
                .map(|id| stream(&graph.connections()[id.index()].label))
                .collect()
        };
        let reference = ComponentDesign {
            params: record.param_values()?,
            inlets: ports(graph.inlets(node.id))?,
            outlets: ports(graph.outlets(node.id))?,
        };
        let off = component.offdesign(&reference).map_err(|e| {
            NetworkError::config(format!("component {}: {e}", component.label))
        })?;
        comps.push(off);
    }

    let mut conns = Vec::with_capacity(connections.len());
    for (conn, spec) in graph.connections().iter().zip(connections) {
        let off = spec
            .offdesign(&stream(&conn.label)?)
            .map_err(|e| NetworkError::config(format!("connection {}: {e}", conn.label)))?;
        conns.push(off);
    }

    let buses = buses
        .iter()
        .map(|bus| {
            let Some(record) = design.bus(&bus.label) else {
                return bus.clone();
            };
            let values: Vec<Option<f64>> = bus
                .members
                .iter()
                .map(|member| {
                    record
                        .members
                        .iter()
                        .find(|m| m.component == member.component)
                        .map(|m| m.value_w)
                })
                .collect();
            bus.with_design_values(&values)
        })
        .collect();

    Ok(ModeSpecs {
        components: comps,
        connections: conns,
        buses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names() {
        assert_eq!("Off-Design".parse::<Mode>().unwrap(), Mode::Offdesign);
        assert_eq!(Mode::Design.to_string(), "design");
        assert!("transient".parse::<Mode>().is_err());
    }
}
