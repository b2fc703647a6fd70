//! Result tables of a converged solve.

use cf_components::{ComponentModel, Param, ParamValues, StreamRecord, Stream};
use cf_fluids::Composition;
use cf_results::{
    BusMemberRecord, BusRecord, ComponentRecord, ConnectionRecord, DesignPoint,
};
use cf_solver::{SteadyProblem, SteadySolution, port_streams};

use crate::error::NetworkResult;
use crate::mode::Mode;

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionRow {
    pub label: String,
    pub fluid: Composition,
    pub stream: StreamRecord,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentRow {
    pub label: String,
    pub kind: &'static str,
    pub params: ParamValues,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BusMemberRow {
    pub component: String,
    /// Component power or heat flow [W].
    pub value: f64,
    /// Share of the bus total [W].
    pub contribution: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BusRow {
    pub label: String,
    pub total: f64,
    pub members: Vec<BusMemberRow>,
}

/// Converged state of a network, SI units.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkResults {
    pub mode: Mode,
    pub fingerprint: String,
    pub iterations: usize,
    pub residual_norm: f64,
    pub connections: Vec<ConnectionRow>,
    pub components: Vec<ComponentRow>,
    pub buses: Vec<BusRow>,
}

impl NetworkResults {
    pub(crate) fn collect(
        problem: &SteadyProblem<'_>,
        solution: &SteadySolution,
        mode: Mode,
        fingerprint: String,
    ) -> NetworkResult<Self> {
        let graph = problem.graph;
        let connections = graph
            .connections()
            .iter()
            .enumerate()
            .map(|(i, conn)| {
                let stream = Stream {
                    m: solution.values[i].m,
                    state: solution.states[i],
                    fluid: &problem.fluids[i],
                };
                ConnectionRow {
                    label: conn.label.clone(),
                    fluid: problem.fluids[i].clone(),
                    stream: StreamRecord::from_stream(&stream),
                }
            })
            .collect();

        let mut components = Vec::with_capacity(problem.components.len());
        let mut bus_values = vec![None; problem.components.len()];
        for (i, (node, model)) in graph.components().iter().zip(&problem.components).enumerate() {
            let ports = port_streams(problem, i, &solution.values, &solution.states);
            components.push(ComponentRow {
                label: node.label.clone(),
                kind: model.kind(),
                params: model.results(problem.fluid, &ports)?,
            });
            bus_values[i] = model.bus_value(&ports);
        }

        let buses = problem
            .buses
            .iter()
            .map(|binding| {
                let members: Vec<BusMemberRow> = binding
                    .bus
                    .members
                    .iter()
                    .zip(&binding.members)
                    .map(|(member, comp)| {
                        let value = bus_values[comp.index()].unwrap_or(0.0);
                        BusMemberRow {
                            component: member.component.clone(),
                            value,
                            contribution: member.contribution(value),
                        }
                    })
                    .collect();
                BusRow {
                    label: binding.bus.label.clone(),
                    total: members.iter().map(|m| m.contribution).sum(),
                    members,
                }
            })
            .collect();

        Ok(Self {
            mode,
            fingerprint,
            iterations: solution.iterations,
            residual_norm: solution.residual_norm,
            connections,
            components,
            buses,
        })
    }

    pub fn connection(&self, label: &str) -> Option<&ConnectionRow> {
        self.connections.iter().find(|c| c.label == label)
    }

    pub fn component(&self, label: &str) -> Option<&ComponentRow> {
        self.components.iter().find(|c| c.label == label)
    }

    pub fn bus(&self, label: &str) -> Option<&BusRow> {
        self.buses.iter().find(|b| b.label == label)
    }

    /// Result parameter of a component.
    pub fn param(&self, component: &str, param: Param) -> Option<f64> {
        self.component(component)?.params.get(&param).copied()
    }

    /// Bus total over absolute heat input: `|P| / |Q|`.
    pub fn efficiency(&self, bus: &str, heat_source: &str) -> Option<f64> {
        let power = self.bus(bus)?.total;
        let heat = self.param(heat_source, Param::Q)?;
        (heat.abs() > f64::EPSILON).then(|| power.abs() / heat.abs())
    }

    pub(crate) fn design_point(&self, name: &str, created_at: String) -> DesignPoint {
        DesignPoint {
            name: name.to_string(),
            created_at,
            fingerprint: self.fingerprint.clone(),
            connections: self
                .connections
                .iter()
                .map(|c| ConnectionRecord::new(c.label.clone(), &c.fluid, &c.stream))
                .collect(),
            components: self
                .components
                .iter()
                .map(|c| ComponentRecord::new(c.label.clone(), c.kind, &c.params))
                .collect(),
            buses: self
                .buses
                .iter()
                .map(|b| BusRecord {
                    label: b.label.clone(),
                    total_w: b.total,
                    members: b
                        .members
                        .iter()
                        .map(|m| BusMemberRecord {
                            component: m.component.clone(),
                            value_w: m.value,
                            contribution_w: m.contribution,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
