//! Problem definition for steady-state network solving.

use cf_components::{Bus, ComponentModel, ConnectionSpec};
use cf_core::CompId;
use cf_fluids::{Composition, FluidModel};
use cf_graph::Graph;

use crate::error::{SolverError, SolverResult};
use crate::layout::{ConnEquation, VariableLayout};

/// A bus together with the components its members refer to.
#[derive(Clone, Debug)]
pub struct BusBinding<'a> {
    pub bus: &'a Bus,
    /// Component of each member, aligned with `bus.members`.
    pub members: Vec<CompId>,
}

/// Steady-state network problem.
///
/// Unknowns are mass flow, pressure and enthalpy of every connection not
/// fixed by its specification. Equations come from components, from
/// connection specifications that do not fix an unknown directly, and
/// from buses with a fixed total.
pub struct SteadyProblem<'a> {
    pub graph: &'a Graph,
    pub fluid: &'a dyn FluidModel,
    /// Component models indexed like `graph.components()`.
    pub components: Vec<&'a dyn ComponentModel>,
    /// Connection specifications indexed like `graph.connections()`.
    pub connections: &'a [ConnectionSpec],
    pub buses: Vec<BusBinding<'a>>,
    /// Resolved fluid of every connection.
    pub fluids: Vec<Composition>,
    pub layout: VariableLayout,
    pub conn_equations: Vec<ConnEquation>,
}

impl<'a> SteadyProblem<'a> {
    pub fn new(
        graph: &'a Graph,
        fluid: &'a dyn FluidModel,
        components: Vec<&'a dyn ComponentModel>,
        connections: &'a [ConnectionSpec],
        buses: Vec<BusBinding<'a>>,
    ) -> SolverResult<Self> {
        if components.len() != graph.components().len() {
            return Err(SolverError::config(format!(
                "{} component models for {} graph components",
                components.len(),
                graph.components().len()
            )));
        }
        if connections.len() != graph.connections().len() {
            return Err(SolverError::config(format!(
                "{} connection specifications for {} graph connections",
                connections.len(),
                graph.connections().len()
            )));
        }
        for (node, model) in graph.components().iter().zip(&components) {
            if node.layout != model.layout() {
                return Err(SolverError::config(format!(
                    "component {}: port layout does not match its model ({})",
                    node.label,
                    model.kind()
                )));
            }
        }
        for binding in &buses {
            if binding.members.len() != binding.bus.members.len() {
                return Err(SolverError::config(format!(
                    "bus {}: unresolved members",
                    binding.bus.label
                )));
            }
            for &comp in &binding.members {
                let model = components.get(comp.index()).ok_or_else(|| {
                    SolverError::config(format!("bus {}: unknown component", binding.bus.label))
                })?;
                if !model.supports_bus() {
                    return Err(SolverError::config(format!(
                        "bus {}: {} components carry no power or heat",
                        binding.bus.label,
                        model.kind()
                    )));
                }
            }
        }

        let fluids = resolve_fluids(graph, connections)?;
        let (layout, conn_equations) = VariableLayout::build(graph, connections, &fluids, fluid)?;

        Ok(Self {
            graph,
            fluid,
            components,
            connections,
            buses,
            fluids,
            layout,
            conn_equations,
        })
    }

    pub fn num_free_vars(&self) -> usize {
        self.layout.len()
    }

    /// Equations the current specification will produce.
    pub fn num_equations(&self) -> usize {
        let components: usize = self.components.iter().map(|c| c.equation_count()).sum();
        let buses = self.buses.iter().filter(|b| b.bus.p.is_some()).count();
        components + self.conn_equations.len() + buses
    }

    /// Square system check, run before iterating.
    pub fn check_degrees_of_freedom(&self) -> SolverResult<()> {
        let (eqs, vars) = (self.num_equations(), self.num_free_vars());
        if eqs == vars {
            return Ok(());
        }
        let hint = if eqs > vars {
            "over-determined: remove a specification"
        } else {
            "under-determined: add a specification"
        };
        Err(SolverError::config(format!(
            "{eqs} equations for {vars} unknowns ({hint})"
        )))
    }
}

/// One fluid per branch: taken from whichever connections specify it,
/// all specifications must agree.
fn resolve_fluids(graph: &Graph, connections: &[ConnectionSpec]) -> SolverResult<Vec<Composition>> {
    let mut per_branch: Vec<Option<(usize, &Composition)>> = vec![None; graph.branch_count()];
    for (idx, spec) in connections.iter().enumerate() {
        let Some(fluid) = &spec.fluid else {
            continue;
        };
        let branch = graph.branch_of(graph.connections()[idx].id);
        match per_branch[branch] {
            None => per_branch[branch] = Some((idx, fluid)),
            Some((first, existing)) if !existing.matches(fluid) => {
                return Err(SolverError::config(format!(
                    "connections {} and {} are on one fluid branch but specify {} and {}",
                    graph.connections()[first].label,
                    graph.connections()[idx].label,
                    existing,
                    fluid
                )));
            }
            Some(_) => {}
        }
    }

    graph
        .connections()
        .iter()
        .map(|conn| {
            per_branch[graph.branch_of(conn.id)]
                .map(|(_, fluid)| fluid.clone())
                .ok_or_else(|| {
                    SolverError::config(format!(
                        "no fluid specified on the branch of connection {}",
                        conn.label
                    ))
                })
        })
        .collect()
}
