//! Residual assembly for the steady-state system.

use cf_components::{ConnAttr, EquationKind, Equations, PortStreams, Stream};
use cf_core::units::{k, pa};
use cf_fluids::{StateInput, ThermoState};
use nalgebra::DVector;

use crate::error::{SolverError, SolverResult};
use crate::layout::ConnectionValues;
use crate::problem::SteadyProblem;

/// Converged steady-state values.
#[derive(Clone, Debug)]
pub struct SteadySolution {
    pub values: Vec<ConnectionValues>,
    pub states: Vec<ThermoState>,
    pub residual_norm: f64,
    pub iterations: usize,
}

/// Thermodynamic state of every connection.
pub fn connection_states(
    problem: &SteadyProblem<'_>,
    values: &[ConnectionValues],
) -> SolverResult<Vec<ThermoState>> {
    values
        .iter()
        .zip(&problem.fluids)
        .map(|(v, comp)| {
            problem
                .fluid
                .state(StateInput::PH { p: pa(v.p), h: v.h }, comp)
                .map_err(SolverError::from)
        })
        .collect()
}

/// Streams at the ports of one component.
pub fn port_streams<'p>(
    problem: &'p SteadyProblem<'_>,
    comp_index: usize,
    values: &[ConnectionValues],
    states: &[ThermoState],
) -> PortStreams<'p> {
    let id = problem.graph.components()[comp_index].id;
    let stream = |conn: &cf_core::ConnId| Stream {
        m: values[conn.index()].m,
        state: states[conn.index()],
        fluid: &problem.fluids[conn.index()],
    };
    PortStreams {
        inlets: problem.graph.inlets(id).iter().map(stream).collect(),
        outlets: problem.graph.outlets(id).iter().map(stream).collect(),
    }
}

/// Scaled residual vector at `x`.
pub fn compute_residuals(x: &[f64], problem: &SteadyProblem<'_>) -> SolverResult<DVector<f64>> {
    let eqs = assemble(x, problem, None)?;
    Ok(DVector::from_iterator(
        eqs.len(),
        eqs.iter().map(|e| e.scaled()),
    ))
}

/// Owner-qualified label of every equation, e.g. `turbine: eta_s`.
pub fn equation_labels(x: &[f64], problem: &SteadyProblem<'_>) -> SolverResult<Vec<String>> {
    let mut labels = Vec::with_capacity(problem.num_equations());
    assemble(x, problem, Some(&mut labels))?;
    Ok(labels)
}

fn assemble(
    x: &[f64],
    problem: &SteadyProblem<'_>,
    mut labels: Option<&mut Vec<String>>,
) -> SolverResult<Equations> {
    let values = problem.layout.values(x);
    let states = connection_states(problem, &values)?;
    let mut eqs = Equations::with_capacity(problem.num_equations());

    let mut label = |owner: &str, eqs: &Equations, start: usize| {
        if let Some(labels) = labels.as_deref_mut() {
            labels.extend(eqs.since(start).iter().map(|e| format!("{owner}: {}", e.label)));
        }
    };

    for (idx, model) in problem.components.iter().enumerate() {
        let ports = port_streams(problem, idx, &values, &states);
        let start = eqs.len();
        model.residuals(problem.fluid, &ports, &mut eqs)?;
        let emitted = eqs.len() - start;
        let owner = &problem.graph.components()[idx].label;
        if emitted != model.equation_count() {
            return Err(SolverError::config(format!(
                "component {owner} ({}) emitted {emitted} equations but declares {}",
                model.kind(),
                model.equation_count()
            )));
        }
        label(owner, &eqs, start);
    }

    for spec in &problem.conn_equations {
        let (v, state, comp) = (
            values[spec.conn],
            &states[spec.conn],
            &problem.fluids[spec.conn],
        );
        let start = eqs.len();
        match spec.attr {
            // same forward function that fixes h when p is known
            ConnAttr::T => {
                let h_t = problem
                    .fluid
                    .state(StateInput::PT { p: pa(v.p), t: k(spec.value) }, comp)?
                    .enthalpy();
                eqs.push(EquationKind::Enthalpy, "T", v.h - h_t);
            }
            ConnAttr::X => {
                let h_x = problem
                    .fluid
                    .state(StateInput::PQ { p: pa(v.p), x: spec.value }, comp)?
                    .enthalpy();
                eqs.push(EquationKind::Enthalpy, "x", v.h - h_x);
            }
            ConnAttr::V => eqs.push(
                EquationKind::VolumetricFlow,
                "v",
                v.m * state.specific_volume() - spec.value,
            ),
            ConnAttr::M | ConnAttr::P | ConnAttr::H => {}
        }
        let owner = format!("connection {}", problem.graph.connections()[spec.conn].label);
        label(&owner, &eqs, start);
    }

    for binding in problem.buses.iter() {
        let Some(target) = binding.bus.p else {
            continue;
        };
        let member_values: Vec<f64> = binding
            .members
            .iter()
            .map(|comp| {
                let ports = port_streams(problem, comp.index(), &values, &states);
                problem.components[comp.index()]
                    .bus_value(&ports)
                    .unwrap_or(0.0)
            })
            .collect();
        let start = eqs.len();
        eqs.push(EquationKind::Power, "P", binding.bus.total(&member_values) - target);
        label(&format!("bus {}", binding.bus.label), &eqs, start);
    }

    Ok(eqs)
}

/// Enthalpy at a pressure and temperature, for start values.
pub(crate) fn enthalpy_pt(
    problem: &SteadyProblem<'_>,
    conn: usize,
    p: f64,
    t: f64,
) -> Option<f64> {
    problem
        .fluid
        .state(StateInput::PT { p: pa(p), t: k(t) }, &problem.fluids[conn])
        .ok()
        .map(|s| s.enthalpy())
}

/// Enthalpy at a pressure and quality, for start values.
pub(crate) fn enthalpy_px(
    problem: &SteadyProblem<'_>,
    conn: usize,
    p: f64,
    x: f64,
) -> Option<f64> {
    problem
        .fluid
        .state(StateInput::PQ { p: pa(p), x }, &problem.fluids[conn])
        .ok()
        .map(|s| s.enthalpy())
}
