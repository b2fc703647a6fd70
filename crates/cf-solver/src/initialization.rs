//! Start values for the Newton iteration.
//!
//! Without a warm start, known values are spread through the network in
//! three stages:
//! 1. exact relations: fixed pressure ratios and drops, equal pressure or
//!    enthalpy across a pass, mass conservation, component hints, and
//!    `T`/`x` specifications once pressure is known
//! 2. plain copies across passes for anything still unknown
//! 3. defaults (1 kg/s, 1 bar, enthalpy at 300 K)

use cf_components::{GuessContext, PortGuess};

use crate::layout::ConnectionValues;
use crate::problem::SteadyProblem;
use crate::steady::{enthalpy_pt, enthalpy_px};

const DEFAULT_MASS_FLOW: f64 = 1.0;
const DEFAULT_PRESSURE: f64 = 1e5;
const DEFAULT_TEMPERATURE: f64 = 300.0;
const FALLBACK_ENTHALPY: f64 = 1e5;

/// Start values for every connection.
///
/// A warm start must have one entry per connection; fixed values of the
/// current specification always win over it.
pub fn initial_values(
    problem: &SteadyProblem<'_>,
    warm_start: Option<&[ConnectionValues]>,
) -> Vec<ConnectionValues> {
    let layout = &problem.layout;
    if let Some(start) = warm_start.filter(|s| s.len() == layout.m.len()) {
        return layout.values(layout.pack(start).as_slice());
    }

    let mut guess: Vec<PortGuess> = (0..layout.m.len())
        .map(|i| PortGuess {
            m: layout.m[i].fixed(),
            p: layout.p[i].fixed(),
            h: layout.h[i].fixed(),
        })
        .collect();

    let max_sweeps = 2 * guess.len() + 4;
    for _ in 0..max_sweeps {
        let mut changed = propagate_exact(problem, &mut guess);
        changed |= apply_state_specs(problem, &mut guess);
        if !changed {
            break;
        }
    }
    for _ in 0..max_sweeps {
        if !propagate_copies(problem, &mut guess) {
            break;
        }
    }

    guess
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let p = g.p.unwrap_or(DEFAULT_PRESSURE);
            ConnectionValues {
                m: g.m.unwrap_or(DEFAULT_MASS_FLOW),
                p,
                h: g.h.unwrap_or_else(|| {
                    enthalpy_pt(problem, i, p, DEFAULT_TEMPERATURE).unwrap_or(FALLBACK_ENTHALPY)
                }),
            }
        })
        .collect()
}

fn fill(slot: &mut Option<f64>, value: Option<f64>) -> bool {
    match (slot.is_none(), value) {
        (true, Some(v)) if v.is_finite() => {
            *slot = Some(v);
            true
        }
        _ => false,
    }
}

fn propagate_exact(problem: &SteadyProblem<'_>, guess: &mut [PortGuess]) -> bool {
    let graph = problem.graph;
    let mut changed = false;

    for &comp in graph.flow_order() {
        let model = problem.components[comp.index()];
        let inlets = graph.inlets(comp);
        let outlets = graph.outlets(comp);

        for (pass, &(i, o)) in model.layout().passes.iter().enumerate() {
            let (ci, co) = (inlets[i].index(), outlets[o].index());
            if let Some(rel) = model.pressure_relation(pass) {
                let forward = guess[ci].p.map(|p| rel.forward(p));
                changed |= fill(&mut guess[co].p, forward);
                let backward = guess[co].p.and_then(|p| rel.backward(p));
                changed |= fill(&mut guess[ci].p, backward);
            }
            if model.enthalpy_equal(pass) {
                let (h_in, h_out) = (guess[ci].h, guess[co].h);
                changed |= fill(&mut guess[co].h, h_in);
                changed |= fill(&mut guess[ci].h, h_out);
            }
            if !model.closes_cycle() {
                let (m_in, m_out) = (guess[ci].m, guess[co].m);
                changed |= fill(&mut guess[co].m, m_in);
                changed |= fill(&mut guess[ci].m, m_out);
            }
        }

        let mut ctx = GuessContext {
            inlets: inlets.iter().map(|c| guess[c.index()]).collect(),
            outlets: outlets.iter().map(|c| guess[c.index()]).collect(),
            inlet_fluids: inlets.iter().map(|c| &problem.fluids[c.index()]).collect(),
            outlet_fluids: outlets.iter().map(|c| &problem.fluids[c.index()]).collect(),
        };
        model.hint(problem.fluid, &mut ctx);
        for (conn, hinted) in inlets
            .iter()
            .zip(&ctx.inlets)
            .chain(outlets.iter().zip(&ctx.outlets))
        {
            let g = &mut guess[conn.index()];
            changed |= fill(&mut g.m, hinted.m);
            changed |= fill(&mut g.p, hinted.p);
            changed |= fill(&mut g.h, hinted.h);
        }
    }
    changed
}

/// `T` and `x` specifications give enthalpy once pressure is known.
fn apply_state_specs(problem: &SteadyProblem<'_>, guess: &mut [PortGuess]) -> bool {
    let mut changed = false;
    for (i, spec) in problem.connections.iter().enumerate() {
        let (Some(p), None) = (guess[i].p, guess[i].h) else {
            continue;
        };
        let h = match (spec.t, spec.x) {
            (Some(t), _) => enthalpy_pt(problem, i, p, t),
            (None, Some(x)) => enthalpy_px(problem, i, p, x),
            (None, None) => None,
        };
        changed |= fill(&mut guess[i].h, h);
    }
    changed
}

fn propagate_copies(problem: &SteadyProblem<'_>, guess: &mut [PortGuess]) -> bool {
    let graph = problem.graph;
    let mut changed = false;
    for node in graph.components() {
        let inlets = graph.inlets(node.id);
        let outlets = graph.outlets(node.id);
        for &(i, o) in &node.layout.passes {
            let (ci, co) = (inlets[i].index(), outlets[o].index());
            let (a, b) = (guess[ci], guess[co]);
            changed |= fill(&mut guess[co].m, a.m);
            changed |= fill(&mut guess[co].p, a.p);
            changed |= fill(&mut guess[co].h, a.h);
            changed |= fill(&mut guess[ci].m, b.m);
            changed |= fill(&mut guess[ci].p, b.p);
            changed |= fill(&mut guess[ci].h, b.h);
        }
    }
    changed
}
