//! Mapping between connection values and the Newton unknown vector.

use cf_components::{ConnAttr, ConnectionSpec};
use cf_core::units::{k, pa};
use cf_fluids::{Composition, FluidModel, StateInput};
use cf_graph::Graph;
use nalgebra::DVector;

use crate::error::{SolverError, SolverResult};

/// Mass flow, pressure and enthalpy of one connection, SI units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectionValues {
    pub m: f64,
    pub p: f64,
    pub h: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Slot {
    Fixed(f64),
    Var(usize),
}

impl Slot {
    pub fn value(&self, x: &[f64]) -> f64 {
        match *self {
            Slot::Fixed(v) => v,
            Slot::Var(i) => x[i],
        }
    }

    pub fn fixed(&self) -> Option<f64> {
        match *self {
            Slot::Fixed(v) => Some(v),
            Slot::Var(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    MassFlow,
    Pressure,
    Enthalpy,
}

impl VarKind {
    /// Typical magnitude, used for finite difference steps and column scaling.
    pub fn typical(self) -> f64 {
        match self {
            VarKind::MassFlow => 1.0,
            VarKind::Pressure => 1e5,
            VarKind::Enthalpy => 1e4,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            VarKind::MassFlow => "m",
            VarKind::Pressure => "p",
            VarKind::Enthalpy => "h",
        }
    }
}

/// Connection specification that stays an equation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnEquation {
    pub conn: usize,
    pub attr: ConnAttr,
    pub value: f64,
}

/// Which connection values are fixed and which are unknowns.
#[derive(Clone, Debug)]
pub struct VariableLayout {
    pub m: Vec<Slot>,
    pub p: Vec<Slot>,
    pub h: Vec<Slot>,
    /// Per unknown: connection index and kind.
    pub vars: Vec<(usize, VarKind)>,
}

impl VariableLayout {
    /// Fix `m`, `p`, `h` directly; `T` or `x` at a fixed pressure fix `h`.
    /// Remaining `T`, `x` and `v` specs become equations.
    pub fn build(
        graph: &Graph,
        specs: &[ConnectionSpec],
        fluids: &[Composition],
        fluid: &dyn FluidModel,
    ) -> SolverResult<(Self, Vec<ConnEquation>)> {
        let mut layout = VariableLayout {
            m: Vec::with_capacity(specs.len()),
            p: Vec::with_capacity(specs.len()),
            h: Vec::with_capacity(specs.len()),
            vars: Vec::new(),
        };
        let mut equations = Vec::new();

        for (idx, (spec, comp)) in specs.iter().zip(fluids).enumerate() {
            let label = graph.connections()[idx].label.as_str();
            let fixed_h = Self::fixed_enthalpy(label, spec, comp, fluid)?;

            for (attr, value) in spec.fixed() {
                let converted = matches!(attr, ConnAttr::T | ConnAttr::X) && spec.p.is_some();
                if matches!(attr, ConnAttr::T | ConnAttr::X | ConnAttr::V) && !converted {
                    equations.push(ConnEquation {
                        conn: idx,
                        attr,
                        value,
                    });
                }
            }

            let slot = |value: Option<f64>, kind: VarKind, vars: &mut Vec<(usize, VarKind)>| {
                value.map(Slot::Fixed).unwrap_or_else(|| {
                    vars.push((idx, kind));
                    Slot::Var(vars.len() - 1)
                })
            };
            let m = slot(spec.m, VarKind::MassFlow, &mut layout.vars);
            let p = slot(spec.p, VarKind::Pressure, &mut layout.vars);
            let h = slot(fixed_h, VarKind::Enthalpy, &mut layout.vars);
            layout.m.push(m);
            layout.p.push(p);
            layout.h.push(h);
        }
        Ok((layout, equations))
    }

    fn fixed_enthalpy(
        label: &str,
        spec: &ConnectionSpec,
        comp: &Composition,
        fluid: &dyn FluidModel,
    ) -> SolverResult<Option<f64>> {
        let Some(p) = spec.p else {
            return Ok(spec.h);
        };
        let input = match (spec.t, spec.x) {
            (Some(_), Some(_)) => {
                return Err(SolverError::config(format!(
                    "connection {label}: T and x cannot both be fixed at a fixed pressure"
                )));
            }
            (Some(t), None) => StateInput::PT { p: pa(p), t: k(t) },
            (None, Some(x)) => StateInput::PQ { p: pa(p), x },
            (None, None) => return Ok(spec.h),
        };
        if spec.h.is_some() {
            return Err(SolverError::config(format!(
                "connection {label}: h is fixed together with a state that determines it"
            )));
        }
        let state = fluid.state(input, comp).map_err(|e| {
            SolverError::config(format!("connection {label}: cannot evaluate fixed state: {e}"))
        })?;
        Ok(Some(state.enthalpy()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn values(&self, x: &[f64]) -> Vec<ConnectionValues> {
        (0..self.m.len())
            .map(|i| ConnectionValues {
                m: self.m[i].value(x),
                p: self.p[i].value(x),
                h: self.h[i].value(x),
            })
            .collect()
    }

    /// Unknown vector from full connection values; fixed entries are ignored.
    pub fn pack(&self, values: &[ConnectionValues]) -> DVector<f64> {
        DVector::from_iterator(
            self.vars.len(),
            self.vars.iter().map(|&(conn, kind)| match kind {
                VarKind::MassFlow => values[conn].m,
                VarKind::Pressure => values[conn].p,
                VarKind::Enthalpy => values[conn].h,
            }),
        )
    }

    pub fn typical(&self) -> Vec<f64> {
        self.vars.iter().map(|(_, kind)| kind.typical()).collect()
    }

    pub fn pressure_vars(&self) -> Vec<usize> {
        self.vars
            .iter()
            .enumerate()
            .filter(|(_, (_, kind))| *kind == VarKind::Pressure)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn labels(&self, graph: &Graph) -> Vec<String> {
        self.vars
            .iter()
            .map(|&(conn, kind)| {
                format!("{}.{}", graph.connections()[conn].label, kind.suffix())
            })
            .collect()
    }
}
