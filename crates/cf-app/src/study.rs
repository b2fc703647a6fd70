//! Parametric studies over a solved base network.
//!
//! Every point runs on its own clone of the base network and warm starts
//! from the last converged point. A failed point is recorded with its
//! error and the sweep moves on.

use std::collections::BTreeMap;

use cf_components::{ConnAttr, Param};
use cf_network::{Mode, Network, NetworkResults};
use cf_project::schema::{ModeDef, StudyDef, VariableDef};
use cf_results::{DesignPoint, StudyRecord};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::sweep;

/// Quantity set per study point. Values are in the network's user units,
/// bus power in W.
#[derive(Debug, Clone, PartialEq)]
pub enum StudyVariable {
    Connection { label: String, attr: ConnAttr },
    Component { label: String, param: Param },
    BusPower { label: String },
}

impl StudyVariable {
    pub fn from_def(def: &VariableDef) -> AppResult<Self> {
        Ok(match def {
            VariableDef::Connection { label, attr } => StudyVariable::Connection {
                label: label.clone(),
                attr: attr.parse()?,
            },
            VariableDef::Component { label, param } => StudyVariable::Component {
                label: label.clone(),
                param: param.parse()?,
            },
            VariableDef::BusPower { label } => StudyVariable::BusPower {
                label: label.clone(),
            },
        })
    }

    pub fn name(&self) -> String {
        match self {
            StudyVariable::Connection { label, attr } => format!("connection {label}.{attr}"),
            StudyVariable::Component { label, param } => format!("component {label}.{param}"),
            StudyVariable::BusPower { label } => format!("bus {label}.P"),
        }
    }

    /// Set (`Some`) or release (`None`) the variable on a network.
    pub fn apply(&self, net: &mut Network, value: Option<f64>) -> AppResult<()> {
        match self {
            StudyVariable::Connection { label, attr } => net.set_attr(label, *attr, value)?,
            StudyVariable::Component { label, param } => net.set_param(label, *param, value)?,
            StudyVariable::BusPower { label } => net.set_bus_power(label, value)?,
        }
        Ok(())
    }
}

/// A study ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyPlan {
    pub name: String,
    pub mode: Mode,
    pub variable: StudyVariable,
    pub values: Vec<f64>,
    /// Set to the point value plus the offset.
    pub linked: Vec<(StudyVariable, f64)>,
    pub release: Vec<StudyVariable>,
    /// Bus reported as `power`.
    pub bus: Option<String>,
    /// Component whose `Q` is reported as `heat_input`.
    pub heat_input: Option<String>,
}

impl StudyPlan {
    pub fn from_def(def: &StudyDef) -> AppResult<Self> {
        Ok(Self {
            name: def.name.clone(),
            mode: match def.mode {
                ModeDef::Design => Mode::Design,
                ModeDef::Offdesign => Mode::Offdesign,
            },
            variable: StudyVariable::from_def(&def.variable)?,
            values: sweep::values(&def.values),
            linked: def
                .linked
                .iter()
                .map(|link| Ok((StudyVariable::from_def(&link.variable)?, link.offset)))
                .collect::<AppResult<_>>()?,
            release: def
                .release
                .iter()
                .map(StudyVariable::from_def)
                .collect::<AppResult<_>>()?,
            bus: def.outputs.bus.clone(),
            heat_input: def.outputs.heat_input.clone(),
        })
    }

    /// Set the study variable and every linked one for a point.
    pub fn apply_point(&self, net: &mut Network, value: f64) -> AppResult<()> {
        self.variable.apply(net, Some(value))?;
        for (variable, offset) in &self.linked {
            variable.apply(net, Some(value + offset))?;
        }
        Ok(())
    }
}

/// Outputs of one converged point.
fn outputs(
    plan: &StudyPlan,
    results: &NetworkResults,
    iterations: usize,
    residual_norm: f64,
) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    out.insert("iterations".to_string(), iterations as f64);
    out.insert("residual_norm".to_string(), residual_norm);
    if let Some(bus) = plan.bus.as_deref().and_then(|b| results.bus(b)) {
        out.insert("power".to_string(), bus.total);
    }
    if let Some(q) = plan
        .heat_input
        .as_deref()
        .and_then(|c| results.param(c, Param::Q))
    {
        out.insert("heat_input".to_string(), q);
    }
    if let (Some(bus), Some(heat)) = (plan.bus.as_deref(), plan.heat_input.as_deref()) {
        if let Some(eta) = results.efficiency(bus, heat) {
            out.insert("efficiency".to_string(), eta);
        }
    }
    out
}

/// Run a study on clones of `base`.
///
/// Returns one record per value in sweep order. `on_point` sees each
/// record as soon as it is known.
pub fn run_study(
    base: &Network,
    plan: &StudyPlan,
    design: Option<&DesignPoint>,
    mut on_point: impl FnMut(&StudyRecord),
) -> AppResult<Vec<StudyRecord>> {
    let mut template = base.clone();
    for variable in &plan.release {
        variable.apply(&mut template, None)?;
    }

    let mut records = Vec::with_capacity(plan.values.len());
    let mut previous: Option<Network> = None;
    for (index, &value) in plan.values.iter().enumerate() {
        let mut net = template.clone();
        if let Some(prev) = &previous {
            net.seed_from(prev);
        }

        let outcome = plan
            .apply_point(&mut net, value)
            .and_then(|()| net.solve(plan.mode, design).map_err(AppError::from));

        let record = match outcome {
            Ok(report) => {
                let outputs = net
                    .results()
                    .map(|r| outputs(plan, r, report.iterations, report.residual_norm))
                    .unwrap_or_default();
                debug!(study = %plan.name, index, value, "study point converged");
                previous = Some(net);
                StudyRecord {
                    index,
                    value,
                    converged: true,
                    error: None,
                    outputs,
                }
            }
            Err(e) => {
                warn!(study = %plan.name, index, value, error = %e, "study point failed");
                StudyRecord {
                    index,
                    value,
                    converged: false,
                    error: Some(e.to_string()),
                    outputs: BTreeMap::new(),
                }
            }
        };
        on_point(&record);
        records.push(record);
    }
    Ok(records)
}
