//! Plant file schema definitions.
//!
//! Values are in the plant's `units`; mass flow (kg/s), volumetric flow
//! (m3/s) and power (W) are always SI.

use std::collections::BTreeMap;

use cf_core::units::UnitSystem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plant {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub units: UnitSystem,
    #[serde(default)]
    pub solver: SolverDef,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
    #[serde(default)]
    pub buses: Vec<BusDef>,
    #[serde(default)]
    pub studies: Vec<StudyDef>,
    /// Name under which the design solution is saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_point: Option<String>,
}

/// Newton settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverDef {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub min_pressure_pa: f64,
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
    pub fd_epsilon: f64,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-6,
            min_pressure_pa: 1.0,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            fd_epsilon: 1e-7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDef {
    pub label: String,
    /// Component type, e.g. `Turbine` or `Condenser`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f64>,
    /// Parameters released in offdesign runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub design: Vec<String>,
    /// Parameters fixed at their design values in offdesign runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offdesign: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortDef {
    pub component: String,
    #[serde(default)]
    pub port: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StateDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default, rename = "T", skip_serializing_if = "Option::is_none")]
    pub t: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionDef {
    pub label: String,
    pub from: PortDef,
    pub to: PortDef,
    #[serde(flatten)]
    pub state: StateDef,
    /// Mass fractions by species name, e.g. `{water: 1.0}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluid: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub design: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offdesign: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusDef {
    pub label: String,
    /// Fixed bus total [W].
    #[serde(default, rename = "P", skip_serializing_if = "Option::is_none")]
    pub p: Option<f64>,
    pub members: Vec<BusMemberDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusMemberDef {
    pub component: String,
    /// Constant conversion efficiency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
    /// Efficiency over relative load, used instead of `efficiency`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristic: Option<CurveDef>,
    #[serde(default)]
    pub base: BusBaseDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurveDef {
    pub load: Vec<f64>,
    pub eta: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BusBaseDef {
    #[default]
    Component,
    Bus,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModeDef {
    #[default]
    Design,
    Offdesign,
}

/// Quantity varied by a study.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableDef {
    Connection { label: String, attr: String },
    Component { label: String, param: String },
    BusPower { label: String },
}

impl VariableDef {
    /// Short name used in study records, e.g. `1.m`.
    pub fn name(&self) -> String {
        match self {
            VariableDef::Connection { label, attr } => format!("{label}.{attr}"),
            VariableDef::Component { label, param } => format!("{label}.{param}"),
            VariableDef::BusPower { label } => format!("{label}.P"),
        }
    }
}

/// Set on every study point to the swept value plus `offset`, e.g. a
/// cooling water inlet kept 10 K below the swept outlet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkedDef {
    #[serde(flatten)]
    pub variable: VariableDef,
    #[serde(default)]
    pub offset: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpacingDef {
    #[default]
    Linear,
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ValuesDef {
    List(Vec<f64>),
    Range {
        start: f64,
        end: f64,
        points: usize,
        #[serde(default)]
        spacing: SpacingDef,
    },
}

/// Reported per study point.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputsDef {
    /// Bus whose total is reported as power.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus: Option<String>,
    /// Component whose `Q` is the heat input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_input: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyDef {
    pub name: String,
    #[serde(default)]
    pub mode: ModeDef,
    pub variable: VariableDef,
    pub values: ValuesDef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked: Vec<LinkedDef>,
    /// Specifications released for the whole study, e.g. an outlet
    /// temperature when sweeping the flow that sets it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub release: Vec<VariableDef>,
    #[serde(default)]
    pub outputs: OutputsDef,
}
