//! Result data types.

use std::collections::BTreeMap;

use cf_components::{Param, ParamValues, StreamRecord};
use cf_fluids::Composition;
use serde::{Deserialize, Serialize};

use crate::{ResultsError, ResultsResult};

/// Solved state of one connection, SI units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub label: String,
    /// Mass fractions by species key.
    pub fluid: BTreeMap<String, f64>,
    pub m_kg_s: f64,
    pub p_pa: f64,
    pub h_j_per_kg: f64,
    pub t_k: f64,
    pub v_m3_per_kg: f64,
    pub s_j_per_kg_k: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
}

impl ConnectionRecord {
    pub fn new(label: impl Into<String>, fluid: &Composition, stream: &StreamRecord) -> Self {
        Self {
            label: label.into(),
            fluid: fluid.to_named(),
            m_kg_s: stream.m,
            p_pa: stream.p,
            h_j_per_kg: stream.h,
            t_k: stream.t,
            v_m3_per_kg: stream.v,
            s_j_per_kg_k: stream.s,
            x: stream.quality,
        }
    }

    pub fn stream(&self) -> StreamRecord {
        StreamRecord {
            m: self.m_kg_s,
            p: self.p_pa,
            h: self.h_j_per_kg,
            t: self.t_k,
            v: self.v_m3_per_kg,
            s: self.s_j_per_kg_k,
            quality: self.x,
        }
    }

    /// Volumetric flow [m³/s].
    pub fn volumetric_flow(&self) -> f64 {
        self.m_kg_s * self.v_m3_per_kg
    }
}

/// Result parameters of one component, keyed by parameter name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub label: String,
    pub kind: String,
    pub params: BTreeMap<String, f64>,
}

impl ComponentRecord {
    pub fn new(label: impl Into<String>, kind: &str, params: &ParamValues) -> Self {
        Self {
            label: label.into(),
            kind: kind.to_string(),
            params: params
                .iter()
                .map(|(p, v)| (p.key().to_string(), *v))
                .collect(),
        }
    }

    pub fn param_values(&self) -> ResultsResult<ParamValues> {
        self.params
            .iter()
            .map(|(key, v)| {
                key.parse::<Param>()
                    .map(|p| (p, *v))
                    .map_err(|e| ResultsError::InvalidRecord {
                        what: format!("component {}: {e}", self.label),
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMemberRecord {
    pub component: String,
    /// Component value (power or heat flow) [W].
    pub value_w: f64,
    /// Contribution to the bus total [W].
    pub contribution_w: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusRecord {
    pub label: String,
    pub total_w: f64,
    pub members: Vec<BusMemberRecord>,
}

/// A converged design solution, saved by name and used as the reference
/// for offdesign runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignPoint {
    pub name: String,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Topology fingerprint of the network that produced it.
    pub fingerprint: String,
    pub connections: Vec<ConnectionRecord>,
    pub components: Vec<ComponentRecord>,
    #[serde(default)]
    pub buses: Vec<BusRecord>,
}

impl DesignPoint {
    pub fn connection(&self, label: &str) -> Option<&ConnectionRecord> {
        self.connections.iter().find(|c| c.label == label)
    }

    pub fn component(&self, label: &str) -> Option<&ComponentRecord> {
        self.components.iter().find(|c| c.label == label)
    }

    pub fn bus(&self, label: &str) -> Option<&BusRecord> {
        self.buses.iter().find(|b| b.label == label)
    }
}

/// Description of a parametric study run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyManifest {
    pub name: String,
    pub plant: String,
    pub timestamp: String,
    /// Swept variable, e.g. `connection 1.m` or `component turbine.eta_s`.
    pub variable: String,
    pub values: Vec<f64>,
}

/// Outcome of one study point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRecord {
    pub index: usize,
    /// Swept value in user units.
    pub value: f64,
    pub converged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Reported outputs in user units.
    #[serde(default)]
    pub outputs: BTreeMap<String, f64>,
}
