//! Values captured at a solved design point.

use crate::param::ParamValues;
use crate::traits::Stream;

/// Solved state of one connection, SI units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamRecord {
    pub m: f64,
    pub p: f64,
    pub h: f64,
    pub t: f64,
    /// Specific volume [m³/kg].
    pub v: f64,
    pub s: f64,
    pub quality: Option<f64>,
}

impl StreamRecord {
    pub fn from_stream(stream: &Stream<'_>) -> Self {
        Self {
            m: stream.m,
            p: stream.p(),
            h: stream.h(),
            t: stream.t(),
            v: stream.state.specific_volume(),
            s: stream.state.entropy(),
            quality: stream.state.quality(),
        }
    }

    /// Volumetric flow [m³/s].
    pub fn volumetric_flow(&self) -> f64 {
        self.m * self.v
    }
}

/// Design values of one component: its results and the streams at its ports.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComponentDesign {
    pub params: ParamValues,
    pub inlets: Vec<StreamRecord>,
    pub outlets: Vec<StreamRecord>,
}
