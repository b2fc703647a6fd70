//! Core traits for component models.

use cf_fluids::{Composition, FluidModel, StateInput, ThermoState};
use cf_graph::PortLayout;

use crate::equation::Equations;
use crate::error::{ComponentError, ComponentResult};
use crate::param::{Param, ParamValues};

/// Evaluated stream at one port.
#[derive(Clone, Copy, Debug)]
pub struct Stream<'a> {
    /// Mass flow [kg/s].
    pub m: f64,
    pub state: ThermoState,
    pub fluid: &'a Composition,
}

impl Stream<'_> {
    pub fn p(&self) -> f64 {
        self.state.pressure().value
    }

    pub fn h(&self) -> f64 {
        self.state.enthalpy()
    }

    pub fn t(&self) -> f64 {
        self.state.temperature().value
    }
}

/// Streams at every inlet and outlet of a component, by port index.
#[derive(Clone, Debug, Default)]
pub struct PortStreams<'a> {
    pub inlets: Vec<Stream<'a>>,
    pub outlets: Vec<Stream<'a>>,
}

impl<'a> PortStreams<'a> {
    pub fn inlet(&self, port: usize) -> ComponentResult<&Stream<'a>> {
        self.inlets.get(port).ok_or_else(|| ComponentError::InvalidArg {
            what: format!("missing inlet stream {port}"),
        })
    }

    pub fn outlet(&self, port: usize) -> ComponentResult<&Stream<'a>> {
        self.outlets.get(port).ok_or_else(|| ComponentError::InvalidArg {
            what: format!("missing outlet stream {port}"),
        })
    }
}

/// Partially known port values used while building a start vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortGuess {
    pub m: Option<f64>,
    pub p: Option<f64>,
    pub h: Option<f64>,
}

impl PortGuess {
    /// Temperature of the guess when pressure and enthalpy are known.
    pub fn temperature(&self, fluid: &dyn FluidModel, comp: &Composition) -> Option<f64> {
        let (p, h) = (self.p?, self.h?);
        fluid
            .state(StateInput::PH { p: cf_core::units::pa(p), h }, comp)
            .ok()
            .map(|s| s.temperature().value)
    }
}

/// Guesses at the ports of one component; hints only fill `None` fields.
#[derive(Clone, Debug)]
pub struct GuessContext<'a> {
    pub inlets: Vec<PortGuess>,
    pub outlets: Vec<PortGuess>,
    pub inlet_fluids: Vec<&'a Composition>,
    pub outlet_fluids: Vec<&'a Composition>,
}

/// How outlet pressure of a pass follows from inlet pressure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PressureRelation {
    /// `p_out = pr * p_in`
    Ratio(f64),
    /// `p_out = p_in - dp`
    Drop(f64),
    Equal,
}

impl PressureRelation {
    pub fn forward(&self, p_in: f64) -> f64 {
        match *self {
            PressureRelation::Ratio(pr) => pr * p_in,
            PressureRelation::Drop(dp) => p_in - dp,
            PressureRelation::Equal => p_in,
        }
    }

    pub fn backward(&self, p_out: f64) -> Option<f64> {
        match *self {
            PressureRelation::Ratio(pr) if pr.abs() > f64::EPSILON => Some(p_out / pr),
            PressureRelation::Ratio(_) => None,
            PressureRelation::Drop(dp) => Some(p_out + dp),
            PressureRelation::Equal => Some(p_out),
        }
    }
}

/// Equation-oriented component model.
///
/// A model contributes a fixed number of residual equations for its
/// current parameter set. The solver checks `residuals` pushes exactly
/// `equation_count` entries.
///
/// Implementations must be thread-safe: Jacobian columns are evaluated
/// in parallel.
pub trait ComponentModel: Send + Sync {
    /// Short type name, e.g. "Turbine".
    fn kind(&self) -> &'static str;

    fn layout(&self) -> PortLayout;

    fn closes_cycle(&self) -> bool {
        false
    }

    /// Number of equations for the current parameter set.
    fn equation_count(&self) -> usize;

    fn residuals(
        &self,
        fluid: &dyn FluidModel,
        ports: &PortStreams<'_>,
        eqs: &mut Equations,
    ) -> ComponentResult<()>;

    /// Derived parameter values from solved streams.
    fn results(&self, fluid: &dyn FluidModel, ports: &PortStreams<'_>)
    -> ComponentResult<ParamValues>;

    /// Whether this model can be a bus member.
    fn supports_bus(&self) -> bool {
        false
    }

    /// Value offered to a bus (power or heat flow), if any.
    fn bus_value(&self, ports: &PortStreams<'_>) -> Option<f64> {
        let _ = ports;
        None
    }

    /// Exact pressure relation of a pass, used for initialization.
    fn pressure_relation(&self, pass: usize) -> Option<PressureRelation> {
        let _ = pass;
        None
    }

    /// Whether enthalpy is unchanged across a pass.
    fn enthalpy_equal(&self, pass: usize) -> bool {
        let _ = pass;
        false
    }

    /// Fill unknown port guesses from physics; never overwrites.
    fn hint(&self, fluid: &dyn FluidModel, ctx: &mut GuessContext<'_>) {
        let _ = (fluid, ctx);
    }

    /// Parameters this model accepts.
    fn accepts(&self) -> &'static [Param];

    /// Currently set parameters.
    fn params(&self) -> ParamValues;

    fn param(&self, param: Param) -> Option<f64> {
        self.params().get(&param).copied()
    }

    /// Set or unset a parameter (SI units).
    fn set_param(&mut self, param: Param, value: Option<f64>) -> ComponentResult<()>;
}

/// Mass balance for every pass of a layout.
pub fn mass_balance(
    layout: &PortLayout,
    ports: &PortStreams<'_>,
    eqs: &mut Equations,
) -> ComponentResult<()> {
    for &(i, o) in &layout.passes {
        eqs.push(
            crate::equation::EquationKind::Mass,
            "mass balance",
            ports.inlet(i)?.m - ports.outlet(o)?.m,
        );
    }
    Ok(())
}
