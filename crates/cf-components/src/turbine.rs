//! Turbine component model.

use cf_core::units::pa;
use cf_fluids::{FluidModel, StateInput};
use cf_graph::PortLayout;

use crate::common::{check_finite, check_param, store};
use crate::equation::{EquationKind, Equations};
use crate::error::{ComponentError, ComponentResult};
use crate::param::{Param, ParamValues};
use crate::traits::{ComponentModel, GuessContext, PortStreams, PressureRelation, mass_balance};

/// Efficiency assumed for start values when `eta_s` is not set.
const GUESS_ETA: f64 = 0.85;

/// Design operating point for the Stodola cone law.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConeReference {
    /// Design mass flow [kg/s].
    pub m: f64,
    /// Design inlet pressure [Pa].
    pub p_in: f64,
    /// Design inlet specific volume [m³/kg].
    pub v_in: f64,
    /// Design pressure ratio `p_out / p_in`.
    pub pr: f64,
}

impl ConeReference {
    /// Mass flow the cone law admits at the given inlet state and outlet pressure.
    pub fn mass_flow(&self, p_in: f64, v_in: f64, p_out: f64) -> f64 {
        let ratio = p_out / p_in;
        self.m
            * (p_in / self.p_in)
            * (self.p_in * self.v_in / (p_in * v_in)).sqrt()
            * ((1.0 - ratio * ratio) / (1.0 - self.pr * self.pr)).abs().sqrt()
    }
}

/// Steam or vapour turbine.
///
/// Equations: mass balance, plus one per set parameter:
///
/// ```text
/// eta_s:  (h_out - h_in) - eta_s * (h_out,s - h_in) = 0
/// pr:     p_out - pr * p_in = 0
/// P:      m * (h_out - h_in) - P = 0
/// cone:   m - m_cone(p_in, v_in, p_out) = 0
/// ```
///
/// Power is negative for work extracted from the fluid.
#[derive(Clone, Debug, Default)]
pub struct Turbine {
    params: ParamValues,
    cone: Option<ConeReference>,
}

impl Turbine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `eta_s`.
    pub fn with_eta_s(mut self, eta: f64) -> ComponentResult<Self> {
        self.set_param(Param::EtaS, Some(eta))?;
        Ok(self)
    }

    pub fn cone(&self) -> Option<&ConeReference> {
        self.cone.as_ref()
    }

    pub fn set_cone(&mut self, cone: Option<ConeReference>) -> ComponentResult<()> {
        if let Some(c) = &cone {
            for (v, what) in [
                (c.m, "cone design mass flow"),
                (c.p_in, "cone design pressure"),
                (c.v_in, "cone design specific volume"),
                (c.pr, "cone design pressure ratio"),
            ] {
                check_finite(v, what)?;
            }
            if c.p_in <= 0.0 || c.v_in <= 0.0 || !(0.0..1.0).contains(&c.pr) {
                return Err(ComponentError::InvalidArg {
                    what: "cone reference needs p_in > 0, v_in > 0 and 0 <= pr < 1".into(),
                });
            }
        }
        self.cone = cone;
        Ok(())
    }
}

impl ComponentModel for Turbine {
    fn kind(&self) -> &'static str {
        "Turbine"
    }

    fn layout(&self) -> PortLayout {
        PortLayout::through()
    }

    fn equation_count(&self) -> usize {
        1 + self.params.len() + usize::from(self.cone.is_some())
    }

    fn residuals(
        &self,
        fluid: &dyn FluidModel,
        ports: &PortStreams<'_>,
        eqs: &mut Equations,
    ) -> ComponentResult<()> {
        mass_balance(&self.layout(), ports, eqs)?;
        let (i, o) = (ports.inlet(0)?, ports.outlet(0)?);

        for (&param, &value) in &self.params {
            match param {
                Param::EtaS => {
                    let h_s = fluid.isentropic_enthalpy(&i.state, o.state.pressure(), i.fluid)?;
                    eqs.push(
                        EquationKind::Enthalpy,
                        "eta_s",
                        (o.h() - i.h()) - value * (h_s - i.h()),
                    );
                }
                Param::Pr => eqs.push(EquationKind::Pressure, "pr", o.p() - value * i.p()),
                Param::P => eqs.push(EquationKind::Power, "P", i.m * (o.h() - i.h()) - value),
                _ => {}
            }
        }

        if let Some(cone) = &self.cone {
            let m = cone.mass_flow(i.p(), i.state.specific_volume(), o.p());
            check_finite(m, "cone law mass flow")?;
            eqs.push(EquationKind::Mass, "cone", i.m - m);
        }
        Ok(())
    }

    fn results(
        &self,
        fluid: &dyn FluidModel,
        ports: &PortStreams<'_>,
    ) -> ComponentResult<ParamValues> {
        let (i, o) = (ports.inlet(0)?, ports.outlet(0)?);
        let h_s = fluid.isentropic_enthalpy(&i.state, o.state.pressure(), i.fluid)?;

        let mut out = ParamValues::new();
        out.insert(Param::P, i.m * (o.h() - i.h()));
        out.insert(Param::Pr, o.p() / i.p());
        if (h_s - i.h()).abs() > f64::EPSILON {
            out.insert(Param::EtaS, (o.h() - i.h()) / (h_s - i.h()));
        }
        Ok(out)
    }

    fn supports_bus(&self) -> bool {
        true
    }

    fn bus_value(&self, ports: &PortStreams<'_>) -> Option<f64> {
        let (i, o) = (ports.inlets.first()?, ports.outlets.first()?);
        Some(i.m * (o.h() - i.h()))
    }

    fn pressure_relation(&self, _pass: usize) -> Option<PressureRelation> {
        self.params.get(&Param::Pr).map(|&pr| PressureRelation::Ratio(pr))
    }

    fn hint(&self, fluid: &dyn FluidModel, ctx: &mut GuessContext<'_>) {
        let (Some(inlet), Some(outlet)) = (ctx.inlets.first(), ctx.outlets.first()) else {
            return;
        };
        if outlet.h.is_some() {
            return;
        }
        let (Some(p_in), Some(h_in), Some(p_out)) = (inlet.p, inlet.h, outlet.p) else {
            return;
        };
        let comp = ctx.inlet_fluids[0];
        let eta = self.params.get(&Param::EtaS).copied().unwrap_or(GUESS_ETA);
        let h_out = fluid
            .state(StateInput::PH { p: pa(p_in), h: h_in }, comp)
            .and_then(|s| fluid.isentropic_enthalpy(&s, pa(p_out), comp))
            .map(|h_s| h_in - eta * (h_in - h_s));
        if let Ok(h) = h_out {
            ctx.outlets[0].h = Some(h);
        }
    }

    fn accepts(&self) -> &'static [Param] {
        &[Param::EtaS, Param::Pr, Param::P, Param::Cone]
    }

    fn params(&self) -> ParamValues {
        self.params.clone()
    }

    fn set_param(&mut self, param: Param, value: Option<f64>) -> ComponentResult<()> {
        check_param(self.kind(), self.accepts(), param, value)?;
        if param == Param::Cone {
            return match value {
                None => {
                    self.cone = None;
                    Ok(())
                }
                Some(_) => Err(ComponentError::InvalidArg {
                    what: "the cone law takes its reference from a design point".into(),
                }),
            };
        }
        store(&mut self.params, param, value);
        Ok(())
    }
}
