//! Pump component model.

use cf_core::units::pa;
use cf_fluids::{FluidModel, StateInput};
use cf_graph::PortLayout;

use crate::common::{check_param, store};
use crate::equation::{EquationKind, Equations};
use crate::error::ComponentResult;
use crate::param::{Param, ParamValues};
use crate::traits::{ComponentModel, GuessContext, PortStreams, PressureRelation, mass_balance};

const GUESS_ETA: f64 = 0.8;

/// Liquid pump.
///
/// ```text
/// eta_s:  eta_s * (h_out - h_in) - (h_out,s - h_in) = 0
/// pr:     p_out - pr * p_in = 0
/// P:      m * (h_out - h_in) - P = 0
/// ```
///
/// Power is positive (work added to the fluid).
#[derive(Clone, Debug, Default)]
pub struct Pump {
    params: ParamValues,
}

impl Pump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eta_s(mut self, eta: f64) -> ComponentResult<Self> {
        self.set_param(Param::EtaS, Some(eta))?;
        Ok(self)
    }
}

impl ComponentModel for Pump {
    fn kind(&self) -> &'static str {
        "Pump"
    }

    fn layout(&self) -> PortLayout {
        PortLayout::through()
    }

    fn equation_count(&self) -> usize {
        1 + self.params.len()
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
                        value * (o.h() - i.h()) - (h_s - i.h()),
                    );
                }
                Param::Pr => eqs.push(EquationKind::Pressure, "pr", o.p() - value * i.p()),
                Param::P => eqs.push(EquationKind::Power, "P", i.m * (o.h() - i.h()) - value),
                _ => {}
            }
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
        if (o.h() - i.h()).abs() > f64::EPSILON {
            out.insert(Param::EtaS, (h_s - i.h()) / (o.h() - i.h()));
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
            .map(|h_s| h_in + (h_s - h_in) / eta);
        if let Ok(h) = h_out {
            ctx.outlets[0].h = Some(h);
        }
    }

    fn accepts(&self) -> &'static [Param] {
        &[Param::EtaS, Param::Pr, Param::P]
    }

    fn params(&self) -> ParamValues {
        self.params.clone()
    }

    fn set_param(&mut self, param: Param, value: Option<f64>) -> ComponentResult<()> {
        check_param(self.kind(), self.accepts(), param, value)?;
        store(&mut self.params, param, value);
        Ok(())
    }
}
