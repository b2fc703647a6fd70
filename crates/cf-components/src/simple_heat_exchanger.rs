//! Single-stream heat exchanger (boiler, heater, cooler).

use cf_fluids::FluidModel;
use cf_graph::PortLayout;

use crate::common::{check_param, store};
use crate::equation::{EquationKind, Equations};
use crate::error::ComponentResult;
use crate::param::{Param, ParamValues};
use crate::traits::{ComponentModel, GuessContext, PortStreams, PressureRelation, mass_balance};

/// Heat is added to or removed from one stream; the other side is not
/// modelled.
///
/// ```text
/// pr:  p_out - pr * p_in = 0
/// dp:  p_in - p_out - dp = 0
/// Q:   m * (h_out - h_in) - Q = 0
/// ```
#[derive(Clone, Debug, Default)]
pub struct SimpleHeatExchanger {
    params: ParamValues,
}

impl SimpleHeatExchanger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComponentModel for SimpleHeatExchanger {
    fn kind(&self) -> &'static str {
        "SimpleHeatExchanger"
    }

    fn layout(&self) -> PortLayout {
        PortLayout::through()
    }

    fn equation_count(&self) -> usize {
        1 + self.params.len()
    }

    fn residuals(
        &self,
        _fluid: &dyn FluidModel,
        ports: &PortStreams<'_>,
        eqs: &mut Equations,
    ) -> ComponentResult<()> {
        mass_balance(&self.layout(), ports, eqs)?;
        let (i, o) = (ports.inlet(0)?, ports.outlet(0)?);
        for (&param, &value) in &self.params {
            match param {
                Param::Pr => eqs.push(EquationKind::Pressure, "pr", o.p() - value * i.p()),
                Param::Dp => eqs.push(EquationKind::Pressure, "dp", i.p() - o.p() - value),
                Param::Q => eqs.push(EquationKind::Power, "Q", i.m * (o.h() - i.h()) - value),
                _ => {}
            }
        }
        Ok(())
    }

    fn results(
        &self,
        _fluid: &dyn FluidModel,
        ports: &PortStreams<'_>,
    ) -> ComponentResult<ParamValues> {
        let (i, o) = (ports.inlet(0)?, ports.outlet(0)?);
        let mut out = ParamValues::new();
        out.insert(Param::Q, i.m * (o.h() - i.h()));
        out.insert(Param::Pr, o.p() / i.p());
        out.insert(Param::Dp, i.p() - o.p());
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
        if let Some(&pr) = self.params.get(&Param::Pr) {
            return Some(PressureRelation::Ratio(pr));
        }
        self.params.get(&Param::Dp).map(|&dp| PressureRelation::Drop(dp))
    }

    fn hint(&self, _fluid: &dyn FluidModel, ctx: &mut GuessContext<'_>) {
        let Some(&q) = self.params.get(&Param::Q) else {
            return;
        };
        if let (Some(m), Some(h_in), None) = (ctx.inlets[0].m, ctx.inlets[0].h, ctx.outlets[0].h) {
            if m.abs() > f64::EPSILON {
                ctx.outlets[0].h = Some(h_in + q / m);
            }
        }
    }

    fn accepts(&self) -> &'static [Param] {
        &[Param::Pr, Param::Dp, Param::Q]
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
