//! Two-stream heat exchanger and condenser.
//!
//! Side 1 (ports 0) is the hot stream, side 2 (ports 1) the cold stream.
//! Heat flow `Q` is reported for side 1 and is therefore negative.

use cf_core::units::{k, pa};
use cf_fluids::FluidModel;
use cf_graph::PortLayout;

use crate::common::{check_finite, check_param, lmtd, store};
use crate::equation::{EquationKind, Equations};
use crate::error::ComponentResult;
use crate::param::{Param, ParamValues};
use crate::traits::{
    ComponentModel, GuessContext, PortStreams, PressureRelation, Stream, mass_balance,
};

/// Condensing pressure guess margin over the cooling water [K].
const GUESS_TTD: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExchangerKind {
    #[default]
    Plain,
    /// Hot side leaves as saturated liquid; upper terminal difference is
    /// taken against the saturation temperature of the hot inlet.
    Condenser,
}

/// Counter-current heat exchanger.
///
/// ```text
/// energy:  m1 (h1o - h1i) + m2 (h2o - h2i) = 0
/// Q:       m1 (h1o - h1i) - Q = 0
/// kA:      m1 (h1o - h1i) + kA * LMTD = 0
/// ttd_u:   T1i - T2o - ttd_u = 0
/// ttd_l:   T1o - T2i - ttd_l = 0
/// pr1/2:   p_out - pr * p_in = 0
/// dp1/2:   p_in - p_out - dp = 0
/// ```
#[derive(Clone, Debug, Default)]
pub struct HeatExchanger {
    kind: ExchangerKind,
    params: ParamValues,
}

/// Terminal values of one evaluation.
struct Terminals {
    q: f64,
    ttd_u: f64,
    ttd_l: f64,
}

impl HeatExchanger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn condenser() -> Self {
        Self {
            kind: ExchangerKind::Condenser,
            params: ParamValues::new(),
        }
    }

    pub fn exchanger_kind(&self) -> ExchangerKind {
        self.kind
    }

    fn hot_inlet_temperature(
        &self,
        fluid: &dyn FluidModel,
        hot_in: &Stream<'_>,
    ) -> ComponentResult<f64> {
        match self.kind {
            ExchangerKind::Plain => Ok(hot_in.t()),
            ExchangerKind::Condenser => Ok(fluid
                .saturation_at_p(hot_in.state.pressure(), hot_in.fluid)?
                .t
                .value),
        }
    }

    fn terminals(
        &self,
        fluid: &dyn FluidModel,
        ports: &PortStreams<'_>,
    ) -> ComponentResult<Terminals> {
        let (h1i, h1o) = (ports.inlet(0)?, ports.outlet(0)?);
        let (c2i, c2o) = (ports.inlet(1)?, ports.outlet(1)?);
        Ok(Terminals {
            q: h1i.m * (h1o.h() - h1i.h()),
            ttd_u: self.hot_inlet_temperature(fluid, h1i)? - c2o.t(),
            ttd_l: h1o.t() - c2i.t(),
        })
    }
}

fn side_pressure(param: Param) -> (usize, bool) {
    match param {
        Param::Pr1 => (0, true),
        Param::Pr2 => (1, true),
        Param::Dp1 => (0, false),
        _ => (1, false),
    }
}

impl ComponentModel for HeatExchanger {
    fn kind(&self) -> &'static str {
        match self.kind {
            ExchangerKind::Plain => "HeatExchanger",
            ExchangerKind::Condenser => "Condenser",
        }
    }

    fn layout(&self) -> PortLayout {
        PortLayout::two_sided()
    }

    fn equation_count(&self) -> usize {
        let subcooling = usize::from(self.kind == ExchangerKind::Condenser);
        2 + 1 + subcooling + self.params.len()
    }

    fn residuals(
        &self,
        fluid: &dyn FluidModel,
        ports: &PortStreams<'_>,
        eqs: &mut Equations,
    ) -> ComponentResult<()> {
        mass_balance(&self.layout(), ports, eqs)?;
        let (h1i, h1o) = (ports.inlet(0)?, ports.outlet(0)?);
        let (c2i, c2o) = (ports.inlet(1)?, ports.outlet(1)?);
        let q1 = h1i.m * (h1o.h() - h1i.h());
        eqs.push(
            EquationKind::Power,
            "energy balance",
            q1 + c2i.m * (c2o.h() - c2i.h()),
        );

        if self.kind == ExchangerKind::Condenser {
            let sat = fluid.saturation_at_p(h1o.state.pressure(), h1o.fluid)?;
            eqs.push(
                EquationKind::Enthalpy,
                "saturated liquid outlet",
                h1o.h() - sat.h_liquid,
            );
        }

        let needs_terminals = [Param::KA, Param::TtdU, Param::TtdL]
            .iter()
            .any(|p| self.params.contains_key(p));
        let terminals = if needs_terminals {
            Some(self.terminals(fluid, ports)?)
        } else {
            None
        };

        for (&param, &value) in &self.params {
            match (param, &terminals) {
                (Param::Q, _) => eqs.push(EquationKind::Power, "Q", q1 - value),
                (Param::KA, Some(t)) => {
                    let td_log = lmtd(t.ttd_u, t.ttd_l);
                    check_finite(td_log, "logarithmic temperature difference")?;
                    eqs.push(EquationKind::Power, "kA", q1 + value * td_log);
                }
                (Param::TtdU, Some(t)) => {
                    eqs.push(EquationKind::Temperature, "ttd_u", t.ttd_u - value)
                }
                (Param::TtdL, Some(t)) => {
                    eqs.push(EquationKind::Temperature, "ttd_l", t.ttd_l - value)
                }
                (Param::Pr1 | Param::Pr2 | Param::Dp1 | Param::Dp2, _) => {
                    let (side, ratio) = side_pressure(param);
                    let (i, o) = (ports.inlet(side)?, ports.outlet(side)?);
                    if ratio {
                        eqs.push(EquationKind::Pressure, param.key(), o.p() - value * i.p());
                    } else {
                        eqs.push(EquationKind::Pressure, param.key(), i.p() - o.p() - value);
                    }
                }
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
        let t = self.terminals(fluid, ports)?;
        let td_log = lmtd(t.ttd_u, t.ttd_l);

        let mut out = ParamValues::new();
        out.insert(Param::Q, t.q);
        out.insert(Param::TdLog, td_log);
        if td_log.abs() > f64::EPSILON {
            out.insert(Param::KA, -t.q / td_log);
        }
        out.insert(Param::TtdU, t.ttd_u);
        out.insert(Param::TtdL, t.ttd_l);
        for param in [Param::Pr1, Param::Pr2, Param::Dp1, Param::Dp2] {
            let (side, ratio) = side_pressure(param);
            let (i, o) = (ports.inlet(side)?, ports.outlet(side)?);
            out.insert(param, if ratio { o.p() / i.p() } else { i.p() - o.p() });
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

    fn pressure_relation(&self, pass: usize) -> Option<PressureRelation> {
        let (pr, dp) = match pass {
            0 => (Param::Pr1, Param::Dp1),
            _ => (Param::Pr2, Param::Dp2),
        };
        if let Some(&v) = self.params.get(&pr) {
            return Some(PressureRelation::Ratio(v));
        }
        self.params.get(&dp).map(|&v| PressureRelation::Drop(v))
    }

    fn hint(&self, fluid: &dyn FluidModel, ctx: &mut GuessContext<'_>) {
        if self.kind == ExchangerKind::Condenser {
            if ctx.inlets[0].p.is_none() {
                let cold = ctx.outlets[1]
                    .temperature(fluid, ctx.outlet_fluids[1])
                    .or_else(|| ctx.inlets[1].temperature(fluid, ctx.inlet_fluids[1]));
                if let Some(t_cold) = cold {
                    let ttd = self.params.get(&Param::TtdU).copied().unwrap_or(GUESS_TTD);
                    if let Ok(sat) = fluid.saturation_at_t(k(t_cold + ttd), ctx.inlet_fluids[0]) {
                        ctx.inlets[0].p = Some(sat.p.value);
                    }
                }
            }
            if let (Some(p), None) = (ctx.outlets[0].p, ctx.outlets[0].h) {
                if let Ok(sat) = fluid.saturation_at_p(pa(p), ctx.outlet_fluids[0]) {
                    ctx.outlets[0].h = Some(sat.h_liquid);
                }
            }
        }

        // unknown flow on one side from the energy balance
        let duty = |side: usize, ctx: &GuessContext<'_>| -> Option<(Option<f64>, f64)> {
            let (i, o) = (ctx.inlets[side], ctx.outlets[side]);
            Some((i.m.or(o.m), o.h? - i.h?))
        };
        if let (Some((Some(m1), dh1)), Some((None, dh2))) = (duty(0, ctx), duty(1, ctx)) {
            if dh2.abs() > f64::EPSILON {
                ctx.inlets[1].m = Some(-m1 * dh1 / dh2);
            }
        } else if let (Some((None, dh1)), Some((Some(m2), dh2))) = (duty(0, ctx), duty(1, ctx)) {
            if dh1.abs() > f64::EPSILON {
                ctx.inlets[0].m = Some(-m2 * dh2 / dh1);
            }
        }

        let Some(&q) = self.params.get(&Param::Q) else {
            return;
        };
        for (side, sign) in [(0, 1.0), (1, -1.0)] {
            if let (Some(m), Some(h_in), None) =
                (ctx.inlets[side].m, ctx.inlets[side].h, ctx.outlets[side].h)
            {
                if m.abs() > f64::EPSILON {
                    ctx.outlets[side].h = Some(h_in + sign * q / m);
                }
            }
        }
    }

    fn accepts(&self) -> &'static [Param] {
        &[
            Param::Q,
            Param::KA,
            Param::TtdU,
            Param::TtdL,
            Param::Pr1,
            Param::Pr2,
            Param::Dp1,
            Param::Dp2,
        ]
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condenser_has_extra_equation() {
        let mut mc = HeatExchanger::condenser();
        assert_eq!(mc.equation_count(), 4);
        mc.set_param(Param::Pr1, Some(1.0)).unwrap();
        mc.set_param(Param::TtdU, Some(5.0)).unwrap();
        assert_eq!(mc.equation_count(), 6);
        assert_eq!(HeatExchanger::new().equation_count(), 3);
    }

    #[test]
    fn pressure_relations_per_side() {
        let mut hx = HeatExchanger::new();
        hx.set_param(Param::Pr1, Some(0.98)).unwrap();
        hx.set_param(Param::Dp2, Some(1e4)).unwrap();
        assert_eq!(hx.pressure_relation(0), Some(PressureRelation::Ratio(0.98)));
        assert_eq!(hx.pressure_relation(1), Some(PressureRelation::Drop(1e4)));
    }
}
