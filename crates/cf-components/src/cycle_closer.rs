//! Cycle closer: breaks a closed loop for the solver.

use cf_fluids::FluidModel;
use cf_graph::PortLayout;

use crate::common::check_param;
use crate::equation::{EquationKind, Equations};
use crate::error::ComponentResult;
use crate::param::{Param, ParamValues};
use crate::traits::{ComponentModel, PortStreams, PressureRelation};

/// Joins the end of a closed loop back to its start.
///
/// Pressure and enthalpy pass through unchanged. Mass is deliberately not
/// balanced: every other component in the loop already is, so one more
/// equation would be redundant. The mismatch is reported as
/// `mass_deviation` and should be zero at a converged point.
#[derive(Clone, Debug, Default)]
pub struct CycleCloser;

impl ComponentModel for CycleCloser {
    fn kind(&self) -> &'static str {
        "CycleCloser"
    }

    fn layout(&self) -> PortLayout {
        PortLayout::through()
    }

    fn closes_cycle(&self) -> bool {
        true
    }

    fn equation_count(&self) -> usize {
        2
    }

    fn residuals(
        &self,
        _fluid: &dyn FluidModel,
        ports: &PortStreams<'_>,
        eqs: &mut Equations,
    ) -> ComponentResult<()> {
        let (i, o) = (ports.inlet(0)?, ports.outlet(0)?);
        eqs.push(EquationKind::Pressure, "pressure equality", i.p() - o.p());
        eqs.push(EquationKind::Enthalpy, "enthalpy equality", i.h() - o.h());
        Ok(())
    }

    fn results(
        &self,
        _fluid: &dyn FluidModel,
        ports: &PortStreams<'_>,
    ) -> ComponentResult<ParamValues> {
        let mut out = ParamValues::new();
        out.insert(
            Param::MassDeviation,
            (ports.inlet(0)?.m - ports.outlet(0)?.m).abs(),
        );
        Ok(out)
    }

    fn pressure_relation(&self, _pass: usize) -> Option<PressureRelation> {
        Some(PressureRelation::Equal)
    }

    fn enthalpy_equal(&self, _pass: usize) -> bool {
        true
    }

    fn accepts(&self) -> &'static [Param] {
        &[]
    }

    fn params(&self) -> ParamValues {
        ParamValues::new()
    }

    fn set_param(&mut self, param: Param, value: Option<f64>) -> ComponentResult<()> {
        check_param(self.kind(), self.accepts(), param, value)
    }
}
