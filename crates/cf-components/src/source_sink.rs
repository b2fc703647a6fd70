//! Boundary components: streams enter or leave the plant here.

use cf_fluids::FluidModel;
use cf_graph::PortLayout;

use crate::common::check_param;
use crate::equation::Equations;
use crate::error::ComponentResult;
use crate::param::{Param, ParamValues};
use crate::traits::{ComponentModel, PortStreams};

/// Open inlet of a fluid branch. All boundary values live on the
/// outgoing connection.
#[derive(Clone, Debug, Default)]
pub struct Source;

/// Open outlet of a fluid branch.
#[derive(Clone, Debug, Default)]
pub struct Sink;

macro_rules! boundary {
    ($ty:ty, $kind:literal, $layout:expr) => {
        impl ComponentModel for $ty {
            fn kind(&self) -> &'static str {
                $kind
            }

            fn layout(&self) -> PortLayout {
                $layout
            }

            fn equation_count(&self) -> usize {
                0
            }

            fn residuals(
                &self,
                _fluid: &dyn FluidModel,
                _ports: &PortStreams<'_>,
                _eqs: &mut Equations,
            ) -> ComponentResult<()> {
                Ok(())
            }

            fn results(
                &self,
                _fluid: &dyn FluidModel,
                _ports: &PortStreams<'_>,
            ) -> ComponentResult<ParamValues> {
                Ok(ParamValues::new())
            }

            fn accepts(&self) -> &'static [Param] {
                &[]
            }

            fn params(&self) -> ParamValues {
                ParamValues::new()
            }

            fn set_param(&mut self, param: Param, value: Option<f64>) -> ComponentResult<()> {
                check_param($kind, self.accepts(), param, value)
            }
        }
    };
}

boundary!(Source, "Source", PortLayout::source());
boundary!(Sink, "Sink", PortLayout::sink());
