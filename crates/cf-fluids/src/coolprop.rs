//! CoolProp-based fluid property model (pure fluids, via `rfluids`).

use rfluids::prelude::*;

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::model::{FluidModel, validation};
use crate::state::{Saturation, StateInput, StateProps, ThermoState};
use cf_core::units::{Pressure, Temperature, k, pa};

/// CoolProp backend for pure working fluids such as R1234yf.
///
/// Thread-safe: rfluids Fluid instances are created per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoolPropModel;

impl CoolPropModel {
    pub fn new() -> Self {
        Self
    }

    fn pure(comp: &Composition) -> FluidResult<Pure> {
        comp.is_pure()
            .map(|species| species.rfluids_pure())
            .ok_or_else(|| FluidError::NotSupported {
                what: format!("CoolProp backend handles pure fluids only, got {comp}"),
            })
    }

    fn backend_err(context: &str, err: impl std::fmt::Display) -> FluidError {
        FluidError::Backend {
            message: format!("rfluids error {context}: {err}"),
        }
    }

    fn fluid(pure: Pure, a: FluidInput, b: FluidInput, context: &str) -> FluidResult<Fluid> {
        Fluid::from(pure)
            .in_state(a, b)
            .map_err(|e| Self::backend_err(context, e))
    }

    fn props_of(mut fluid: Fluid, context: &str) -> FluidResult<StateProps> {
        let p = fluid.pressure().map_err(|e| Self::backend_err(context, e))?;
        let t = fluid.temperature().map_err(|e| Self::backend_err(context, e))?;
        let h = fluid.enthalpy().map_err(|e| Self::backend_err(context, e))?;
        let s = fluid.entropy().map_err(|e| Self::backend_err(context, e))?;
        let rho = fluid.density().map_err(|e| Self::backend_err(context, e))?;
        let quality = fluid.quality().ok();
        Ok(StateProps {
            p,
            t,
            h,
            s,
            rho,
            quality,
        })
    }
}

impl FluidModel for CoolPropModel {
    fn name(&self) -> &str {
        "CoolProp"
    }

    fn supports_composition(&self, comp: &Composition) -> bool {
        comp.is_pure().is_some()
    }

    fn state(&self, input: StateInput, comp: &Composition) -> FluidResult<ThermoState> {
        let pure = Self::pure(comp)?;
        let (a, b, context) = match input {
            StateInput::PT { p, t } => {
                validation::validate_pressure(p.value)?;
                validation::validate_temperature(t.value)?;
                (
                    FluidInput::pressure(p.value),
                    FluidInput::temperature(t.value),
                    format!("at P={} Pa, T={} K", p.value, t.value),
                )
            }
            StateInput::PH { p, h } => {
                validation::validate_pressure(p.value)?;
                (
                    FluidInput::pressure(p.value),
                    FluidInput::enthalpy(h),
                    format!("at P={} Pa, h={} J/kg", p.value, h),
                )
            }
            StateInput::PS { p, s } => {
                validation::validate_pressure(p.value)?;
                (
                    FluidInput::pressure(p.value),
                    FluidInput::entropy(s),
                    format!("at P={} Pa, s={} J/kg/K", p.value, s),
                )
            }
            StateInput::PQ { p, x } => {
                validation::validate_pressure(p.value)?;
                validation::validate_quality(x)?;
                (
                    FluidInput::pressure(p.value),
                    FluidInput::quality(x),
                    format!("at P={} Pa, x={}", p.value, x),
                )
            }
        };
        let fluid = Self::fluid(pure, a, b, &context)?;
        ThermoState::from_props(Self::props_of(fluid, &context)?)
    }

    fn saturation_at_p(&self, p: Pressure, comp: &Composition) -> FluidResult<Saturation> {
        let pure = Self::pure(comp)?;
        validation::validate_pressure(p.value)?;
        let context = format!("saturation at P={} Pa", p.value);
        let liquid = Self::props_of(
            Self::fluid(pure, FluidInput::pressure(p.value), FluidInput::quality(0.0), &context)?,
            &context,
        )?;
        let vapor = Self::props_of(
            Self::fluid(pure, FluidInput::pressure(p.value), FluidInput::quality(1.0), &context)?,
            &context,
        )?;
        Ok(Saturation {
            p,
            t: k(liquid.t),
            h_liquid: liquid.h,
            h_vapor: vapor.h,
        })
    }

    fn saturation_at_t(&self, t: Temperature, comp: &Composition) -> FluidResult<Saturation> {
        let pure = Self::pure(comp)?;
        validation::validate_temperature(t.value)?;
        let context = format!("saturation at T={} K", t.value);
        let liquid = Self::props_of(
            Self::fluid(pure, FluidInput::temperature(t.value), FluidInput::quality(0.0), &context)?,
            &context,
        )?;
        let vapor = Self::props_of(
            Self::fluid(pure, FluidInput::temperature(t.value), FluidInput::quality(1.0), &context)?,
            &context,
        )?;
        Ok(Saturation {
            p: pa(liquid.p),
            t,
            h_liquid: liquid.h,
            h_vapor: vapor.h,
        })
    }
}
