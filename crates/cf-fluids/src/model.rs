//! Fluid property model trait and validation helpers.

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::state::{Saturation, SpecEnthalpy, StateInput, ThermoState};
use cf_core::units::{Pressure, Temperature};

/// Trait for fluid property models.
///
/// Implementations must be thread-safe (Send + Sync): the solver evaluates
/// Jacobian columns in parallel against one shared model.
pub trait FluidModel: Send + Sync {
    /// Get the model name (for debugging/logging).
    fn name(&self) -> &str;

    /// Check if this model supports the given composition.
    fn supports_composition(&self, comp: &Composition) -> bool;

    /// Evaluate a complete state from an input pair.
    fn state(&self, input: StateInput, comp: &Composition) -> FluidResult<ThermoState>;

    /// Saturation properties at a pressure.
    fn saturation_at_p(&self, p: Pressure, comp: &Composition) -> FluidResult<Saturation> {
        let _ = (p, comp);
        Err(FluidError::NotSupported {
            what: format!("saturation properties in {}", self.name()),
        })
    }

    /// Saturation properties at a temperature.
    fn saturation_at_t(&self, t: Temperature, comp: &Composition) -> FluidResult<Saturation> {
        let _ = (t, comp);
        Err(FluidError::NotSupported {
            what: format!("saturation properties in {}", self.name()),
        })
    }

    /// Enthalpy after an isentropic change from `from` to `p_out`.
    fn isentropic_enthalpy(
        &self,
        from: &ThermoState,
        p_out: Pressure,
        comp: &Composition,
    ) -> FluidResult<SpecEnthalpy> {
        let out = self.state(
            StateInput::PS {
                p: p_out,
                s: from.entropy(),
            },
            comp,
        )?;
        Ok(out.enthalpy())
    }
}

/// Validation helpers for backend outputs.
pub mod validation {
    use crate::error::{FluidError, FluidResult};

    pub fn validate_pressure(p_pa: f64) -> FluidResult<()> {
        if !p_pa.is_finite() || p_pa <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_temperature(t_k: f64) -> FluidResult<()> {
        if !t_k.is_finite() || t_k <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_quality(x: f64) -> FluidResult<()> {
        if !x.is_finite() || !(0.0..=1.0).contains(&x) {
            return Err(FluidError::InvalidArg {
                what: format!("vapour quality {x} outside [0, 1]"),
            });
        }
        Ok(())
    }
}
