//! Calorically perfect gas backend.
//!
//! Ideal gas equation of state `p = ρ R T` with a constant, mass-weighted
//! `cp`. Enthalpy and entropy are zero at the reference state (0 °C, 1 atm).
//! Intended for gas loops (air, flue gas, inert cooling) where real-gas
//! effects are negligible; condensable species are rejected.

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::model::{FluidModel, validation};
use crate::state::{StateInput, StateProps, ThermoState};

const R_UNIVERSAL: f64 = 8314.462618;
const T_REF: f64 = 273.15;
const P_REF: f64 = 101_325.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct PerfectGasModel;

/// Constant parameters of one composition.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GasParameters {
    r: f64,
    cp: f64,
}

impl PerfectGasModel {
    pub fn new() -> Self {
        Self
    }

    fn parameters(comp: &Composition) -> FluidResult<GasParameters> {
        let mut cp = 0.0;
        for (species, w) in comp.iter() {
            let cp_i = species.ideal_cp().ok_or_else(|| FluidError::NotSupported {
                what: format!("perfect gas model has no data for {species}"),
            })?;
            cp += w * cp_i;
        }
        let r = R_UNIVERSAL / comp.molar_mass();
        if cp <= r {
            return Err(FluidError::NonPhysical {
                what: "cv = cp - R must be positive",
            });
        }
        Ok(GasParameters { r, cp })
    }

    fn props(gas: GasParameters, p: f64, t: f64) -> FluidResult<StateProps> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;
        Ok(StateProps {
            p,
            t,
            h: gas.cp * (t - T_REF),
            s: gas.cp * (t / T_REF).ln() - gas.r * (p / P_REF).ln(),
            rho: p / (gas.r * t),
            quality: None,
        })
    }
}

impl FluidModel for PerfectGasModel {
    fn name(&self) -> &str {
        "PerfectGas"
    }

    fn supports_composition(&self, comp: &Composition) -> bool {
        comp.iter().all(|(s, _)| s.ideal_cp().is_some())
    }

    fn state(&self, input: StateInput, comp: &Composition) -> FluidResult<ThermoState> {
        let gas = Self::parameters(comp)?;
        let props = match input {
            StateInput::PT { p, t } => Self::props(gas, p.value, t.value)?,
            StateInput::PH { p, h } => Self::props(gas, p.value, T_REF + h / gas.cp)?,
            StateInput::PS { p, s } => {
                validation::validate_pressure(p.value)?;
                let t = T_REF * ((s + gas.r * (p.value / P_REF).ln()) / gas.cp).exp();
                Self::props(gas, p.value, t)?
            }
            StateInput::PQ { .. } => {
                return Err(FluidError::NotSupported {
                    what: "vapour quality for a perfect gas".into(),
                });
            }
        };
        ThermoState::from_props(props)
    }
}
