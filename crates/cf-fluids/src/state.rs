//! Thermodynamic state definitions.

use crate::error::{FluidError, FluidResult};
use cf_core::units::{Density, Pressure, Temperature};

/// Specific enthalpy [J/kg].
///
/// Not part of uom's standard set, so we use f64 with clear documentation.
pub type SpecEnthalpy = f64;

/// Specific entropy [J/(kg·K)].
pub type SpecEntropy = f64;

/// Input specification for creating a thermodynamic state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateInput {
    /// Pressure and temperature.
    PT { p: Pressure, t: Temperature },
    /// Pressure and specific enthalpy.
    PH { p: Pressure, h: SpecEnthalpy },
    /// Pressure and specific entropy.
    PS { p: Pressure, s: SpecEntropy },
    /// Pressure and vapour quality (0 saturated liquid, 1 saturated vapour).
    PQ { p: Pressure, x: f64 },
}

/// Raw SI property values returned by a backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateProps {
    pub p: f64,
    pub t: f64,
    pub h: f64,
    pub s: f64,
    pub rho: f64,
    pub quality: Option<f64>,
}

/// Fully evaluated thermodynamic state.
///
/// Equation-oriented solvers need several properties of the same stream
/// per residual evaluation, so everything is computed once up front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermoState {
    p: Pressure,
    t: Temperature,
    h: SpecEnthalpy,
    s: SpecEntropy,
    rho: Density,
    quality: Option<f64>,
}

impl ThermoState {
    /// Validate backend output and build a state.
    pub fn from_props(props: StateProps) -> FluidResult<Self> {
        use cf_core::units::{k, pa};
        use uom::si::mass_density::kilogram_per_cubic_meter;

        if !props.p.is_finite() || props.p <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        if !props.t.is_finite() || props.t <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        if !props.h.is_finite() || !props.s.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "enthalpy and entropy must be finite",
            });
        }
        if !props.rho.is_finite() || props.rho <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "density must be positive and finite",
            });
        }

        Ok(Self {
            p: pa(props.p),
            t: k(props.t),
            h: props.h,
            s: props.s,
            rho: Density::new::<kilogram_per_cubic_meter>(props.rho),
            quality: props.quality.filter(|x| (0.0..=1.0).contains(x)),
        })
    }

    pub fn pressure(&self) -> Pressure {
        self.p
    }

    pub fn temperature(&self) -> Temperature {
        self.t
    }

    pub fn enthalpy(&self) -> SpecEnthalpy {
        self.h
    }

    pub fn entropy(&self) -> SpecEntropy {
        self.s
    }

    pub fn density(&self) -> Density {
        self.rho
    }

    /// Specific volume [m³/kg].
    pub fn specific_volume(&self) -> f64 {
        1.0 / self.rho.value
    }

    /// Vapour quality inside the two-phase dome, `None` otherwise.
    pub fn quality(&self) -> Option<f64> {
        self.quality
    }
}

/// Saturation data at one pressure or temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saturation {
    pub p: Pressure,
    pub t: Temperature,
    /// Saturated liquid enthalpy [J/kg].
    pub h_liquid: SpecEnthalpy,
    /// Saturated vapour enthalpy [J/kg].
    pub h_vapor: SpecEnthalpy,
}

impl Saturation {
    /// Vapour quality for an enthalpy, unclamped.
    pub fn quality_of(&self, h: SpecEnthalpy) -> f64 {
        (h - self.h_liquid) / (self.h_vapor - self.h_liquid)
    }
}
