//! IAPWS-IF97 water/steam backend delegating to the `seuif97` crate.
//!
//! seuif97 works in MPa, °C, kJ/kg and kJ/(kg·K) and reports failures as NaN;
//! this module converts to SI and turns NaN into [`FluidError::OutOfRange`].
//!
//! Single phase `(p, h)` and `(p, s)` states start from the IF97 backward
//! equations and are refined against the forward `(p, T)` functions, so
//! `h(p, T(p, h)) == h` and states stay continuous across the saturation
//! lines. Inside the dome the quality is taken from the saturated values.

use seuif97::{OCP, OH, OP, OS, OT, OV, ph, ps, pt, px, tx};

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::model::{FluidModel, validation};
use crate::species::Species;
use crate::state::{Saturation, StateInput, StateProps, ThermoState};
use cf_core::units::{Pressure, Temperature, k, pa};

const CRITICAL_PRESSURE_PA: f64 = 22.064e6;
const CRITICAL_TEMPERATURE_K: f64 = 647.096;
const KELVIN_OFFSET: f64 = 273.15;
/// Below this pressure saturation borders regions 1 and 2 only.
const REGION_3_PRESSURE_PA: f64 = 16.5292e6;
/// Upper temperature of region 2.
const REGION_2_MAX_TEMPERATURE_C: f64 = 800.0;
const REFINE_ITERATIONS: usize = 6;
const REFINE_TOLERANCE_C: f64 = 1e-10;
const REGION_LIQUID: i32 = 1;
const REGION_VAPOUR: i32 = 2;

/// Property that a refined `(p, T)` state has to reproduce.
#[derive(Clone, Copy)]
enum Target {
    Enthalpy,
    Entropy,
}

/// Single phase side of the saturation lines, with the saturation
/// temperature in °C.
#[derive(Clone, Copy)]
struct Side {
    region: i32,
    t_sat: f64,
}

/// Water and steam properties from IAPWS-IF97.
#[derive(Debug, Clone, Copy, Default)]
pub struct If97Model;

impl If97Model {
    pub fn new() -> Self {
        Self
    }

    fn checked(value: f64, what: &str, p_pa: f64, other: f64) -> FluidResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(FluidError::OutOfRange {
                what: format!("IF97 {what} at p={p_pa:.1} Pa, second input {other:.4}"),
            })
        }
    }

    fn require_water(comp: &Composition) -> FluidResult<()> {
        match comp.is_pure() {
            Some(Species::Water) => Ok(()),
            _ => Err(FluidError::NotSupported {
                what: format!("IF97 only covers water, got {comp}"),
            }),
        }
    }

    /// Quality from the saturated enthalpies at `p`, subcritical only.
    fn quality_at(p_pa: f64, h: f64) -> Option<f64> {
        Self::dome_fraction(p_pa, h, OH)
    }

    /// Position of `value` between the saturated liquid and vapour values of
    /// property `o_id`, or `None` outside the dome.
    fn dome_fraction(p_pa: f64, value: f64, o_id: i32) -> Option<f64> {
        if p_pa >= CRITICAL_PRESSURE_PA {
            return None;
        }
        let p_mpa = p_pa * 1e-6;
        let (liquid, vapour) = Self::saturated(p_mpa, o_id)?;
        if value < liquid || value > vapour {
            return None;
        }
        Some(((value - liquid) / (vapour - liquid)).clamp(0.0, 1.0))
    }

    /// Saturated liquid and vapour values of property `o_id`, SI units.
    fn saturated(p_mpa: f64, o_id: i32) -> Option<(f64, f64)> {
        let liquid = px(p_mpa, 0.0, o_id) * 1e3;
        let vapour = px(p_mpa, 1.0, o_id) * 1e3;
        (liquid.is_finite() && vapour.is_finite()).then_some((liquid, vapour))
    }

    /// Region to hold a refined single phase state in, so the forward
    /// functions cannot flip phase right at the saturation line.
    fn side(p_pa: f64, value: f64, o_id: i32) -> Option<Side> {
        if p_pa >= REGION_3_PRESSURE_PA {
            return None;
        }
        let p_mpa = p_pa * 1e-6;
        let (liquid, _) = Self::saturated(p_mpa, o_id)?;
        let t_sat = px(p_mpa, 0.0, OT);
        if !t_sat.is_finite() {
            return None;
        }
        let region = if value < liquid { REGION_LIQUID } else { REGION_VAPOUR };
        Some(Side { region, t_sat })
    }

    fn forward(p_mpa: f64, t_c: f64, o_id: i32, side: Option<Side>) -> f64 {
        match side {
            Some(side) => pt(p_mpa, t_c, (o_id, side.region)),
            None => pt(p_mpa, t_c, o_id),
        }
    }

    /// Newton on `T` until the forward function reproduces `target` (SI).
    /// Returns `None` if the forward functions fail on the way.
    fn refine_temperature(
        p_mpa: f64,
        t_start: f64,
        target: Target,
        value: f64,
        side: Option<Side>,
    ) -> Option<f64> {
        let mut t = t_start;
        for _ in 0..REFINE_ITERATIONS {
            let cp = Self::forward(p_mpa, t, OCP, side) * 1e3;
            let (current, slope) = match target {
                Target::Enthalpy => (Self::forward(p_mpa, t, OH, side) * 1e3, cp),
                Target::Entropy => (
                    Self::forward(p_mpa, t, OS, side) * 1e3,
                    cp / (t + KELVIN_OFFSET),
                ),
            };
            if !current.is_finite() || !slope.is_finite() || slope <= 0.0 {
                return None;
            }
            let step = (current - value) / slope;
            t -= step;
            if let Some(side) = side {
                t = match side.region {
                    REGION_LIQUID => t.min(side.t_sat),
                    _ => t.max(side.t_sat),
                };
            }
            if step.abs() < REFINE_TOLERANCE_C {
                break;
            }
        }
        t.is_finite().then_some(t)
    }

    /// Single phase state at `(p, T)` refined from a backward estimate.
    fn refined(
        p_pa: f64,
        t_start: f64,
        target: Target,
        value: f64,
        o_id: i32,
    ) -> Option<StateProps> {
        let p_mpa = p_pa * 1e-6;
        let side = Self::side(p_pa, value, o_id)
            .filter(|s| s.region == REGION_LIQUID || t_start <= REGION_2_MAX_TEMPERATURE_C);
        let t = Self::refine_temperature(p_mpa, t_start, target, value, side)?;
        let h = Self::forward(p_mpa, t, OH, side) * 1e3;
        let s = Self::forward(p_mpa, t, OS, side) * 1e3;
        let v = Self::forward(p_mpa, t, OV, side);
        if !(h.is_finite() && s.is_finite() && v.is_finite()) {
            return None;
        }
        let (h, s) = match target {
            Target::Enthalpy => (value, s),
            Target::Entropy => (h, value),
        };
        Some(StateProps {
            p: p_pa,
            t: t + KELVIN_OFFSET,
            h,
            s,
            rho: 1.0 / v,
            quality: None,
        })
    }

    fn props_pt(p_pa: f64, t_k: f64) -> FluidResult<StateProps> {
        let (p, t) = (p_pa * 1e-6, t_k - KELVIN_OFFSET);
        let h = Self::checked(pt(p, t, OH), "h(p,T)", p_pa, t_k)? * 1e3;
        let s = Self::checked(pt(p, t, OS), "s(p,T)", p_pa, t_k)? * 1e3;
        let v = Self::checked(pt(p, t, OV), "v(p,T)", p_pa, t_k)?;
        Ok(StateProps {
            p: p_pa,
            t: t_k,
            h,
            s,
            rho: 1.0 / v,
            quality: None,
        })
    }

    fn props_ph(p_pa: f64, h: f64) -> FluidResult<StateProps> {
        if let Some(x) = Self::quality_at(p_pa, h) {
            return Self::props_px(p_pa, x).map(|props| StateProps { h, ..props });
        }
        let (p, h_kj) = (p_pa * 1e-6, h * 1e-3);
        let t = Self::checked(ph(p, h_kj, OT), "T(p,h)", p_pa, h)?;
        if let Some(props) = Self::refined(p_pa, t, Target::Enthalpy, h, OH) {
            return Ok(props);
        }
        let s = Self::checked(ph(p, h_kj, OS), "s(p,h)", p_pa, h)? * 1e3;
        let v = Self::checked(ph(p, h_kj, OV), "v(p,h)", p_pa, h)?;
        Ok(StateProps {
            p: p_pa,
            t: t + KELVIN_OFFSET,
            h,
            s,
            rho: 1.0 / v,
            quality: None,
        })
    }

    fn props_ps(p_pa: f64, s: f64) -> FluidResult<StateProps> {
        if let Some(x) = Self::dome_fraction(p_pa, s, OS) {
            return Self::props_px(p_pa, x).map(|props| StateProps { s, ..props });
        }
        let (p, s_kj) = (p_pa * 1e-6, s * 1e-3);
        let t = Self::checked(ps(p, s_kj, OT), "T(p,s)", p_pa, s)?;
        if let Some(props) = Self::refined(p_pa, t, Target::Entropy, s, OS) {
            return Ok(props);
        }
        let h = Self::checked(ps(p, s_kj, OH), "h(p,s)", p_pa, s)? * 1e3;
        let v = Self::checked(ps(p, s_kj, OV), "v(p,s)", p_pa, s)?;
        Ok(StateProps {
            p: p_pa,
            t: t + KELVIN_OFFSET,
            h,
            s,
            rho: 1.0 / v,
            quality: None,
        })
    }

    fn props_px(p_pa: f64, x: f64) -> FluidResult<StateProps> {
        validation::validate_quality(x)?;
        if p_pa >= CRITICAL_PRESSURE_PA {
            return Err(FluidError::OutOfRange {
                what: format!("quality requires subcritical pressure, got {p_pa:.1} Pa"),
            });
        }
        let p = p_pa * 1e-6;
        let t = Self::checked(px(p, x, OT), "T(p,x)", p_pa, x)? + KELVIN_OFFSET;
        let h = Self::checked(px(p, x, OH), "h(p,x)", p_pa, x)? * 1e3;
        let s = Self::checked(px(p, x, OS), "s(p,x)", p_pa, x)? * 1e3;
        let v = Self::checked(px(p, x, OV), "v(p,x)", p_pa, x)?;
        Ok(StateProps {
            p: p_pa,
            t,
            h,
            s,
            rho: 1.0 / v,
            quality: Some(x),
        })
    }
}

impl FluidModel for If97Model {
    fn name(&self) -> &str {
        "IF97"
    }

    fn supports_composition(&self, comp: &Composition) -> bool {
        comp.is_pure() == Some(Species::Water)
    }

    fn state(&self, input: StateInput, comp: &Composition) -> FluidResult<ThermoState> {
        Self::require_water(comp)?;
        let props = match input {
            StateInput::PT { p, t } => {
                validation::validate_pressure(p.value)?;
                validation::validate_temperature(t.value)?;
                Self::props_pt(p.value, t.value)?
            }
            StateInput::PH { p, h } => {
                validation::validate_pressure(p.value)?;
                Self::props_ph(p.value, h)?
            }
            StateInput::PS { p, s } => {
                validation::validate_pressure(p.value)?;
                Self::props_ps(p.value, s)?
            }
            StateInput::PQ { p, x } => {
                validation::validate_pressure(p.value)?;
                Self::props_px(p.value, x)?
            }
        };
        ThermoState::from_props(props)
    }

    fn saturation_at_p(&self, p: Pressure, comp: &Composition) -> FluidResult<Saturation> {
        Self::require_water(comp)?;
        let p_pa = p.value;
        validation::validate_pressure(p_pa)?;
        if p_pa >= CRITICAL_PRESSURE_PA {
            return Err(FluidError::OutOfRange {
                what: format!("no saturation above the critical pressure ({p_pa:.1} Pa)"),
            });
        }
        let p_mpa = p_pa * 1e-6;
        let t = Self::checked(px(p_mpa, 0.0, OT), "T_sat(p)", p_pa, 0.0)? + KELVIN_OFFSET;
        let h_liquid = Self::checked(px(p_mpa, 0.0, OH), "h'(p)", p_pa, 0.0)? * 1e3;
        let h_vapor = Self::checked(px(p_mpa, 1.0, OH), "h''(p)", p_pa, 1.0)? * 1e3;
        Ok(Saturation {
            p,
            t: k(t),
            h_liquid,
            h_vapor,
        })
    }

    fn saturation_at_t(&self, t: Temperature, comp: &Composition) -> FluidResult<Saturation> {
        Self::require_water(comp)?;
        let t_k = t.value;
        validation::validate_temperature(t_k)?;
        if t_k >= CRITICAL_TEMPERATURE_K {
            return Err(FluidError::OutOfRange {
                what: format!("no saturation above the critical temperature ({t_k:.2} K)"),
            });
        }
        let t_c = t_k - KELVIN_OFFSET;
        let p = Self::checked(tx(t_c, 0.0, OP), "p_sat(T)", 0.0, t_k)? * 1e6;
        let h_liquid = Self::checked(tx(t_c, 0.0, OH), "h'(T)", p, t_k)? * 1e3;
        let h_vapor = Self::checked(tx(t_c, 1.0, OH), "h''(T)", p, t_k)? * 1e3;
        Ok(Saturation {
            p: pa(p),
            t,
            h_liquid,
            h_vapor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cf_core::units::{bar, celsius};
    use proptest::prelude::*;

    fn water() -> Composition {
        Composition::pure(Species::Water)
    }

    #[test]
    fn live_steam_state() {
        let model = If97Model::new();
        let state = model
            .state(
                StateInput::PT {
                    p: bar(150.0),
                    t: celsius(600.0),
                },
                &water(),
            )
            .unwrap();
        assert_relative_eq!(state.enthalpy(), 3_583.1e3, max_relative = 1e-3);
        assert_relative_eq!(state.entropy(), 6.6796e3, max_relative = 1e-3);
        assert_eq!(state.quality(), None);
    }

    #[test]
    fn ph_inverts_pt() {
        let model = If97Model::new();
        let pt_state = model
            .state(
                StateInput::PT {
                    p: bar(10.0),
                    t: celsius(250.0),
                },
                &water(),
            )
            .unwrap();
        let ph_state = model
            .state(
                StateInput::PH {
                    p: bar(10.0),
                    h: pt_state.enthalpy(),
                },
                &water(),
            )
            .unwrap();
        assert_relative_eq!(
            ph_state.temperature().value,
            pt_state.temperature().value,
            epsilon = 1e-6
        );
        assert_relative_eq!(ph_state.entropy(), pt_state.entropy(), max_relative = 1e-9);
    }

    #[test]
    fn continuous_across_saturated_liquid() {
        let model = If97Model::new();
        let p = bar(0.05);
        let sat = model.saturation_at_p(p, &water()).unwrap();
        let at = |h: f64| model.state(StateInput::PH { p, h }, &water()).unwrap();

        let on_line = at(sat.h_liquid);
        assert_relative_eq!(on_line.temperature().value, sat.t.value, epsilon = 1e-9);
        for dh in [-1e-3, 1e-3] {
            let near = at(sat.h_liquid + dh);
            assert_relative_eq!(near.temperature().value, sat.t.value, epsilon = 1e-5);
            assert_relative_eq!(near.entropy(), on_line.entropy(), epsilon = 1e-4);
        }
    }

    #[test]
    fn compressed_liquid_isentropic_rise() {
        let model = If97Model::new();
        let p = bar(0.05);
        let sat = model.saturation_at_p(p, &water()).unwrap();
        let inlet = model
            .state(StateInput::PH { p, h: sat.h_liquid }, &water())
            .unwrap();
        let h_s = model.isentropic_enthalpy(&inlet, bar(166.7), &water()).unwrap();
        let outlet = model
            .state(StateInput::PH { p: bar(166.7), h: h_s }, &water())
            .unwrap();
        assert_relative_eq!(outlet.entropy(), inlet.entropy(), epsilon = 1e-5);
        // v dp for water, about 1.0e-3 m3/kg over 166.65 bar
        assert_relative_eq!(h_s - sat.h_liquid, 16.7e3, max_relative = 0.02);
    }

    proptest! {
        #[test]
        fn ph_reproduces_forward_enthalpy(p_bar in 0.05f64..150.0, t_c in 10.0f64..600.0) {
            let model = If97Model::new();
            let forward = model
                .state(StateInput::PT { p: bar(p_bar), t: celsius(t_c) }, &water())
                .unwrap();
            let back = model
                .state(StateInput::PH { p: bar(p_bar), h: forward.enthalpy() }, &water())
                .unwrap();
            prop_assert!((back.temperature().value - forward.temperature().value).abs() < 1e-6);
        }
    }

    #[test]
    fn wet_steam_has_quality() {
        let model = If97Model::new();
        let sat = model.saturation_at_p(bar(0.1), &water()).unwrap();
        assert_relative_eq!(sat.t.value, 318.96, epsilon = 0.1);
        let h_mid = 0.5 * (sat.h_liquid + sat.h_vapor);
        let state = model
            .state(StateInput::PH { p: bar(0.1), h: h_mid }, &water())
            .unwrap();
        assert_relative_eq!(state.quality().unwrap(), 0.5, epsilon = 1e-6);

        let by_quality = model
            .state(StateInput::PQ { p: bar(0.1), x: 0.5 }, &water())
            .unwrap();
        assert_relative_eq!(by_quality.enthalpy(), h_mid, max_relative = 1e-9);
    }

    #[test]
    fn saturation_round_trip() {
        let model = If97Model::new();
        let at_t = model.saturation_at_t(celsius(99.61), &water()).unwrap();
        assert_relative_eq!(at_t.p.value, 1e5, max_relative = 2e-3);
        let at_p = model.saturation_at_p(at_t.p, &water()).unwrap();
        assert_relative_eq!(at_p.t.value, at_t.t.value, epsilon = 1e-3);
    }

    #[test]
    fn isentropic_expansion_lands_in_dome() {
        let model = If97Model::new();
        let inlet = model
            .state(
                StateInput::PT {
                    p: bar(150.0),
                    t: celsius(600.0),
                },
                &water(),
            )
            .unwrap();
        let h_s = model.isentropic_enthalpy(&inlet, bar(0.1), &water()).unwrap();
        let outlet = model
            .state(StateInput::PH { p: bar(0.1), h: h_s }, &water())
            .unwrap();
        let x = outlet.quality().unwrap();
        assert!(x > 0.75 && x < 0.85, "quality {x}");
    }

    #[test]
    fn rejects_other_fluids() {
        let model = If97Model::new();
        let air = Composition::pure(Species::Air);
        assert!(!model.supports_composition(&air));
        assert!(matches!(
            model.state(
                StateInput::PT {
                    p: bar(1.0),
                    t: celsius(20.0)
                },
                &air
            ),
            Err(FluidError::NotSupported { .. })
        ));
    }
}
