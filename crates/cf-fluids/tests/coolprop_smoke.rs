//! CoolProp integration tests.
//!
//! Only built with `--features coolprop`. Tolerances are broad to avoid
//! backend version issues while still enforcing physical plausibility.
#![cfg(feature = "coolprop")]

use cf_core::units::{bar, celsius, pa};
use cf_fluids::{Composition, CoolPropModel, FluidModel, If97Model, Species, StateInput};

#[test]
fn r1234yf_saturation_near_published_values() {
    let model = CoolPropModel::new();
    let comp = Composition::pure(Species::R1234yf);

    // R1234yf boils at about 26.4 °C at 7 bar.
    let sat = model.saturation_at_p(bar(7.0), &comp).unwrap();
    let t_c = sat.t.value - 273.15;
    assert!(t_c > 24.0 && t_c < 29.0, "T_sat = {t_c} °C");
    assert!(sat.h_vapor > sat.h_liquid);
}

#[test]
fn r1234yf_ph_round_trip() {
    let model = CoolPropModel::new();
    let comp = Composition::pure(Species::R1234yf);
    let by_pt = model
        .state(
            StateInput::PT {
                p: bar(30.0),
                t: celsius(90.0),
            },
            &comp,
        )
        .unwrap();
    let by_ph = model
        .state(
            StateInput::PH {
                p: bar(30.0),
                h: by_pt.enthalpy(),
            },
            &comp,
        )
        .unwrap();
    assert!((by_ph.temperature().value - by_pt.temperature().value).abs() < 0.01);
}

#[test]
fn water_agrees_with_if97() {
    let comp = Composition::pure(Species::Water);
    let input = StateInput::PT {
        p: pa(101_325.0),
        t: celsius(26.85),
    };
    let cp = CoolPropModel::new().state(input, &comp).unwrap();
    let iapws = If97Model::new().state(input, &comp).unwrap();

    let rel = (cp.enthalpy() - iapws.enthalpy()).abs() / iapws.enthalpy();
    assert!(rel < 1e-3, "relative enthalpy difference {rel}");
}

#[test]
fn two_phase_quality_reported() {
    let model = CoolPropModel::new();
    let comp = Composition::pure(Species::R1234yf);
    let state = model
        .state(StateInput::PQ { p: bar(7.0), x: 0.3 }, &comp)
        .unwrap();
    let x = state.quality().unwrap();
    assert!((x - 0.3).abs() < 1e-6);
}
