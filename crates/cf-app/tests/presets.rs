//! Presets agree with the shipped plant files.

use std::path::Path;

use approx::assert_relative_eq;
use cf_app::{build_fluid_model, compile_plant, load_plant, presets};
use cf_components::{ComponentModel, Param};
use cf_network::Mode;

#[test]
fn rankine_preset_matches_plant_file() {
    let plant = load_plant(Path::new("../../plants/rankine.yaml")).unwrap();
    let compiled = compile_plant(&plant, build_fluid_model()).unwrap();
    let preset = presets::rankine().unwrap();

    assert_eq!(compiled.fingerprint(), preset.fingerprint());
    for label in ["steam turbine", "feed pump", "main condenser", "steam generator"] {
        let (a, b) = (compiled.component(label).unwrap(), preset.component(label).unwrap());
        assert_eq!(a.model.params(), b.model.params(), "{label}");
        assert_eq!(a.modes(), b.modes(), "{label}");
    }
    for conn in compiled.connections() {
        let other = preset.connection(&conn.label).unwrap();
        assert_eq!(conn.spec, other.spec, "connection {}", conn.label);
    }
    assert_eq!(compiled.buses(), preset.buses());
}

#[test]
fn orc_preset_matches_plant_file() {
    let plant = load_plant(Path::new("../../plants/orc.yaml")).unwrap();
    let compiled = compile_plant(&plant, build_fluid_model()).unwrap();
    let preset = presets::orc().unwrap();

    assert_eq!(compiled.fingerprint(), preset.fingerprint());
    assert_eq!(
        compiled.component("steam generator").unwrap().param(Param::Pr1),
        Some(0.98)
    );
    for conn in compiled.connections() {
        let other = preset.connection(&conn.label).unwrap();
        assert_eq!(conn.spec, other.spec, "connection {}", conn.label);
    }
}

#[test]
fn rankine_preset_converges() {
    let mut net = presets::rankine().unwrap();
    let report = net.solve(Mode::Design, None).unwrap();
    assert!(report.residual_norm < 1e-6);

    let results = net.results().unwrap();
    assert_relative_eq!(
        results.param("main condenser", Param::TtdU).unwrap(),
        4.0,
        epsilon = 1e-6
    );
    let eta = results
        .efficiency(presets::POWER_BUS, "steam generator")
        .unwrap();
    assert!(eta > 0.35 && eta < 0.5, "efficiency {eta}");
}
