//! Closed steam cycle: design, persistence, offdesign and sweeps.

use std::sync::Arc;

use approx::assert_relative_eq;
use cf_components::{Bus, BusBase, BusMember, Characteristic, ComponentKind, ConnAttr, ModeSets, Param};
use cf_core::units::UnitSystem;
use cf_fluids::{Composition, RoutedModel, Species};
use cf_network::{Mode, Network, NetworkError};
use cf_results::ResultStore;
use cf_solver::NewtonConfig;

/// Water cycle in engineering units (C, bar, kJ/kg) with a fixed
/// condensing pressure.
fn rankine() -> Network {
    let mut net = Network::new("rankine", Arc::new(RoutedModel::standard()))
        .with_units(UnitSystem::default());
    for (label, kind) in [
        ("cycle closer", ComponentKind::CycleCloser),
        ("steam generator", ComponentKind::SimpleHeatExchanger),
        ("main condenser", ComponentKind::Condenser),
        ("steam turbine", ComponentKind::Turbine),
        ("feed pump", ComponentKind::Pump),
        ("cooling water source", ComponentKind::Source),
        ("cooling water sink", ComponentKind::Sink),
    ] {
        net.add_component(label, kind).unwrap();
    }
    net.connect("1", "cycle closer", 0, "steam turbine", 0).unwrap();
    net.connect("2", "steam turbine", 0, "main condenser", 0).unwrap();
    net.connect("3", "main condenser", 0, "feed pump", 0).unwrap();
    net.connect("4", "feed pump", 0, "steam generator", 0).unwrap();
    net.connect("0", "steam generator", 0, "cycle closer", 0).unwrap();
    net.connect("11", "cooling water source", 0, "main condenser", 1).unwrap();
    net.connect("12", "main condenser", 1, "cooling water sink", 0).unwrap();

    net.set_param("main condenser", Param::Pr1, Some(1.0)).unwrap();
    net.set_param("main condenser", Param::Pr2, Some(0.98)).unwrap();
    net.set_param("steam generator", Param::Pr, Some(0.9)).unwrap();
    net.set_param("steam turbine", Param::EtaS, Some(0.9)).unwrap();
    net.set_param("feed pump", Param::EtaS, Some(0.75)).unwrap();

    let water = Composition::pure(Species::Water);
    net.set_fluid("11", water.clone()).unwrap();
    net.set_attr("11", ConnAttr::T, Some(20.0)).unwrap();
    net.set_attr("11", ConnAttr::P, Some(1.2)).unwrap();
    net.set_attr("12", ConnAttr::T, Some(30.0)).unwrap();
    net.set_fluid("1", water).unwrap();
    net.set_attr("1", ConnAttr::T, Some(600.0)).unwrap();
    net.set_attr("1", ConnAttr::P, Some(150.0)).unwrap();
    net.set_attr("1", ConnAttr::M, Some(10.0)).unwrap();
    net.set_attr("2", ConnAttr::P, Some(0.1)).unwrap();

    let mut bus = Bus::new("electrical power output");
    bus.add_member(BusMember::new(
        "steam turbine",
        Characteristic::Constant(0.97),
        BusBase::Component,
    ))
    .unwrap();
    bus.add_member(BusMember::new(
        "feed pump",
        Characteristic::Constant(0.97),
        BusBase::Bus,
    ))
    .unwrap();
    net.add_bus(bus).unwrap();
    net
}

fn store(tag: &str) -> ResultStore {
    let dir = std::env::temp_dir().join(format!("cf-network-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    ResultStore::new(dir).unwrap()
}

#[test]
fn design_mass_balance_closes() {
    let mut net = rankine();
    let report = net.solve(Mode::Design, None).unwrap();
    assert!(report.residual_norm < 1e-6);

    let results = net.results().unwrap();
    for label in ["1", "2", "3", "4", "0"] {
        let m = results.connection(label).unwrap().stream.m;
        assert_relative_eq!(m, 10.0, max_relative = 1e-6);
    }
    let deviation = results.param("cycle closer", Param::MassDeviation).unwrap();
    assert!(deviation < 1e-6);

    let cw_in = results.connection("11").unwrap().stream.m;
    let cw_out = results.connection("12").unwrap().stream.m;
    assert_relative_eq!(cw_in, cw_out, max_relative = 1e-9);
    assert!(cw_in > 100.0, "cooling water flow {cw_in}");
}

#[test]
fn turbine_outlet_follows_efficiency() {
    let mut net = rankine();
    net.solve(Mode::Design, None).unwrap();
    let results = net.results().unwrap();
    assert_relative_eq!(
        results.param("steam turbine", Param::EtaS).unwrap(),
        0.9,
        max_relative = 1e-5
    );
    let power = results.param("steam turbine", Param::P).unwrap();
    assert!(power < -5e6 && power > -20e6, "turbine power {power}");

    let bus = results.bus("electrical power output").unwrap();
    let eta = results.efficiency("electrical power output", "steam generator").unwrap();
    assert!(bus.total < 0.0);
    assert!(eta > 0.3 && eta < 0.5, "efficiency {eta}");
}

#[test]
fn condensing_pressure_follows_terminal_difference() {
    let mut net = rankine();
    net.set_attr("2", ConnAttr::P, None).unwrap();
    net.set_param("main condenser", Param::TtdU, Some(4.0)).unwrap();
    let report = net.solve(Mode::Design, None).unwrap();
    assert!(report.residual_norm < 1e-6);

    let results = net.results().unwrap();
    assert_relative_eq!(
        results.param("main condenser", Param::TtdU).unwrap(),
        4.0,
        epsilon = 1e-6
    );
    // saturation at 34 C is about 0.0532 bar
    let p_cond = results.connection("2").unwrap().stream.p;
    assert!(p_cond > 5.0e3 && p_cond < 5.6e3, "condensing pressure {p_cond}");
    let p_pump = results.connection("3").unwrap().stream.p;
    assert_relative_eq!(p_pump, p_cond, max_relative = 1e-9);
    assert!(results.param("feed pump", Param::P).unwrap() > 0.0);
}

#[test]
fn repeated_solves_are_identical() {
    let mut net = rankine();
    net.solve(Mode::Design, None).unwrap();
    let first = net.results().unwrap().connection("2").unwrap().stream.h;

    let mut fresh = rankine();
    fresh.solve(Mode::Design, None).unwrap();
    let second = fresh.results().unwrap().connection("2").unwrap().stream.h;
    assert_eq!(first, second);
}

#[test]
fn saved_design_reproduces_itself_offdesign() {
    let mut net = rankine();
    net.set_component_modes(
        "main condenser",
        ModeSets::new(vec![], vec![Param::KA]).unwrap(),
    )
    .unwrap();
    net.set_connection_modes("2", ModeSets::new(vec![ConnAttr::P], vec![]).unwrap())
        .unwrap();
    net.set_connection_modes("11", ModeSets::new(vec![], vec![ConnAttr::V]).unwrap())
        .unwrap();
    net.set_connection_modes("12", ModeSets::new(vec![ConnAttr::T], vec![]).unwrap())
        .unwrap();
    net.set_connection_modes("1", ModeSets::new(vec![ConnAttr::P], vec![]).unwrap())
        .unwrap();
    net.set_component_modes(
        "steam turbine",
        ModeSets::new(vec![], vec![Param::Cone]).unwrap(),
    )
    .unwrap();

    net.solve(Mode::Design, None).unwrap();
    let store = store("roundtrip");
    net.save_design(&store, "rankine_design").unwrap();
    let design = Network::load_design(&store, "rankine_design").unwrap();

    let mut off = net.clone();
    off.clear_seed();
    off.solve(Mode::Offdesign, Some(&design)).unwrap();
    let before = net.results().unwrap();
    let after = off.results().unwrap();
    assert_eq!(after.mode, Mode::Offdesign);
    for row in &before.connections {
        let again = &after.connection(&row.label).unwrap().stream;
        assert_relative_eq!(again.m, row.stream.m, max_relative = 1e-5);
        assert_relative_eq!(again.p, row.stream.p, max_relative = 1e-5);
        assert_relative_eq!(again.h, row.stream.h, max_relative = 1e-5);
    }

    // part load: less steam, lower live steam pressure by the cone law
    off.set_attr("1", ConnAttr::M, Some(8.0)).unwrap();
    off.solve(Mode::Offdesign, Some(&design)).unwrap();
    let p_part = off.results().unwrap().connection("1").unwrap().stream.p;
    assert!(p_part < 150e5, "live steam pressure {p_part}");

    let _ = std::fs::remove_dir_all(store.root());
}

#[test]
fn mass_flow_sweep_raises_power() {
    let base = rankine();
    let mut previous: Option<Network> = None;
    let mut power = Vec::new();
    for step in 0..6 {
        let m = 10.0 + 10.0 * step as f64;
        let mut point = base.clone();
        if let Some(prev) = &previous {
            point.seed_from(prev);
        }
        point.set_attr("1", ConnAttr::M, Some(m)).unwrap();
        point.solve(Mode::Design, None).unwrap();
        power.push(point.results().unwrap().bus("electrical power output").unwrap().total.abs());
        previous = Some(point);
    }
    assert!(power.windows(2).all(|w| w[1] > w[0]), "{power:?}");
    // linear in mass flow at fixed states
    assert_relative_eq!(power[5] / power[0], 6.0, max_relative = 1e-4);
}

#[test]
fn offdesign_needs_design_point() {
    let mut net = rankine();
    let err = net.solve(Mode::Offdesign, None).unwrap_err();
    assert!(matches!(err, NetworkError::Configuration { .. }), "{err}");
    assert!(net.results().is_none());
}

#[test]
fn design_point_of_other_topology_is_rejected() {
    let mut net = rankine();
    net.solve(Mode::Design, None).unwrap();
    let design = net.design_point("base").unwrap();

    let mut other = rankine();
    other.add_component("spare", ComponentKind::Sink).unwrap();
    let err = other.solve(Mode::Offdesign, Some(&design)).unwrap_err();
    assert!(err.to_string().contains("different topology"), "{err}");
}

#[test]
fn failed_solve_keeps_previous_results() {
    let mut net = rankine();
    net.solve(Mode::Design, None).unwrap();
    let before = net.results().unwrap().clone();

    // over-specified
    net.set_attr("3", ConnAttr::H, Some(200.0)).unwrap();
    let err = net.solve(Mode::Design, None).unwrap_err();
    assert!(err.to_string().contains("over-determined"), "{err}");
    assert_eq!(net.results(), Some(&before));
    net.set_attr("3", ConnAttr::H, None).unwrap();

    // not converged within the iteration bound
    net.set_solver_config(NewtonConfig {
        max_iterations: 0,
        ..NewtonConfig::default()
    });
    net.set_attr("1", ConnAttr::M, Some(20.0)).unwrap();
    let err = net.solve(Mode::Design, None).unwrap_err();
    assert!(err.is_recoverable(), "{err}");
    assert_eq!(net.results(), Some(&before));
}

#[test]
fn bus_power_replaces_mass_flow() {
    let mut net = rankine();
    net.set_bus_power("electrical power output", Some(-10e6)).unwrap();
    net.set_attr("1", ConnAttr::M, None).unwrap();
    net.solve(Mode::Design, None).unwrap();
    let results = net.results().unwrap();
    assert_relative_eq!(
        results.bus("electrical power output").unwrap().total,
        -10e6,
        max_relative = 1e-6
    );
    assert!(results.connection("1").unwrap().stream.m > 5.0);
}

#[test]
fn unknown_labels_are_configuration_errors() {
    let mut net = rankine();
    assert!(matches!(
        net.set_param("reheater", Param::Q, Some(1.0)),
        Err(NetworkError::Configuration { .. })
    ));
    assert!(net.connect("1", "steam turbine", 0, "feed pump", 0).is_err());
    assert!(net.set_param("feed pump", Param::KA, Some(1.0)).is_err());
}
