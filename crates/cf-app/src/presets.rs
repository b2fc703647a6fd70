//! Built-in plants: a steam Rankine cycle and an R1234yf organic Rankine
//! cycle. Both match the files under `plants/`.

use cf_components::{
    Bus, BusBase, BusMember, Characteristic, ComponentKind, ConnAttr, ModeSets, Param,
};
use cf_core::units::UnitSystem;
use cf_fluids::{Composition, Species};
use cf_network::Network;

use crate::compile::build_fluid_model;
use crate::error::AppResult;

pub const POWER_BUS: &str = "electrical power output";

/// Cycle closer, turbine, condenser, pump and heat source on one loop,
/// plus the cooling water pass through the condenser.
fn cycle(name: &str, heater: ComponentKind) -> AppResult<Network> {
    let mut net =
        Network::new(name, build_fluid_model()).with_units(UnitSystem::default());
    for (label, kind) in [
        ("cycle closer", ComponentKind::CycleCloser),
        ("steam generator", heater),
        ("main condenser", ComponentKind::Condenser),
        ("steam turbine", ComponentKind::Turbine),
        ("feed pump", ComponentKind::Pump),
        ("cooling water source", ComponentKind::Source),
        ("cooling water sink", ComponentKind::Sink),
    ] {
        net.add_component(label, kind)?;
    }
    net.connect("1", "cycle closer", 0, "steam turbine", 0)?;
    net.connect("2", "steam turbine", 0, "main condenser", 0)?;
    net.connect("3", "main condenser", 0, "feed pump", 0)?;
    net.connect("4", "feed pump", 0, "steam generator", 0)?;
    net.connect("0", "steam generator", 0, "cycle closer", 0)?;
    net.connect("11", "cooling water source", 0, "main condenser", 1)?;
    net.connect("12", "main condenser", 1, "cooling water sink", 0)?;

    net.set_param("steam turbine", Param::EtaS, Some(0.9))?;
    net.set_param("feed pump", Param::EtaS, Some(0.75))?;

    let mut bus = Bus::new(POWER_BUS);
    bus.add_member(BusMember::new(
        "steam turbine",
        Characteristic::Constant(0.97),
        BusBase::Component,
    ))?;
    bus.add_member(BusMember::new(
        "feed pump",
        Characteristic::Constant(0.97),
        BusBase::Bus,
    ))?;
    net.add_bus(bus)?;
    Ok(net)
}

/// Water Rankine cycle: 600 C and 150 bar live steam, 10 kg/s, condenser
/// sized by a 4 K upper terminal difference.
///
/// Offdesign keeps the condenser `kA`, the cooling water volume flow and
/// the turbine cone law, and releases live steam pressure.
pub fn rankine() -> AppResult<Network> {
    let mut net = cycle("rankine", ComponentKind::SimpleHeatExchanger)?;
    let water = Composition::pure(Species::Water);

    net.set_param("steam generator", Param::Pr, Some(0.9))?;
    net.set_param("main condenser", Param::Pr1, Some(1.0))?;
    net.set_param("main condenser", Param::Pr2, Some(0.98))?;
    net.set_param("main condenser", Param::TtdU, Some(4.0))?;
    net.set_component_modes("main condenser", ModeSets::new(vec![Param::TtdU], vec![Param::KA])?)?;
    net.set_component_modes("steam turbine", ModeSets::new(vec![], vec![Param::Cone])?)?;

    net.set_fluid("1", water.clone())?;
    net.set_attr("1", ConnAttr::T, Some(600.0))?;
    net.set_attr("1", ConnAttr::P, Some(150.0))?;
    net.set_attr("1", ConnAttr::M, Some(10.0))?;
    net.set_connection_modes("1", ModeSets::new(vec![ConnAttr::P], vec![])?)?;

    net.set_fluid("11", water)?;
    net.set_attr("11", ConnAttr::T, Some(20.0))?;
    net.set_attr("11", ConnAttr::P, Some(1.2))?;
    net.set_connection_modes("11", ModeSets::new(vec![], vec![ConnAttr::V])?)?;
    net.set_attr("12", ConnAttr::T, Some(30.0))?;
    net.set_connection_modes("12", ModeSets::new(vec![ConnAttr::T], vec![])?)?;
    Ok(net)
}

/// R1234yf cycle heated by 2 bar steam from 150 C to 100 C.
///
/// Refrigerant properties need the `coolprop` feature.
pub fn orc() -> AppResult<Network> {
    let mut net = cycle("orc", ComponentKind::HeatExchanger)?;
    net.add_component("steam source", ComponentKind::Source)?;
    net.add_component("steam sink", ComponentKind::Sink)?;
    net.connect("21", "steam source", 0, "steam generator", 1)?;
    net.connect("22", "steam generator", 1, "steam sink", 0)?;

    for component in ["steam generator", "main condenser"] {
        net.set_param(component, Param::Pr1, Some(0.98))?;
        net.set_param(component, Param::Pr2, Some(1.0))?;
    }

    let water = Composition::pure(Species::Water);
    net.set_fluid("1", Composition::pure(Species::R1234yf))?;
    net.set_attr("1", ConnAttr::T, Some(90.0))?;
    net.set_attr("1", ConnAttr::P, Some(30.0))?;
    net.set_attr("1", ConnAttr::M, Some(10.0))?;
    net.set_attr("2", ConnAttr::P, Some(7.0))?;

    net.set_fluid("11", water.clone())?;
    net.set_attr("11", ConnAttr::T, Some(20.0))?;
    net.set_attr("11", ConnAttr::P, Some(1.2))?;
    net.set_attr("12", ConnAttr::T, Some(25.0))?;

    net.set_fluid("21", water)?;
    net.set_attr("21", ConnAttr::T, Some(150.0))?;
    net.set_attr("21", ConnAttr::P, Some(2.0))?;
    net.set_attr("22", ConnAttr::T, Some(100.0))?;
    Ok(net)
}
