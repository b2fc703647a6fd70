//! Compilation of plant definitions into solvable networks.

use std::sync::Arc;

use cf_components::{
    Bus, BusBase, BusMember, Characteristic, ComponentKind, ConnAttr, ModeSets, Param,
};
use cf_fluids::{Composition, FluidModel, RoutedModel};
use cf_network::Network;
use cf_project::schema::{BusBaseDef, BusDef, ComponentDef, ConnectionDef, Plant, SolverDef};
use cf_solver::NewtonConfig;

use crate::error::{AppError, AppResult};

/// Property backends used for plant files.
pub fn build_fluid_model() -> Arc<dyn FluidModel> {
    Arc::new(RoutedModel::standard())
}

pub fn newton_config(solver: &SolverDef) -> NewtonConfig {
    NewtonConfig {
        max_iterations: solver.max_iterations,
        tolerance: solver.tolerance,
        min_pressure: solver.min_pressure_pa,
        line_search_beta: solver.line_search_beta,
        max_line_search_iters: solver.max_line_search_iters,
        fd_epsilon: solver.fd_epsilon,
    }
}

/// Compile a validated plant into a network.
pub fn compile_plant(plant: &Plant, fluid: Arc<dyn FluidModel>) -> AppResult<Network> {
    let mut net = Network::new(plant.name.clone(), fluid).with_units(plant.units);
    net.set_solver_config(newton_config(&plant.solver));

    for def in &plant.components {
        compile_component(&mut net, def)?;
    }
    for def in &plant.connections {
        compile_connection(&mut net, def)?;
    }
    for def in &plant.buses {
        net.add_bus(compile_bus(def)?)?;
    }
    Ok(net)
}

fn parse_params(names: &[String]) -> AppResult<Vec<Param>> {
    names
        .iter()
        .map(|n| n.parse::<Param>().map_err(AppError::from))
        .collect()
}

fn parse_attrs(names: &[String]) -> AppResult<Vec<ConnAttr>> {
    names
        .iter()
        .map(|n| n.parse::<ConnAttr>().map_err(AppError::from))
        .collect()
}

fn compile_component(net: &mut Network, def: &ComponentDef) -> AppResult<()> {
    let kind: ComponentKind = def.kind.parse()?;
    net.add_component(def.label.clone(), kind)?;
    for (name, value) in &def.params {
        net.set_param(&def.label, name.parse()?, Some(*value))?;
    }
    if !def.design.is_empty() || !def.offdesign.is_empty() {
        let modes = ModeSets::new(parse_params(&def.design)?, parse_params(&def.offdesign)?)?;
        net.set_component_modes(&def.label, modes)?;
    }
    Ok(())
}

fn compile_connection(net: &mut Network, def: &ConnectionDef) -> AppResult<()> {
    net.connect(
        def.label.clone(),
        &def.from.component,
        def.from.port,
        &def.to.component,
        def.to.port,
    )?;
    let s = &def.state;
    for (attr, value) in [
        (ConnAttr::M, s.m),
        (ConnAttr::P, s.p),
        (ConnAttr::H, s.h),
        (ConnAttr::T, s.t),
        (ConnAttr::X, s.x),
        (ConnAttr::V, s.v),
    ] {
        if value.is_some() {
            net.set_attr(&def.label, attr, value)?;
        }
    }
    if let Some(fluid) = &def.fluid {
        net.set_fluid(&def.label, Composition::from_named(fluid)?)?;
    }
    if !def.design.is_empty() || !def.offdesign.is_empty() {
        let modes = ModeSets::new(parse_attrs(&def.design)?, parse_attrs(&def.offdesign)?)?;
        net.set_connection_modes(&def.label, modes)?;
    }
    Ok(())
}

fn compile_bus(def: &BusDef) -> AppResult<Bus> {
    let mut bus = Bus::new(def.label.clone());
    bus.p = def.p;
    for member in &def.members {
        let characteristic = match (&member.characteristic, member.efficiency) {
            (Some(curve), _) => Characteristic::curve(curve.load.clone(), curve.eta.clone())?,
            (None, Some(eta)) => Characteristic::Constant(eta),
            (None, None) => Characteristic::Constant(1.0),
        };
        let base = match member.base {
            BusBaseDef::Component => BusBase::Component,
            BusBaseDef::Bus => BusBase::Bus,
        };
        bus.add_member(BusMember::new(member.component.clone(), characteristic, base))?;
    }
    Ok(bus)
}
