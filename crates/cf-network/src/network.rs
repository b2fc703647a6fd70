//! Labelled plant network: build, specify, solve, report.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use cf_components::{
    Bus, Component, ComponentKind, ComponentModel, ConnAttr, ConnectionSpec, ModeSets, Model,
    Param,
};
use cf_core::units::UnitSystem;
use cf_core::{CompId, ConnId};
use cf_fluids::{Composition, FluidModel};
use cf_graph::{Graph, GraphBuilder, PortRef};
use cf_results::{DesignPoint, ResultStore, TopologySignature, topology_fingerprint};
use cf_solver::{BusBinding, ConnectionValues, NewtonConfig, SteadyProblem};
use tracing::{info, warn};

use crate::error::{NetworkError, NetworkResult};
use crate::mode::{Mode, ModeSpecs, offdesign_specs};
use crate::results::NetworkResults;

/// Directed connection between an outlet port and an inlet port.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionEntry {
    pub label: String,
    pub source: PortRef,
    pub target: PortRef,
    pub spec: ConnectionSpec,
}

/// Convergence data of one successful solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveReport {
    pub mode: Mode,
    pub iterations: usize,
    pub residual_norm: f64,
}

/// Last converged values, reused as start values on the same topology.
#[derive(Clone, Debug)]
struct Seed {
    fingerprint: String,
    values: Vec<ConnectionValues>,
}

/// A steady-state plant.
///
/// Values passed to `set_param` and `set_attr` are in the network's
/// [`UnitSystem`]; everything stored and reported is SI. Cloning is cheap
/// enough to give every parametric study point its own copy.
#[derive(Clone)]
pub struct Network {
    name: String,
    fluid: Arc<dyn FluidModel>,
    units: UnitSystem,
    config: NewtonConfig,
    components: Vec<Component>,
    connections: Vec<ConnectionEntry>,
    buses: Vec<Bus>,
    results: Option<NetworkResults>,
    seed: Option<Seed>,
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("name", &self.name)
            .field("fluid", &self.fluid.name())
            .field("components", &self.components.len())
            .field("connections", &self.connections.len())
            .field("buses", &self.buses.len())
            .field("solved", &self.results.is_some())
            .finish()
    }
}

impl Network {
    pub fn new(name: impl Into<String>, fluid: Arc<dyn FluidModel>) -> Self {
        Self {
            name: name.into(),
            fluid,
            units: UnitSystem::si(),
            config: NewtonConfig::default(),
            components: Vec::new(),
            connections: Vec::new(),
            buses: Vec::new(),
            results: None,
            seed: None,
        }
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &UnitSystem {
        &self.units
    }

    pub fn solver_config(&self) -> &NewtonConfig {
        &self.config
    }

    pub fn set_solver_config(&mut self, config: NewtonConfig) {
        self.config = config;
    }

    // ---- topology -------------------------------------------------------

    pub fn add_component(
        &mut self,
        label: impl Into<String>,
        kind: ComponentKind,
    ) -> NetworkResult<CompId> {
        self.add_model(label, kind.build())
    }

    pub fn add_model(&mut self, label: impl Into<String>, model: Model) -> NetworkResult<CompId> {
        let label = label.into();
        if self.components.iter().any(|c| c.label == label) {
            return Err(NetworkError::config(format!(
                "duplicate component label '{label}'"
            )));
        }
        let id = CompId::from_index(self.components.len());
        self.components.push(Component::new(label, model));
        Ok(id)
    }

    /// Connect outlet `out_port` of `from` to inlet `in_port` of `to`.
    pub fn connect(
        &mut self,
        label: impl Into<String>,
        from: &str,
        out_port: usize,
        to: &str,
        in_port: usize,
    ) -> NetworkResult<ConnId> {
        let label = label.into();
        if self.connections.iter().any(|c| c.label == label) {
            return Err(NetworkError::config(format!(
                "duplicate connection label '{label}'"
            )));
        }
        let source = PortRef::new(self.component_id(from)?, out_port);
        let target = PortRef::new(self.component_id(to)?, in_port);
        let id = ConnId::from_index(self.connections.len());
        self.connections.push(ConnectionEntry {
            label,
            source,
            target,
            spec: ConnectionSpec::default(),
        });
        Ok(id)
    }

    pub fn add_bus(&mut self, bus: Bus) -> NetworkResult<()> {
        if self.buses.iter().any(|b| b.label == bus.label) {
            return Err(NetworkError::config(format!(
                "duplicate bus label '{}'",
                bus.label
            )));
        }
        self.buses.push(bus);
        Ok(())
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn connections(&self) -> &[ConnectionEntry] {
        &self.connections
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn component(&self, label: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.label == label)
    }

    pub fn connection(&self, label: &str) -> Option<&ConnectionEntry> {
        self.connections.iter().find(|c| c.label == label)
    }

    pub fn bus(&self, label: &str) -> Option<&Bus> {
        self.buses.iter().find(|b| b.label == label)
    }

    fn component_id(&self, label: &str) -> NetworkResult<CompId> {
        self.components
            .iter()
            .position(|c| c.label == label)
            .map(CompId::from_index)
            .ok_or_else(|| NetworkError::config(format!("unknown component '{label}'")))
    }

    fn component_mut(&mut self, label: &str) -> NetworkResult<&mut Component> {
        self.components
            .iter_mut()
            .find(|c| c.label == label)
            .ok_or_else(|| NetworkError::config(format!("unknown component '{label}'")))
    }

    fn connection_mut(&mut self, label: &str) -> NetworkResult<&mut ConnectionEntry> {
        self.connections
            .iter_mut()
            .find(|c| c.label == label)
            .ok_or_else(|| NetworkError::config(format!("unknown connection '{label}'")))
    }

    // ---- specifications -------------------------------------------------

    /// Set or unset a component parameter given in user units.
    pub fn set_param(
        &mut self,
        component: &str,
        param: Param,
        value: Option<f64>,
    ) -> NetworkResult<()> {
        let si = value.map(|v| self.units.to_si(param.quantity(), v));
        let comp = self.component_mut(component)?;
        comp.set_param(param, si)
            .map_err(|e| NetworkError::config(format!("component {component}: {e}")))
    }

    /// Set or unset a connection attribute given in user units.
    pub fn set_attr(
        &mut self,
        connection: &str,
        attr: ConnAttr,
        value: Option<f64>,
    ) -> NetworkResult<()> {
        let si = value.map(|v| self.units.to_si(attr.quantity(), v));
        let entry = self.connection_mut(connection)?;
        entry
            .spec
            .set(attr, si)
            .map_err(|e| NetworkError::config(format!("connection {connection}: {e}")))
    }

    pub fn set_fluid(&mut self, connection: &str, fluid: Composition) -> NetworkResult<()> {
        self.connection_mut(connection)?.spec.fluid = Some(fluid);
        Ok(())
    }

    pub fn set_component_modes(
        &mut self,
        component: &str,
        modes: ModeSets<Param>,
    ) -> NetworkResult<()> {
        self.component_mut(component)?
            .set_modes(modes)
            .map_err(|e| NetworkError::config(format!("component {component}: {e}")))
    }

    pub fn set_connection_modes(
        &mut self,
        connection: &str,
        modes: ModeSets<ConnAttr>,
    ) -> NetworkResult<()> {
        self.connection_mut(connection)?.spec.modes = modes;
        Ok(())
    }

    /// Fix (or release) the total of a bus, in W.
    pub fn set_bus_power(&mut self, bus: &str, power: Option<f64>) -> NetworkResult<()> {
        let bus = self
            .buses
            .iter_mut()
            .find(|b| b.label == bus)
            .ok_or_else(|| NetworkError::config(format!("unknown bus '{bus}'")))?;
        bus.p = power;
        Ok(())
    }

    // ---- solving --------------------------------------------------------

    /// Topology fingerprint: component labels and kinds, connections and
    /// their ports.
    pub fn fingerprint(&self) -> String {
        let label = |id: CompId| self.components[id.index()].label.clone();
        let signature = TopologySignature {
            components: self
                .components
                .iter()
                .map(|c| (c.label.clone(), c.kind().to_string()))
                .collect(),
            connections: self
                .connections
                .iter()
                .map(|c| {
                    (
                        c.label.clone(),
                        label(c.source.comp),
                        c.source.port,
                        label(c.target.comp),
                        c.target.port,
                    )
                })
                .collect(),
        };
        topology_fingerprint(&signature)
    }

    fn build_graph(&self) -> NetworkResult<Graph> {
        let mut builder = GraphBuilder::new();
        for comp in &self.components {
            builder.add_component(
                comp.label.clone(),
                comp.model.layout(),
                comp.model.closes_cycle(),
            );
        }
        for conn in &self.connections {
            builder.connect(conn.label.clone(), conn.source, conn.target);
        }
        Ok(builder.build()?)
    }

    /// Solve the network.
    ///
    /// `Mode::Offdesign` needs the design point of this topology. Results
    /// and start values for the next solve are replaced only on success.
    pub fn solve(
        &mut self,
        mode: Mode,
        design: Option<&DesignPoint>,
    ) -> NetworkResult<SolveReport> {
        let fingerprint = self.fingerprint();
        let design = match mode {
            Mode::Design => None,
            Mode::Offdesign => {
                let design = design.ok_or_else(|| {
                    NetworkError::config("offdesign solve requires a design point")
                })?;
                if design.fingerprint != fingerprint {
                    return Err(NetworkError::config(format!(
                        "design point '{}' was saved for a different topology",
                        design.name
                    )));
                }
                Some(design)
            }
        };

        let graph = self.build_graph()?;
        let connections: Vec<ConnectionSpec> =
            self.connections.iter().map(|c| c.spec.clone()).collect();
        let specs = match design {
            None => ModeSpecs {
                components: self.components.clone(),
                connections,
                buses: self.buses.clone(),
            },
            Some(design) => {
                offdesign_specs(&graph, &self.components, &connections, &self.buses, design)?
            }
        };

        let bindings = specs
            .buses
            .iter()
            .map(|bus| -> NetworkResult<BusBinding<'_>> {
                let members = bus
                    .members
                    .iter()
                    .map(|m| {
                        graph.find_component(&m.component).ok_or_else(|| {
                            NetworkError::config(format!(
                                "bus {}: unknown component '{}'",
                                bus.label, m.component
                            ))
                        })
                    })
                    .collect::<NetworkResult<Vec<_>>>()?;
                Ok(BusBinding { bus, members })
            })
            .collect::<NetworkResult<Vec<_>>>()?;

        let models: Vec<&dyn ComponentModel> = specs
            .components
            .iter()
            .map(|c| &c.model as &dyn ComponentModel)
            .collect();
        let problem = SteadyProblem::new(
            &graph,
            self.fluid.as_ref(),
            models,
            &specs.connections,
            bindings,
        )?;

        let start = self.start_values(mode, &fingerprint, design);
        let solution = match cf_solver::solve(&problem, &self.config, start.as_deref()) {
            Ok(solution) => solution,
            Err(e) => {
                warn!(network = %self.name, %mode, error = %e, "solve failed");
                return Err(e.into());
            }
        };
        let results = NetworkResults::collect(&problem, &solution, mode, fingerprint.clone())?;

        let report = SolveReport {
            mode,
            iterations: solution.iterations,
            residual_norm: solution.residual_norm,
        };
        info!(
            network = %self.name,
            %mode,
            iterations = report.iterations,
            residual_norm = report.residual_norm,
            "network solved"
        );
        self.results = Some(results);
        self.seed = Some(Seed {
            fingerprint,
            values: solution.values,
        });
        Ok(report)
    }

    /// Previous solution on this topology, else the design point values
    /// for offdesign runs.
    fn start_values(
        &self,
        mode: Mode,
        fingerprint: &str,
        design: Option<&DesignPoint>,
    ) -> Option<Vec<ConnectionValues>> {
        if let Some(seed) = self.seed.as_ref().filter(|s| s.fingerprint == fingerprint) {
            return Some(seed.values.clone());
        }
        match (mode, design) {
            (Mode::Offdesign, Some(design)) => self
                .connections
                .iter()
                .map(|c| {
                    design.connection(&c.label).map(|r| ConnectionValues {
                        m: r.m_kg_s,
                        p: r.p_pa,
                        h: r.h_j_per_kg,
                    })
                })
                .collect(),
            _ => None,
        }
    }

    /// Use another network's last solution as start values, when both share
    /// a topology.
    pub fn seed_from(&mut self, other: &Network) {
        if let Some(seed) = &other.seed {
            if seed.fingerprint == self.fingerprint() {
                self.seed = Some(seed.clone());
            }
        }
    }

    /// Forget start values; the next solve initializes from scratch.
    pub fn clear_seed(&mut self) {
        self.seed = None;
    }

    pub fn results(&self) -> Option<&NetworkResults> {
        self.results.as_ref()
    }

    // ---- design points --------------------------------------------------

    /// Design point from the last converged design solve.
    pub fn design_point(&self, name: &str) -> NetworkResult<DesignPoint> {
        let results = self
            .results
            .as_ref()
            .filter(|r| r.mode == Mode::Design)
            .ok_or_else(|| {
                NetworkError::config(format!(
                    "network '{}' has no converged design solution",
                    self.name
                ))
            })?;
        Ok(results.design_point(name, chrono::Utc::now().to_rfc3339()))
    }

    /// Save the last design solution under `name`.
    pub fn save_design(&self, store: &ResultStore, name: &str) -> NetworkResult<PathBuf> {
        let design = self.design_point(name)?;
        let path = store.save_design(&design)?;
        info!(design = name, path = %path.display(), "design point saved");
        Ok(path)
    }

    pub fn load_design(store: &ResultStore, name: &str) -> NetworkResult<DesignPoint> {
        Ok(store.load_design(name)?)
    }
}
