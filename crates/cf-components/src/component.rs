//! Labelled component instances and their design/offdesign switching.

use std::fmt;
use std::str::FromStr;

use cf_fluids::FluidModel;
use cf_graph::PortLayout;

use crate::cycle_closer::CycleCloser;
use crate::design::ComponentDesign;
use crate::equation::Equations;
use crate::error::{ComponentError, ComponentResult};
use crate::heat_exchanger::HeatExchanger;
use crate::param::{ModeSets, Param, ParamValues};
use crate::pump::Pump;
use crate::simple_heat_exchanger::SimpleHeatExchanger;
use crate::source_sink::{Sink, Source};
use crate::traits::{ComponentModel, GuessContext, PortStreams, PressureRelation};
use crate::turbine::{ConeReference, Turbine};

/// Component type names accepted in plant files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Source,
    Sink,
    CycleCloser,
    Turbine,
    Pump,
    SimpleHeatExchanger,
    HeatExchanger,
    Condenser,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 8] = [
        ComponentKind::Source,
        ComponentKind::Sink,
        ComponentKind::CycleCloser,
        ComponentKind::Turbine,
        ComponentKind::Pump,
        ComponentKind::SimpleHeatExchanger,
        ComponentKind::HeatExchanger,
        ComponentKind::Condenser,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Source => "Source",
            ComponentKind::Sink => "Sink",
            ComponentKind::CycleCloser => "CycleCloser",
            ComponentKind::Turbine => "Turbine",
            ComponentKind::Pump => "Pump",
            ComponentKind::SimpleHeatExchanger => "SimpleHeatExchanger",
            ComponentKind::HeatExchanger => "HeatExchanger",
            ComponentKind::Condenser => "Condenser",
        }
    }

    pub fn build(&self) -> Model {
        match self {
            ComponentKind::Source => Model::Source(Source),
            ComponentKind::Sink => Model::Sink(Sink),
            ComponentKind::CycleCloser => Model::CycleCloser(CycleCloser),
            ComponentKind::Turbine => Model::Turbine(Turbine::new()),
            ComponentKind::Pump => Model::Pump(Pump::new()),
            ComponentKind::SimpleHeatExchanger => {
                Model::SimpleHeatExchanger(SimpleHeatExchanger::new())
            }
            ComponentKind::HeatExchanger => Model::HeatExchanger(HeatExchanger::new()),
            ComponentKind::Condenser => Model::HeatExchanger(HeatExchanger::condenser()),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComponentKind {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let kind = match key.as_str() {
            "source" => ComponentKind::Source,
            "sink" => ComponentKind::Sink,
            "cyclecloser" => ComponentKind::CycleCloser,
            "turbine" => ComponentKind::Turbine,
            "pump" => ComponentKind::Pump,
            "simpleheatexchanger" | "heatexchangersimple" | "boiler" => {
                ComponentKind::SimpleHeatExchanger
            }
            "heatexchanger" => ComponentKind::HeatExchanger,
            "condenser" => ComponentKind::Condenser,
            _ => {
                return Err(ComponentError::InvalidArg {
                    what: format!("unknown component type '{s}'"),
                });
            }
        };
        Ok(kind)
    }
}

/// Closed set of built-in component models.
#[derive(Debug, Clone)]
pub enum Model {
    Source(Source),
    Sink(Sink),
    CycleCloser(CycleCloser),
    Turbine(Turbine),
    Pump(Pump),
    SimpleHeatExchanger(SimpleHeatExchanger),
    HeatExchanger(HeatExchanger),
}

macro_rules! dispatch {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            Model::Source($m) => $body,
            Model::Sink($m) => $body,
            Model::CycleCloser($m) => $body,
            Model::Turbine($m) => $body,
            Model::Pump($m) => $body,
            Model::SimpleHeatExchanger($m) => $body,
            Model::HeatExchanger($m) => $body,
        }
    };
}

impl ComponentModel for Model {
    fn kind(&self) -> &'static str {
        dispatch!(self, m => m.kind())
    }

    fn layout(&self) -> PortLayout {
        dispatch!(self, m => m.layout())
    }

    fn closes_cycle(&self) -> bool {
        dispatch!(self, m => m.closes_cycle())
    }

    fn equation_count(&self) -> usize {
        dispatch!(self, m => m.equation_count())
    }

    fn residuals(
        &self,
        fluid: &dyn FluidModel,
        ports: &PortStreams<'_>,
        eqs: &mut Equations,
    ) -> ComponentResult<()> {
        dispatch!(self, m => m.residuals(fluid, ports, eqs))
    }

    fn results(
        &self,
        fluid: &dyn FluidModel,
        ports: &PortStreams<'_>,
    ) -> ComponentResult<ParamValues> {
        dispatch!(self, m => m.results(fluid, ports))
    }

    fn supports_bus(&self) -> bool {
        dispatch!(self, m => m.supports_bus())
    }

    fn bus_value(&self, ports: &PortStreams<'_>) -> Option<f64> {
        dispatch!(self, m => m.bus_value(ports))
    }

    fn pressure_relation(&self, pass: usize) -> Option<PressureRelation> {
        dispatch!(self, m => m.pressure_relation(pass))
    }

    fn enthalpy_equal(&self, pass: usize) -> bool {
        dispatch!(self, m => m.enthalpy_equal(pass))
    }

    fn hint(&self, fluid: &dyn FluidModel, ctx: &mut GuessContext<'_>) {
        dispatch!(self, m => m.hint(fluid, ctx))
    }

    fn accepts(&self) -> &'static [Param] {
        dispatch!(self, m => m.accepts())
    }

    fn params(&self) -> ParamValues {
        dispatch!(self, m => m.params())
    }

    fn set_param(&mut self, param: Param, value: Option<f64>) -> ComponentResult<()> {
        dispatch!(self, m => m.set_param(param, value))
    }
}

/// A labelled component in a plant.
#[derive(Debug, Clone)]
pub struct Component {
    pub label: String,
    pub model: Model,
    modes: ModeSets<Param>,
}

impl Component {
    pub fn new(label: impl Into<String>, model: Model) -> Self {
        Self {
            label: label.into(),
            model,
            modes: ModeSets::default(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.model.kind()
    }

    pub fn set_param(&mut self, param: Param, value: Option<f64>) -> ComponentResult<()> {
        self.model.set_param(param, value)
    }

    pub fn param(&self, param: Param) -> Option<f64> {
        self.model.param(param)
    }

    pub fn modes(&self) -> &ModeSets<Param> {
        &self.modes
    }

    pub fn set_modes(&mut self, modes: ModeSets<Param>) -> ComponentResult<()> {
        let accepts = self.model.accepts();
        if let Some(bad) = modes
            .design
            .iter()
            .chain(&modes.offdesign)
            .find(|p| !accepts.contains(p))
        {
            return Err(ComponentError::UnknownParam {
                kind: self.model.kind(),
                param: bad.key().to_string(),
            });
        }
        if modes.design.contains(&Param::Cone) {
            return Err(ComponentError::InvalidArg {
                what: "the cone law can only be an offdesign parameter".into(),
            });
        }
        self.modes = modes;
        Ok(())
    }

    /// Copy prepared for an offdesign run against `design`.
    pub fn offdesign(&self, design: &ComponentDesign) -> ComponentResult<Component> {
        let mut out = self.clone();
        for &param in &self.modes.design {
            out.model.set_param(param, None)?;
        }
        for &param in &self.modes.offdesign {
            if param == Param::Cone {
                out.apply_cone(design)?;
                continue;
            }
            let value = design.params.get(&param).copied().ok_or_else(|| {
                ComponentError::MissingDesignValue {
                    param: param.key().to_string(),
                }
            })?;
            out.model.set_param(param, Some(value))?;
        }
        Ok(out)
    }

    fn apply_cone(&mut self, design: &ComponentDesign) -> ComponentResult<()> {
        let Model::Turbine(turbine) = &mut self.model else {
            return Err(ComponentError::UnknownParam {
                kind: self.model.kind(),
                param: Param::Cone.key().to_string(),
            });
        };
        let (Some(inlet), Some(outlet)) = (design.inlets.first(), design.outlets.first()) else {
            return Err(ComponentError::MissingDesignValue {
                param: "cone reference streams".into(),
            });
        };
        turbine.set_cone(Some(ConeReference {
            m: inlet.m,
            p_in: inlet.p,
            v_in: inlet.v,
            pr: outlet.p / inlet.p,
        }))
    }
}
