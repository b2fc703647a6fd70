//! Plant file validation.
//!
//! Checks everything that can be decided without solving: unique labels,
//! references, component types, parameter and attribute names, and value
//! ranges.

use std::collections::HashSet;

use cf_components::{ComponentKind, ComponentModel, ConnAttr, Param};
use cf_fluids::Composition;

use crate::schema::{BusDef, ComponentDef, ConnectionDef, Plant, StudyDef, ValuesDef, VariableDef};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate label: {label} in {context}")]
    DuplicateLabel { label: String, context: String },

    #[error("Missing reference: {label} in {context}")]
    MissingReference { label: String, context: String },

    #[error("Unknown {what}: '{name}' in {context}")]
    Unknown {
        what: &'static str,
        name: String,
        context: String,
    },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_plant(plant: &Plant) -> Result<(), ValidationError> {
    if plant.version == 0 || plant.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: plant.version,
        });
    }
    validate_solver(plant)?;

    let mut component_labels = HashSet::new();
    for component in &plant.components {
        if !component_labels.insert(component.label.as_str()) {
            return Err(ValidationError::DuplicateLabel {
                label: component.label.clone(),
                context: "components".to_string(),
            });
        }
        validate_component(component)?;
    }

    let mut connection_labels = HashSet::new();
    for connection in &plant.connections {
        if !connection_labels.insert(connection.label.as_str()) {
            return Err(ValidationError::DuplicateLabel {
                label: connection.label.clone(),
                context: "connections".to_string(),
            });
        }
        validate_connection(connection, &component_labels)?;
    }

    let mut bus_labels = HashSet::new();
    for bus in &plant.buses {
        if !bus_labels.insert(bus.label.as_str()) {
            return Err(ValidationError::DuplicateLabel {
                label: bus.label.clone(),
                context: "buses".to_string(),
            });
        }
        validate_bus(bus, &component_labels)?;
    }

    let labels = Labels {
        components: &component_labels,
        connections: &connection_labels,
        buses: &bus_labels,
        plant,
    };
    let mut study_names = HashSet::new();
    for study in &plant.studies {
        if !study_names.insert(study.name.as_str()) {
            return Err(ValidationError::DuplicateLabel {
                label: study.name.clone(),
                context: "studies".to_string(),
            });
        }
        validate_study(study, &labels)?;
    }

    if let Some(name) = &plant.design_point {
        check_store_name(name, "design_point")?;
    }
    Ok(())
}

struct Labels<'a> {
    components: &'a HashSet<&'a str>,
    connections: &'a HashSet<&'a str>,
    buses: &'a HashSet<&'a str>,
    plant: &'a Plant,
}

fn validate_solver(plant: &Plant) -> Result<(), ValidationError> {
    let s = &plant.solver;
    let checks = [
        ("solver.tolerance", s.tolerance, s.tolerance > 0.0),
        ("solver.min_pressure_pa", s.min_pressure_pa, s.min_pressure_pa > 0.0),
        (
            "solver.line_search_beta",
            s.line_search_beta,
            s.line_search_beta > 0.0 && s.line_search_beta < 1.0,
        ),
        ("solver.fd_epsilon", s.fd_epsilon, s.fd_epsilon > 0.0),
    ];
    for (field, value, ok) in checks {
        if !ok || !value.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
                reason: "out of range".to_string(),
            });
        }
    }
    if s.max_iterations == 0 {
        return Err(ValidationError::InvalidValue {
            field: "solver.max_iterations".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn component_kind(def: &ComponentDef) -> Result<ComponentKind, ValidationError> {
    def.kind
        .parse::<ComponentKind>()
        .map_err(|_| ValidationError::Unknown {
            what: "component type",
            name: def.kind.clone(),
            context: format!("component '{}'", def.label),
        })
}

fn parse_param(name: &str, context: impl Fn() -> String) -> Result<Param, ValidationError> {
    name.parse::<Param>().map_err(|_| ValidationError::Unknown {
        what: "parameter",
        name: name.to_string(),
        context: context(),
    })
}

fn parse_attr(name: &str, context: impl Fn() -> String) -> Result<ConnAttr, ValidationError> {
    name.parse::<ConnAttr>().map_err(|_| ValidationError::Unknown {
        what: "connection attribute",
        name: name.to_string(),
        context: context(),
    })
}

fn validate_component(def: &ComponentDef) -> Result<(), ValidationError> {
    let kind = component_kind(def)?;
    let accepts = kind.build().accepts();
    let context = || format!("component '{}'", def.label);

    for name in def.params.keys().chain(&def.design).chain(&def.offdesign) {
        let param = parse_param(name, context)?;
        if !accepts.contains(&param) {
            return Err(ValidationError::Unknown {
                what: "parameter",
                name: name.clone(),
                context: format!("{} component '{}'", kind, def.label),
            });
        }
    }
    if let Some(both) = def.design.iter().find(|d| def.offdesign.contains(d)) {
        return Err(ValidationError::InvalidValue {
            field: format!("component '{}' modes", def.label),
            value: both.clone(),
            reason: "listed as both design and offdesign".to_string(),
        });
    }
    for (name, value) in &def.params {
        if !value.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: format!("{}.{name}", def.label),
                value: value.to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_connection(
    def: &ConnectionDef,
    components: &HashSet<&str>,
) -> Result<(), ValidationError> {
    for (end, port) in [("from", &def.from), ("to", &def.to)] {
        if !components.contains(port.component.as_str()) {
            return Err(ValidationError::MissingReference {
                label: port.component.clone(),
                context: format!("connection '{}' {end}", def.label),
            });
        }
    }
    let context = || format!("connection '{}'", def.label);
    for name in def.design.iter().chain(&def.offdesign) {
        parse_attr(name, context)?;
    }
    if let Some(fluid) = &def.fluid {
        Composition::from_named(fluid).map_err(|e| ValidationError::InvalidValue {
            field: format!("connection '{}' fluid", def.label),
            value: format!("{fluid:?}"),
            reason: e.to_string(),
        })?;
    }
    if let (Some(_), Some(_)) = (def.state.t, def.state.x) {
        return Err(ValidationError::InvalidValue {
            field: format!("connection '{}'", def.label),
            value: "T and x".to_string(),
            reason: "temperature and quality cannot both be set".to_string(),
        });
    }
    if let Some(x) = def.state.x {
        if !(0.0..=1.0).contains(&x) {
            return Err(ValidationError::InvalidValue {
                field: format!("connection '{}' x", def.label),
                value: x.to_string(),
                reason: "quality must be within [0, 1]".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_bus(def: &BusDef, components: &HashSet<&str>) -> Result<(), ValidationError> {
    if def.members.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("bus '{}'", def.label),
            value: "[]".to_string(),
            reason: "a bus needs at least one member".to_string(),
        });
    }
    let mut seen = HashSet::new();
    for member in &def.members {
        if !components.contains(member.component.as_str()) {
            return Err(ValidationError::MissingReference {
                label: member.component.clone(),
                context: format!("bus '{}'", def.label),
            });
        }
        if !seen.insert(member.component.as_str()) {
            return Err(ValidationError::DuplicateLabel {
                label: member.component.clone(),
                context: format!("bus '{}' members", def.label),
            });
        }
        match (&member.efficiency, &member.characteristic) {
            (Some(_), Some(_)) => {
                return Err(ValidationError::InvalidValue {
                    field: format!("bus '{}' member '{}'", def.label, member.component),
                    value: "efficiency and characteristic".to_string(),
                    reason: "give one of them".to_string(),
                });
            }
            (Some(eta), None) if !(*eta > 0.0 && eta.is_finite()) => {
                return Err(ValidationError::InvalidValue {
                    field: format!("bus '{}' member '{}' efficiency", def.label, member.component),
                    value: eta.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_variable(
    variable: &VariableDef,
    labels: &Labels<'_>,
    study: &str,
) -> Result<(), ValidationError> {
    let context = || format!("study '{study}'");
    match variable {
        VariableDef::Connection { label, attr } => {
            if !labels.connections.contains(label.as_str()) {
                return Err(ValidationError::MissingReference {
                    label: label.clone(),
                    context: context(),
                });
            }
            parse_attr(attr, context)?;
        }
        VariableDef::Component { label, param } => {
            let Some(def) = labels.plant.components.iter().find(|c| &c.label == label) else {
                return Err(ValidationError::MissingReference {
                    label: label.clone(),
                    context: context(),
                });
            };
            let p = parse_param(param, context)?;
            if !component_kind(def)?.build().accepts().contains(&p) {
                return Err(ValidationError::Unknown {
                    what: "parameter",
                    name: param.clone(),
                    context: context(),
                });
            }
        }
        VariableDef::BusPower { label } => {
            if !labels.buses.contains(label.as_str()) {
                return Err(ValidationError::MissingReference {
                    label: label.clone(),
                    context: context(),
                });
            }
        }
    }
    Ok(())
}

fn validate_study(study: &StudyDef, labels: &Labels<'_>) -> Result<(), ValidationError> {
    check_store_name(&study.name, "study name")?;
    validate_variable(&study.variable, labels, &study.name)?;
    for released in &study.release {
        validate_variable(released, labels, &study.name)?;
    }
    for link in &study.linked {
        validate_variable(&link.variable, labels, &study.name)?;
        let field = || format!("study '{}' linked {}", study.name, link.variable.name());
        if !link.offset.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: field(),
                value: link.offset.to_string(),
                reason: "offset must be finite".to_string(),
            });
        }
        if link.variable == study.variable || study.release.contains(&link.variable) {
            return Err(ValidationError::InvalidValue {
                field: field(),
                value: link.variable.name(),
                reason: "already swept or released by the study".to_string(),
            });
        }
    }

    match &study.values {
        ValuesDef::List(values) if values.is_empty() => {
            return Err(ValidationError::InvalidValue {
                field: format!("study '{}' values", study.name),
                value: "[]".to_string(),
                reason: "no values to sweep".to_string(),
            });
        }
        ValuesDef::Range { start, end, points, spacing } => {
            if *points == 0 || !start.is_finite() || !end.is_finite() {
                return Err(ValidationError::InvalidValue {
                    field: format!("study '{}' values", study.name),
                    value: format!("{start}..{end} ({points} points)"),
                    reason: "needs finite bounds and at least one point".to_string(),
                });
            }
            if *spacing == crate::schema::SpacingDef::Log && (*start <= 0.0 || *end <= 0.0) {
                return Err(ValidationError::InvalidValue {
                    field: format!("study '{}' values", study.name),
                    value: format!("{start}..{end}"),
                    reason: "logarithmic spacing needs positive bounds".to_string(),
                });
            }
        }
        ValuesDef::List(_) => {}
    }

    if let Some(bus) = &study.outputs.bus {
        if !labels.buses.contains(bus.as_str()) {
            return Err(ValidationError::MissingReference {
                label: bus.clone(),
                context: format!("study '{}' outputs", study.name),
            });
        }
    }
    if let Some(heat) = &study.outputs.heat_input {
        if !labels.components.contains(heat.as_str()) {
            return Err(ValidationError::MissingReference {
                label: heat.clone(),
                context: format!("study '{}' outputs", study.name),
            });
        }
    }
    Ok(())
}

/// Names end up as directory names in the result store.
fn check_store_name(name: &str, field: &str) -> Result<(), ValidationError> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && name != "."
        && name != "..";
    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: name.to_string(),
            reason: "use letters, digits, '-', '_' or '.'".to_string(),
        })
    }
}
