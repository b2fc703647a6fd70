//! Plant loading, saving and introspection.

use std::path::Path;

use cf_project::schema::Plant;

use crate::error::{AppError, AppResult};

/// Summary of a plant for listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantSummary {
    pub name: String,
    pub component_count: usize,
    pub connection_count: usize,
    pub bus_count: usize,
    pub studies: Vec<String>,
    pub design_point: Option<String>,
}

/// Load and validate a plant from a YAML or JSON file.
pub fn load_plant(path: &Path) -> AppResult<Plant> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::PlantFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(cf_project::load_json(path)?)
    } else {
        Ok(cf_project::parse_yaml(&content)?)
    }
}

/// Save a plant as YAML.
pub fn save_plant(path: &Path, plant: &Plant) -> AppResult<()> {
    cf_project::save_yaml(path, plant)?;
    Ok(())
}

pub fn summarize(plant: &Plant) -> PlantSummary {
    PlantSummary {
        name: plant.name.clone(),
        component_count: plant.components.len(),
        connection_count: plant.connections.len(),
        bus_count: plant.buses.len(),
        studies: plant.studies.iter().map(|s| s.name.clone()).collect(),
        design_point: plant.design_point.clone(),
    }
}
