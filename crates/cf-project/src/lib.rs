//! cf-project: plant file format and validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{LATEST_VERSION, ValidationError, validate_plant};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_yaml(content: &str) -> ProjectResult<Plant> {
    let plant: Plant = serde_yaml::from_str(content)?;
    validate_plant(&plant)?;
    Ok(plant)
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Plant> {
    parse_yaml(&std::fs::read_to_string(path)?)
}

pub fn save_yaml(path: &std::path::Path, plant: &Plant) -> ProjectResult<()> {
    validate_plant(plant)?;
    let content = serde_yaml::to_string(plant)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<Plant> {
    let content = std::fs::read_to_string(path)?;
    let plant: Plant = serde_json::from_str(&content)?;
    validate_plant(&plant)?;
    Ok(plant)
}

pub fn save_json(path: &std::path::Path, plant: &Plant) -> ProjectResult<()> {
    validate_plant(plant)?;
    let content = serde_json::to_string_pretty(plant)?;
    std::fs::write(path, content)?;
    Ok(())
}
