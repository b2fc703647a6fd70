//! Design point and study storage.
//!
//! Layout under the store root:
//!
//! ```text
//! designs/<name>/design.json
//! studies/<name>/manifest.json
//! studies/<name>/points.jsonl
//! ```

use crate::types::{DesignPoint, StudyManifest, StudyRecord};
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct ResultStore {
    root_dir: PathBuf,
}

fn check_name(name: &str) -> ResultsResult<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ResultsError::InvalidName {
            name: name.to_string(),
        })
    }
}

impl ResultStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store next to a plant file, in `.cycleflow/`.
    pub fn for_plant(plant_path: &Path) -> ResultsResult<Self> {
        let dir = plant_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join(".cycleflow"))
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn design_dir(&self, name: &str) -> PathBuf {
        self.root_dir.join("designs").join(name)
    }

    fn study_dir(&self, name: &str) -> PathBuf {
        self.root_dir.join("studies").join(name)
    }

    pub fn has_design(&self, name: &str) -> bool {
        check_name(name).is_ok() && self.design_dir(name).join("design.json").exists()
    }

    /// Save a design point, replacing any previous one of the same name.
    pub fn save_design(&self, design: &DesignPoint) -> ResultsResult<PathBuf> {
        check_name(&design.name)?;
        let dir = self.design_dir(&design.name);
        fs::create_dir_all(&dir)?;

        let path = dir.join("design.json");
        let tmp = dir.join("design.json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(design)?)?;
        fs::rename(&tmp, &path)?;
        Ok(path)
    }

    pub fn load_design(&self, name: &str) -> ResultsResult<DesignPoint> {
        check_name(name)?;
        let path = self.design_dir(name).join("design.json");
        if !path.exists() {
            return Err(ResultsError::DesignNotFound {
                name: name.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Names of saved design points, sorted.
    pub fn list_designs(&self) -> ResultsResult<Vec<String>> {
        let dir = self.root_dir.join("designs");
        let mut names = Vec::new();
        if !dir.exists() {
            return Ok(names);
        }
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.path().join("design.json").exists() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete_design(&self, name: &str) -> ResultsResult<()> {
        check_name(name)?;
        let dir = self.design_dir(name);
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn save_study(
        &self,
        manifest: &StudyManifest,
        records: &[StudyRecord],
    ) -> ResultsResult<PathBuf> {
        check_name(&manifest.name)?;
        let dir = self.study_dir(&manifest.name);
        fs::create_dir_all(&dir)?;

        fs::write(
            dir.join("manifest.json"),
            serde_json::to_string_pretty(manifest)?,
        )?;

        let mut content = String::new();
        for record in records {
            content.push_str(&serde_json::to_string(record)?);
            content.push('\n');
        }
        fs::write(dir.join("points.jsonl"), content)?;
        Ok(dir)
    }

    pub fn load_study(&self, name: &str) -> ResultsResult<(StudyManifest, Vec<StudyRecord>)> {
        check_name(name)?;
        let dir = self.study_dir(name);
        let manifest_path = dir.join("manifest.json");
        if !manifest_path.exists() {
            return Err(ResultsError::StudyNotFound {
                name: name.to_string(),
            });
        }
        let manifest = serde_json::from_str(&fs::read_to_string(manifest_path)?)?;

        let mut records = Vec::new();
        let points = dir.join("points.jsonl");
        if points.exists() {
            for line in fs::read_to_string(points)?.lines() {
                if !line.trim().is_empty() {
                    records.push(serde_json::from_str(line)?);
                }
            }
        }
        Ok((manifest, records))
    }
}
