//! Solve and study execution service.

use std::path::{Path, PathBuf};
use std::time::Instant;

use cf_core::units::UnitSystem;
use cf_network::{Mode, Network, NetworkResults, SolveReport};
use cf_project::schema::Plant;
use cf_results::{DesignPoint, ResultStore, StudyManifest, StudyRecord};
use tracing::info;

use crate::compile::{build_fluid_model, compile_plant};
use crate::error::{AppError, AppResult};
use crate::progress::{RunProgressEvent, RunStage, StudyProgress};
use crate::project_service::load_plant;
use crate::study::{StudyPlan, run_study};

type ProgressCallback<'a> = Option<&'a mut dyn FnMut(RunProgressEvent)>;

/// Request to solve a plant file.
#[derive(Debug, Clone)]
pub struct SolveRequest<'a> {
    pub plant_path: &'a Path,
    /// Solve offdesign against this stored design point.
    pub offdesign: Option<&'a str>,
    /// Save the design solution under this name; defaults to the plant's
    /// `design_point`.
    pub save: Option<&'a str>,
    /// Store directory; defaults to `.cycleflow/` next to the plant file.
    pub store_dir: Option<&'a Path>,
}

#[derive(Debug, Clone)]
pub struct SolveResponse {
    pub plant: String,
    pub units: UnitSystem,
    pub report: SolveReport,
    pub results: NetworkResults,
    pub saved_design: Option<PathBuf>,
    pub total_time_s: f64,
}

/// Request to run the studies of a plant file.
#[derive(Debug, Clone)]
pub struct StudyRequest<'a> {
    pub plant_path: &'a Path,
    /// Run only this study.
    pub study: Option<&'a str>,
    pub store_dir: Option<&'a Path>,
}

#[derive(Debug, Clone)]
pub struct StudyOutcome {
    pub manifest: StudyManifest,
    pub records: Vec<StudyRecord>,
    pub path: PathBuf,
}

impl StudyOutcome {
    pub fn converged(&self) -> usize {
        self.records.iter().filter(|r| r.converged).count()
    }
}

#[derive(Debug, Clone)]
pub struct StudyResponse {
    pub plant: String,
    pub studies: Vec<StudyOutcome>,
    pub total_time_s: f64,
}

fn emit_progress(
    progress_cb: &mut ProgressCallback<'_>,
    mode: Mode,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            mode,
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Result store for a plant, or at an explicit directory.
pub fn open_store(plant_path: &Path, store_dir: Option<&Path>) -> AppResult<ResultStore> {
    Ok(match store_dir {
        Some(dir) => ResultStore::new(dir.to_path_buf())?,
        None => ResultStore::for_plant(plant_path)?,
    })
}

/// Names of the design points in a store directory.
pub fn list_designs(store_dir: &Path) -> AppResult<Vec<String>> {
    Ok(ResultStore::new(store_dir.to_path_buf())?.list_designs()?)
}

fn compile(
    plant_path: &Path,
    mode: Mode,
    started: Instant,
    progress_cb: &mut ProgressCallback<'_>,
) -> AppResult<(Plant, Network)> {
    emit_progress(progress_cb, mode, RunStage::LoadingPlant, started, None);
    let plant = load_plant(plant_path)?;
    emit_progress(progress_cb, mode, RunStage::CompilingNetwork, started, None);
    let net = compile_plant(&plant, build_fluid_model())?;
    Ok((plant, net))
}

pub fn solve_plant(request: &SolveRequest) -> AppResult<SolveResponse> {
    solve_plant_with_progress(request, None)
}

/// Solve a plant file in design or offdesign mode and stream progress.
pub fn solve_plant_with_progress(
    request: &SolveRequest,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<SolveResponse> {
    let started = Instant::now();
    let mode = if request.offdesign.is_some() {
        Mode::Offdesign
    } else {
        Mode::Design
    };
    let (plant, mut net) = compile(request.plant_path, mode, started, &mut progress_cb)?;
    let store = open_store(request.plant_path, request.store_dir)?;

    let design = match request.offdesign {
        Some(name) => {
            emit_progress(
                &mut progress_cb,
                mode,
                RunStage::LoadingDesign,
                started,
                Some(name.to_string()),
            );
            Some(Network::load_design(&store, name)?)
        }
        None => None,
    };

    emit_progress(&mut progress_cb, mode, RunStage::Solving, started, None);
    let report = net.solve(mode, design.as_ref())?;

    let save = match mode {
        Mode::Design => request.save.or(plant.design_point.as_deref()),
        Mode::Offdesign => None,
    };
    let saved_design = match save {
        Some(name) => {
            emit_progress(
                &mut progress_cb,
                mode,
                RunStage::SavingDesign,
                started,
                Some(name.to_string()),
            );
            Some(net.save_design(&store, name)?)
        }
        None => None,
    };

    let results = net
        .results()
        .cloned()
        .ok_or_else(|| AppError::Results("solve produced no results".to_string()))?;
    emit_progress(&mut progress_cb, mode, RunStage::Completed, started, None);
    Ok(SolveResponse {
        plant: plant.name,
        units: *net.units(),
        report,
        results,
        saved_design,
        total_time_s: started.elapsed().as_secs_f64(),
    })
}

pub fn run_studies(request: &StudyRequest) -> AppResult<StudyResponse> {
    run_studies_with_progress(request, None)
}

/// Solve the design case, then run the plant's studies on it.
///
/// Offdesign studies use the design point of that base solve. Each study
/// is saved to the store as it finishes.
pub fn run_studies_with_progress(
    request: &StudyRequest,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<StudyResponse> {
    let started = Instant::now();
    let (plant, mut base) = compile(request.plant_path, Mode::Design, started, &mut progress_cb)?;

    let defs: Vec<_> = match request.study {
        Some(name) => {
            let def = plant
                .studies
                .iter()
                .find(|s| s.name == name)
                .ok_or_else(|| AppError::StudyNotFound(name.to_string()))?;
            vec![def]
        }
        None => plant.studies.iter().collect(),
    };
    let plans = defs
        .into_iter()
        .map(StudyPlan::from_def)
        .collect::<AppResult<Vec<_>>>()?;
    let store = open_store(request.plant_path, request.store_dir)?;

    emit_progress(&mut progress_cb, Mode::Design, RunStage::Solving, started, None);
    base.solve(Mode::Design, None)?;
    let design_name = plant.design_point.clone().unwrap_or_else(|| plant.name.clone());
    let design: Option<DesignPoint> = if plans.iter().any(|p| p.mode == Mode::Offdesign) {
        Some(base.design_point(&design_name)?)
    } else {
        None
    };
    if plant.design_point.is_some() {
        emit_progress(
            &mut progress_cb,
            Mode::Design,
            RunStage::SavingDesign,
            started,
            Some(design_name.clone()),
        );
        base.save_design(&store, &design_name)?;
    }

    let mut studies = Vec::with_capacity(plans.len());
    for plan in &plans {
        emit_progress(
            &mut progress_cb,
            plan.mode,
            RunStage::RunningStudy,
            started,
            Some(plan.name.clone()),
        );
        let points = plan.values.len();
        let records = run_study(&base, plan, design.as_ref(), |record| {
            if let Some(cb) = progress_cb.as_deref_mut() {
                cb(RunProgressEvent {
                    mode: plan.mode,
                    stage: RunStage::RunningStudy,
                    elapsed_wall_s: started.elapsed().as_secs_f64(),
                    message: record.error.clone(),
                    study: Some(StudyProgress {
                        study: plan.name.clone(),
                        index: record.index,
                        points,
                        value: record.value,
                        converged: record.converged,
                    }),
                });
            }
        })?;

        emit_progress(
            &mut progress_cb,
            plan.mode,
            RunStage::SavingStudy,
            started,
            Some(plan.name.clone()),
        );
        let manifest = StudyManifest {
            name: plan.name.clone(),
            plant: plant.name.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            variable: plan.variable.name(),
            values: plan.values.clone(),
        };
        let path = store.save_study(&manifest, &records)?;
        let outcome = StudyOutcome {
            manifest,
            records,
            path,
        };
        info!(
            study = %plan.name,
            points,
            converged = outcome.converged(),
            "study finished"
        );
        studies.push(outcome);
    }

    emit_progress(&mut progress_cb, Mode::Design, RunStage::Completed, started, None);
    Ok(StudyResponse {
        plant: plant.name,
        studies,
        total_time_s: started.elapsed().as_secs_f64(),
    })
}

/// Load a saved study.
pub fn load_study(
    plant_path: &Path,
    store_dir: Option<&Path>,
    name: &str,
) -> AppResult<(StudyManifest, Vec<StudyRecord>)> {
    Ok(open_store(plant_path, store_dir)?.load_study(name)?)
}
