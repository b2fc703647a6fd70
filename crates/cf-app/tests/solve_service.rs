//! Plant files through the run service: solve, save, offdesign, studies.

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use cf_app::{
    AppError, RunProgressEvent, RunStage, SolveRequest, StudyRequest, connection_table,
    list_designs, load_study, run_studies, run_studies_with_progress, solve_plant,
    solve_plant_with_progress, study_table,
};
use cf_network::Mode;

const RANKINE: &str = "../../plants/rankine.yaml";

fn store_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cf-app-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn design_solve_saves_the_plant_design_point() {
    let store = store_dir("design");
    let mut events: Vec<RunProgressEvent> = Vec::new();
    let response = solve_plant_with_progress(
        &SolveRequest {
            plant_path: Path::new(RANKINE),
            offdesign: None,
            save: None,
            store_dir: Some(&store),
        },
        Some(&mut |e| events.push(e)),
    )
    .unwrap();

    assert_eq!(response.report.mode, Mode::Design);
    assert!(response.saved_design.is_some());
    assert_eq!(list_designs(&store).unwrap(), vec!["rankine_design".to_string()]);

    let stages: Vec<RunStage> = events.iter().map(|e| e.stage.clone()).collect();
    assert_eq!(stages.first(), Some(&RunStage::LoadingPlant));
    assert!(stages.contains(&RunStage::SavingDesign));
    assert_eq!(stages.last(), Some(&RunStage::Completed));

    // condenser upper terminal difference holds in design
    let ttd = response
        .results
        .param("main condenser", cf_components::Param::TtdU)
        .unwrap();
    assert_relative_eq!(ttd, 4.0, epsilon = 1e-4);

    let table = connection_table(&response.results, &response.units);
    assert_eq!(table.rows.len(), 7);
    assert_eq!(table.headers[2], "p [bar]");
}

#[test]
fn offdesign_at_design_conditions_reproduces_design() {
    let store = store_dir("offdesign");
    let design = solve_plant(&SolveRequest {
        plant_path: Path::new(RANKINE),
        offdesign: None,
        save: Some("base"),
        store_dir: Some(&store),
    })
    .unwrap();
    let offdesign = solve_plant(&SolveRequest {
        plant_path: Path::new(RANKINE),
        offdesign: Some("base"),
        save: None,
        store_dir: Some(&store),
    })
    .unwrap();

    assert_eq!(offdesign.report.mode, Mode::Offdesign);
    assert!(offdesign.saved_design.is_none());
    for row in &design.results.connections {
        let other = offdesign.results.connection(&row.label).unwrap();
        assert_relative_eq!(other.stream.m, row.stream.m, max_relative = 1e-4);
        assert_relative_eq!(other.stream.p, row.stream.p, max_relative = 1e-4);
        assert_relative_eq!(other.stream.h, row.stream.h, max_relative = 1e-4);
    }
}

#[test]
fn missing_design_point_fails_the_solve() {
    let store = store_dir("missing");
    let err = solve_plant(&SolveRequest {
        plant_path: Path::new(RANKINE),
        offdesign: Some("nope"),
        save: None,
        store_dir: Some(&store),
    })
    .unwrap_err();
    assert!(matches!(err, AppError::Network(_)), "{err}");
}

#[test]
fn missing_plant_file_is_reported() {
    let err = solve_plant(&SolveRequest {
        plant_path: Path::new("../../plants/missing.yaml"),
        offdesign: None,
        save: None,
        store_dir: None,
    })
    .unwrap_err();
    assert!(matches!(err, AppError::PlantFileRead { .. }));
}

#[test]
fn live_steam_temperature_study_is_stored() {
    let store = store_dir("study");
    let response = run_studies(&StudyRequest {
        plant_path: Path::new(RANKINE),
        study: Some("live-steam-temperature"),
        store_dir: Some(&store),
    })
    .unwrap();

    assert_eq!(response.studies.len(), 1);
    let outcome = &response.studies[0];
    assert_eq!(outcome.records.len(), 7);
    assert_eq!(outcome.converged(), 7);

    // hotter live steam, higher efficiency
    let eta: Vec<f64> = outcome
        .records
        .iter()
        .map(|r| r.outputs["efficiency"])
        .collect();
    assert!(eta.windows(2).all(|w| w[1] > w[0]), "{eta:?}");

    let (manifest, records) =
        load_study(Path::new(RANKINE), Some(&store), "live-steam-temperature").unwrap();
    assert_eq!(manifest.variable, "connection 1.T");
    assert_eq!(records, outcome.records);
    let table = study_table(&manifest.variable, &records).unwrap();
    assert!(table.headers.contains(&"power".to_string()));
}

#[test]
fn cooling_water_study_moves_inlet_with_outlet() {
    let store = store_dir("cooling");
    let response = run_studies(&StudyRequest {
        plant_path: Path::new(RANKINE),
        study: Some("cooling-water-temperature"),
        store_dir: Some(&store),
    })
    .unwrap();

    let records = &response.studies[0].records;
    assert_eq!(records.len(), 7);
    assert!(records.iter().all(|r| r.converged), "{records:?}");
    // warmer cooling water, higher condensing pressure, lower efficiency
    let eta: Vec<f64> = records.iter().map(|r| r.outputs["efficiency"]).collect();
    assert!(eta.windows(2).all(|w| w[1] < w[0]), "{eta:?}");
}

#[test]
fn partload_study_runs_offdesign() {
    let store = store_dir("partload");
    let mut points = 0;
    let response = run_studies_with_progress(
        &StudyRequest {
            plant_path: Path::new(RANKINE),
            study: Some("partload"),
            store_dir: Some(&store),
        },
        Some(&mut |e: RunProgressEvent| {
            if e.study.is_some() {
                points += 1;
            }
        }),
    )
    .unwrap();
    assert_eq!(points, 11);

    let records = &response.studies[0].records;
    assert!(records.iter().all(|r| r.converged));
    // less steam, less power
    let power: Vec<f64> = records.iter().map(|r| r.outputs["power"].abs()).collect();
    assert!(power.windows(2).all(|w| w[1] < w[0]), "{power:?}");
}

#[test]
fn unknown_study_is_rejected() {
    let err = run_studies(&StudyRequest {
        plant_path: Path::new(RANKINE),
        study: Some("nope"),
        store_dir: Some(&store_dir("unknown")),
    })
    .unwrap_err();
    assert!(matches!(err, AppError::StudyNotFound(_)));
}

#[cfg(feature = "coolprop")]
#[test]
fn orc_design_solve() {
    let store = store_dir("orc");
    let response = solve_plant(&SolveRequest {
        plant_path: Path::new("../../plants/orc.yaml"),
        offdesign: None,
        save: None,
        store_dir: Some(&store),
    })
    .unwrap();

    let results = &response.results;
    let power = results.bus("electrical power output").unwrap().total;
    assert!(power < 0.0, "cycle must deliver power: {power}");
    let eta = results
        .efficiency("electrical power output", "steam generator")
        .unwrap();
    assert!(eta > 0.0 && eta < 0.2, "{eta}");
    assert_eq!(list_designs(&store).unwrap(), vec!["orc_design".to_string()]);
}
