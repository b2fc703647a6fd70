use std::collections::BTreeMap;

use cf_components::{Param, ParamValues, StreamRecord};
use cf_fluids::{Composition, Species};
use cf_results::*;

fn temp_store(name: &str) -> ResultStore {
    let dir = std::env::temp_dir().join(format!("cf_results_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    ResultStore::new(dir).unwrap()
}

fn design(name: &str) -> DesignPoint {
    let water = Composition::pure(Species::Water);
    let stream = StreamRecord {
        m: 10.0,
        p: 150e5,
        h: 3.5831e6,
        t: 873.15,
        v: 0.0249,
        s: 6679.6,
        quality: None,
    };
    let mut params = ParamValues::new();
    params.insert(Param::EtaS, 0.9);
    params.insert(Param::P, -1.2e7);

    DesignPoint {
        name: name.to_string(),
        created_at: "2026-10-18T12:00:00Z".to_string(),
        fingerprint: "abc".to_string(),
        connections: vec![ConnectionRecord::new("1", &water, &stream)],
        components: vec![ComponentRecord::new("turbine", "Turbine", &params)],
        buses: vec![BusRecord {
            label: "power".into(),
            total_w: -1.164e7,
            members: vec![BusMemberRecord {
                component: "turbine".into(),
                value_w: -1.2e7,
                contribution_w: -1.164e7,
            }],
        }],
    }
}

#[test]
fn save_and_load_design() {
    let store = temp_store("design");
    let original = design("rankine_design");
    let path = store.save_design(&original).unwrap();
    assert!(path.ends_with("designs/rankine_design/design.json"));

    let loaded = store.load_design("rankine_design").unwrap();
    assert_eq!(loaded, original);
    assert_eq!(loaded.connection("1").unwrap().stream().m, 10.0);
    assert_eq!(
        loaded.component("turbine").unwrap().param_values().unwrap()[&Param::EtaS],
        0.9
    );
    assert!(store.has_design("rankine_design"));
    assert_eq!(store.list_designs().unwrap(), vec!["rankine_design".to_string()]);

    store.delete_design("rankine_design").unwrap();
    assert!(!store.has_design("rankine_design"));
}

#[test]
fn missing_and_invalid_names() {
    let store = temp_store("missing");
    assert!(matches!(
        store.load_design("nope"),
        Err(ResultsError::DesignNotFound { .. })
    ));
    assert!(matches!(
        store.save_design(&design("../escape")),
        Err(ResultsError::InvalidName { .. })
    ));
    assert!(store.list_designs().unwrap().is_empty());
}

#[test]
fn study_roundtrip() {
    let store = temp_store("study");
    let manifest = StudyManifest {
        name: "mass_sweep".into(),
        plant: "rankine".into(),
        timestamp: "2026-10-18T12:00:00Z".into(),
        variable: "connection 1.m".into(),
        values: vec![10.0, 20.0],
    };
    let records = vec![
        StudyRecord {
            index: 0,
            value: 10.0,
            converged: true,
            error: None,
            outputs: BTreeMap::from([("power".to_string(), -11.6)]),
        },
        StudyRecord {
            index: 1,
            value: 20.0,
            converged: false,
            error: Some("did not converge".into()),
            outputs: BTreeMap::new(),
        },
    ];
    store.save_study(&manifest, &records).unwrap();

    let (m, r) = store.load_study("mass_sweep").unwrap();
    assert_eq!(m, manifest);
    assert_eq!(r, records);
}
