use std::path::PathBuf;

use cf_project::{LinkedDef, ModeDef, ValuesDef, VariableDef};

fn workspace_root() -> PathBuf {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    crate_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

#[test]
fn plants_validate() {
    for rel in ["plants/rankine.yaml", "plants/orc.yaml"] {
        let path = workspace_root().join(rel);
        let result = cf_project::load_yaml(&path);
        assert!(
            result.is_ok(),
            "plant failed validation: {} => {:?}",
            path.display(),
            result.err()
        );
    }
}

#[test]
fn rankine_plant_contents() {
    let plant = cf_project::load_yaml(&workspace_root().join("plants/rankine.yaml")).unwrap();
    assert_eq!(plant.components.len(), 7);
    assert_eq!(plant.connections.len(), 7);
    assert_eq!(plant.design_point.as_deref(), Some("rankine_design"));

    let live = plant.connections.iter().find(|c| c.label == "1").unwrap();
    assert_eq!(live.state.t, Some(600.0));
    assert_eq!(live.fluid.as_ref().unwrap().get("water"), Some(&1.0));
    assert_eq!(live.design, vec!["p".to_string()]);

    let partload = plant.studies.iter().find(|s| s.name == "partload").unwrap();
    assert_eq!(partload.mode, ModeDef::Offdesign);
    assert!(matches!(partload.values, ValuesDef::Range { points: 11, .. }));
    assert_eq!(
        partload.variable,
        VariableDef::Connection {
            label: "1".into(),
            attr: "m".into()
        }
    );

    let cooling = plant
        .studies
        .iter()
        .find(|s| s.name == "cooling-water-temperature")
        .unwrap();
    assert!(matches!(cooling.values, ValuesDef::Range { start: 15.0, end: 45.0, points: 7, .. }));
    assert_eq!(
        cooling.linked,
        vec![LinkedDef {
            variable: VariableDef::Connection {
                label: "11".into(),
                attr: "T".into()
            },
            offset: -10.0,
        }]
    );
}
