use std::collections::BTreeMap;

use cf_core::units::UnitSystem;
use cf_project::*;

fn turbine_plant() -> Plant {
    let mut params = BTreeMap::new();
    params.insert("eta_s".to_string(), 0.9);
    let port = |component: &str| PortDef {
        component: component.to_string(),
        port: 0,
    };
    Plant {
        version: 1,
        name: "expansion".to_string(),
        units: UnitSystem::default(),
        solver: SolverDef::default(),
        components: vec![
            ComponentDef {
                label: "source".into(),
                kind: "Source".into(),
                params: BTreeMap::new(),
                design: vec![],
                offdesign: vec![],
            },
            ComponentDef {
                label: "turbine".into(),
                kind: "Turbine".into(),
                params,
                design: vec![],
                offdesign: vec!["cone".into()],
            },
            ComponentDef {
                label: "sink".into(),
                kind: "Sink".into(),
                params: BTreeMap::new(),
                design: vec![],
                offdesign: vec![],
            },
        ],
        connections: vec![
            ConnectionDef {
                label: "1".into(),
                from: port("source"),
                to: port("turbine"),
                state: StateDef {
                    m: Some(10.0),
                    p: Some(150.0),
                    t: Some(600.0),
                    ..StateDef::default()
                },
                fluid: Some(BTreeMap::from([("water".to_string(), 1.0)])),
                design: vec!["p".into()],
                offdesign: vec![],
            },
            ConnectionDef {
                label: "2".into(),
                from: port("turbine"),
                to: port("sink"),
                state: StateDef {
                    p: Some(0.1),
                    ..StateDef::default()
                },
                fluid: None,
                design: vec![],
                offdesign: vec![],
            },
        ],
        buses: vec![],
        studies: vec![StudyDef {
            name: "inlet-pressure".into(),
            mode: ModeDef::Design,
            variable: VariableDef::Connection {
                label: "1".into(),
                attr: "p".into(),
            },
            values: ValuesDef::List(vec![100.0, 150.0]),
            linked: vec![LinkedDef {
                variable: VariableDef::Connection {
                    label: "2".into(),
                    attr: "p".into(),
                },
                offset: -99.9,
            }],
            release: vec![],
            outputs: OutputsDef::default(),
        }],
        design_point: Some("base".into()),
    }
}

#[test]
fn roundtrip_yaml_turbine_plant() {
    let plant = turbine_plant();
    validate_plant(&plant).unwrap();

    let path = std::env::temp_dir().join("cf_project_roundtrip_turbine.yaml");
    save_yaml(&path, &plant).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(plant, loaded);
}

#[test]
fn roundtrip_json_turbine_plant() {
    let plant = turbine_plant();
    let path = std::env::temp_dir().join("cf_project_roundtrip_turbine.json");
    save_json(&path, &plant).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(plant, loaded);
}

#[test]
fn linked_variables_read_from_yaml() {
    let plant = parse_yaml(
        r#"
version: 1
name: cooling
components:
  - { label: source, type: Source }
  - { label: sink, type: Sink }
connections:
  - { label: "11", from: { component: source }, to: { component: sink }, T: 20, p: 1.2 }
studies:
  - name: cooling-water-temperature
    variable: { kind: connection, label: "11", attr: T }
    values: [15, 25]
    linked:
      - { kind: connection, label: "11", attr: p, offset: -14 }
"#,
    )
    .unwrap();
    let study = &plant.studies[0];
    assert_eq!(
        study.linked,
        vec![LinkedDef {
            variable: VariableDef::Connection {
                label: "11".into(),
                attr: "p".into(),
            },
            offset: -14.0,
        }]
    );
}

#[test]
fn defaults_fill_missing_sections() {
    let plant = parse_yaml(
        r#"
version: 1
name: empty
"#,
    )
    .unwrap();
    assert_eq!(plant.solver, SolverDef::default());
    assert_eq!(plant.units, UnitSystem::default());
    assert!(plant.components.is_empty());
}

#[test]
fn validation_reports_problems() {
    let mut plant = turbine_plant();
    plant.components[1].kind = "Compressor".into();
    assert!(matches!(
        validate_plant(&plant),
        Err(ValidationError::Unknown { what: "component type", .. })
    ));

    let mut plant = turbine_plant();
    plant.components[1].params.insert("kA".into(), 1e5);
    assert!(matches!(
        validate_plant(&plant),
        Err(ValidationError::Unknown { what: "parameter", .. })
    ));

    let mut plant = turbine_plant();
    plant.connections[1].label = "1".into();
    assert!(matches!(
        validate_plant(&plant),
        Err(ValidationError::DuplicateLabel { .. })
    ));

    let mut plant = turbine_plant();
    plant.connections[1].to.component = "condenser".into();
    assert!(matches!(
        validate_plant(&plant),
        Err(ValidationError::MissingReference { .. })
    ));

    let mut plant = turbine_plant();
    plant.connections[0].offdesign = vec!["rho".into()];
    assert!(matches!(
        validate_plant(&plant),
        Err(ValidationError::Unknown { what: "connection attribute", .. })
    ));

    let mut plant = turbine_plant();
    plant.studies[0].values = ValuesDef::Range {
        start: 0.0,
        end: 10.0,
        points: 5,
        spacing: SpacingDef::Log,
    };
    assert!(matches!(
        validate_plant(&plant),
        Err(ValidationError::InvalidValue { .. })
    ));

    let mut plant = turbine_plant();
    plant.studies[0].linked[0].variable = VariableDef::Connection {
        label: "7".into(),
        attr: "p".into(),
    };
    assert!(matches!(
        validate_plant(&plant),
        Err(ValidationError::MissingReference { .. })
    ));

    let mut plant = turbine_plant();
    plant.studies[0].linked[0].variable = plant.studies[0].variable.clone();
    assert!(matches!(
        validate_plant(&plant),
        Err(ValidationError::InvalidValue { .. })
    ));

    let mut plant = turbine_plant();
    plant.version = 7;
    assert!(matches!(
        validate_plant(&plant),
        Err(ValidationError::UnsupportedVersion { version: 7 })
    ));
}
