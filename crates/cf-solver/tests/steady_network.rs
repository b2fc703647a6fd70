//! Integration tests for the steady-state solver.

use approx::assert_relative_eq;
use cf_components::{
    ComponentModel, ComponentResult, ConnAttr, ConnectionSpec, EquationKind, Equations, Param,
    ParamValues, PortStreams, Sink, Source, Turbine, mass_balance,
};
use cf_core::units::{bar, celsius};
use cf_fluids::{Composition, FluidModel, If97Model, Species, StateInput};
use cf_graph::{Graph, GraphBuilder, PortLayout, PortRef};
use cf_solver::{NewtonConfig, SolverError, SteadyProblem, solve};

/// Declares one equation but emits two.
struct Miscounting;

impl ComponentModel for Miscounting {
    fn kind(&self) -> &'static str {
        "Miscounting"
    }

    fn layout(&self) -> PortLayout {
        PortLayout::through()
    }

    fn equation_count(&self) -> usize {
        1
    }

    fn residuals(
        &self,
        _fluid: &dyn FluidModel,
        ports: &PortStreams<'_>,
        eqs: &mut Equations,
    ) -> ComponentResult<()> {
        mass_balance(&self.layout(), ports, eqs)?;
        eqs.push(EquationKind::Pressure, "extra", 0.0);
        Ok(())
    }

    fn results(
        &self,
        _fluid: &dyn FluidModel,
        _ports: &PortStreams<'_>,
    ) -> ComponentResult<ParamValues> {
        Ok(ParamValues::new())
    }

    fn accepts(&self) -> &'static [Param] {
        &[]
    }

    fn params(&self) -> ParamValues {
        ParamValues::new()
    }

    fn set_param(&mut self, _param: Param, _value: Option<f64>) -> ComponentResult<()> {
        Ok(())
    }
}

fn line_graph() -> Graph {
    let mut b = GraphBuilder::new();
    let so = b.add_component("source", PortLayout::source(), false);
    let mid = b.add_component("machine", PortLayout::through(), false);
    let si = b.add_component("sink", PortLayout::sink(), false);
    b.connect("1", PortRef::new(so, 0), PortRef::new(mid, 0));
    b.connect("2", PortRef::new(mid, 0), PortRef::new(si, 0));
    b.build().unwrap()
}

fn models(machine: &dyn ComponentModel) -> Vec<&dyn ComponentModel> {
    vec![&Source as &dyn ComponentModel, machine, &Sink]
}

fn steam_specs() -> Vec<ConnectionSpec> {
    let mut c1 = ConnectionSpec {
        fluid: Some(Composition::pure(Species::Water)),
        ..ConnectionSpec::default()
    };
    c1.set(ConnAttr::M, Some(10.0)).unwrap();
    c1.set(ConnAttr::P, Some(150e5)).unwrap();
    c1.set(ConnAttr::T, Some(873.15)).unwrap();
    let mut c2 = ConnectionSpec::default();
    c2.set(ConnAttr::P, Some(0.1e5)).unwrap();
    vec![c1, c2]
}

#[test]
fn single_turbine_expansion() {
    let graph = line_graph();
    let model = If97Model::new();
    let tu = Turbine::new().with_eta_s(0.9).unwrap();
    let specs = steam_specs();
    let problem = SteadyProblem::new(
        &graph,
        &model,
        models(&tu),
        &specs,
        Vec::new(),
    )
    .unwrap();
    assert_eq!(problem.num_free_vars(), 2);

    let config = NewtonConfig::default();
    let solution = solve(&problem, &config, None).unwrap();

    // inlet state through (p, h), as the turbine sees it
    let water = Composition::pure(Species::Water);
    let h_in = model
        .state(
            StateInput::PT {
                p: bar(150.0),
                t: celsius(600.0),
            },
            &water,
        )
        .unwrap()
        .enthalpy();
    let inlet = model
        .state(
            StateInput::PH {
                p: bar(150.0),
                h: h_in,
            },
            &water,
        )
        .unwrap();
    let h_s = model
        .isentropic_enthalpy(&inlet, bar(0.1), &water)
        .unwrap();
    let expected = inlet.enthalpy() - 0.9 * (inlet.enthalpy() - h_s);
    assert_relative_eq!(solution.values[1].h, expected, max_relative = 1e-8);
    assert_relative_eq!(solution.values[1].m, 10.0, max_relative = 1e-10);

    // deterministic: the same problem gives bit-identical results
    let again = solve(&problem, &config, None).unwrap();
    assert_eq!(again.values, solution.values);
    assert_eq!(again.iterations, solution.iterations);
}

#[test]
fn warm_start_converges_immediately() {
    let graph = line_graph();
    let model = If97Model::new();
    let tu = Turbine::new().with_eta_s(0.9).unwrap();
    let specs = steam_specs();
    let problem =
        SteadyProblem::new(&graph, &model, models(&tu), &specs, Vec::new()).unwrap();
    let config = NewtonConfig::default();
    let cold = solve(&problem, &config, None).unwrap();
    let warm = solve(&problem, &config, Some(&cold.values)).unwrap();
    assert_eq!(warm.iterations, 0);
}

#[test]
fn miscounted_equations_are_a_configuration_error() {
    let graph = line_graph();
    let model = If97Model::new();
    let mut specs = steam_specs();
    specs[1].set(ConnAttr::H, Some(3.0e6)).unwrap();
    let problem = SteadyProblem::new(
        &graph,
        &model,
        models(&Miscounting),
        &specs,
        Vec::new(),
    )
    .unwrap();

    let err = solve(&problem, &NewtonConfig::default(), None).unwrap_err();
    match err {
        SolverError::Configuration { what } => assert!(what.contains("machine"), "{what}"),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn degrees_of_freedom_are_checked() {
    let graph = line_graph();
    let model = If97Model::new();
    let mut tu = Turbine::new().with_eta_s(0.9).unwrap();

    // under-determined: outlet pressure free
    let mut specs = steam_specs();
    specs[1].set(ConnAttr::P, None).unwrap();
    let problem =
        SteadyProblem::new(&graph, &model, models(&tu), &specs, Vec::new()).unwrap();
    let err = solve(&problem, &NewtonConfig::default(), None).unwrap_err();
    assert!(matches!(err, SolverError::Configuration { ref what } if what.contains("under")));

    // over-determined: pressure ratio on top of both pressures
    tu.set_param(Param::Pr, Some(0.1 / 150.0)).unwrap();
    let specs = steam_specs();
    let problem =
        SteadyProblem::new(&graph, &model, models(&tu), &specs, Vec::new()).unwrap();
    let err = problem.check_degrees_of_freedom().unwrap_err();
    assert!(matches!(err, SolverError::Configuration { ref what } if what.contains("over")));
}

#[test]
fn missing_fluid_is_reported() {
    let graph = line_graph();
    let model = If97Model::new();
    let tu = Turbine::new();
    let mut specs = steam_specs();
    specs[0].fluid = None;
    let err = SteadyProblem::new(&graph, &model, models(&tu), &specs, Vec::new())
        .err()
        .unwrap();
    assert!(matches!(err, SolverError::Configuration { ref what } if what.contains("no fluid")));
}

#[test]
fn temperature_at_fixed_pressure_fixes_enthalpy() {
    let graph = line_graph();
    let model = If97Model::new();
    let tu = Turbine::new();
    let mut specs = steam_specs();
    specs[1].set(ConnAttr::T, Some(500.0)).unwrap();
    let problem = SteadyProblem::new(&graph, &model, models(&tu), &specs, Vec::new()).unwrap();
    assert!(problem.conn_equations.is_empty());
    assert_eq!(problem.num_free_vars(), 1);

    let solution = solve(&problem, &NewtonConfig::default(), None).unwrap();
    assert_relative_eq!(
        solution.states[1].temperature().value,
        500.0,
        epsilon = 1e-4
    );
    assert_relative_eq!(solution.values[1].m, 10.0, max_relative = 1e-10);
}
