//! High-level solver interface.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use crate::error::SolverResult;
use crate::initialization::initial_values;
use crate::jacobian::finite_difference_jacobian;
use crate::layout::ConnectionValues;
use crate::newton::{NewtonConfig, SystemInfo, newton_solve};
use crate::problem::SteadyProblem;
use crate::steady::{SteadySolution, compute_residuals, connection_states, equation_labels};

/// Solve a steady-state network problem.
///
/// This function:
/// 1. Checks that equations and unknowns balance
/// 2. Builds start values (from `warm_start` when given)
/// 3. Runs Newton with a parallel finite difference Jacobian
///
/// The problem itself is never modified; on error there is no partial
/// result.
pub fn solve(
    problem: &SteadyProblem<'_>,
    config: &NewtonConfig,
    warm_start: Option<&[ConnectionValues]>,
) -> SolverResult<SteadySolution> {
    problem.check_degrees_of_freedom()?;

    let start = initial_values(problem, warm_start);
    let x0 = problem.layout.pack(&start);
    debug!(
        unknowns = x0.len(),
        warm = warm_start.is_some(),
        "solving steady problem"
    );

    if x0.is_empty() {
        let states = connection_states(problem, &start)?;
        return Ok(SteadySolution {
            values: start,
            states,
            residual_norm: 0.0,
            iterations: 0,
        });
    }

    let equation_labels = equation_labels(x0.as_slice(), problem)?;
    let variable_labels = problem.layout.labels(problem.graph);
    let pressure_vars = problem.layout.pressure_vars();
    let typical = problem.layout.typical();
    let info = SystemInfo {
        equation_labels: &equation_labels,
        variable_labels: &variable_labels,
        pressure_vars: &pressure_vars,
        typical: &typical,
    };

    let residual_fn =
        |x: &DVector<f64>| -> SolverResult<DVector<f64>> { compute_residuals(x.as_slice(), problem) };
    let jacobian_fn = |x: &DVector<f64>, r: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
        finite_difference_jacobian(x, r, residual_fn, config.fd_epsilon, &typical)
    };

    let result = newton_solve(x0, residual_fn, jacobian_fn, &info, config)?;
    info!(
        iterations = result.iterations,
        residual_norm = result.residual_norm,
        "converged"
    );

    let values = problem.layout.values(result.x.as_slice());
    let states = connection_states(problem, &values)?;
    Ok(SteadySolution {
        values,
        states,
        residual_norm: result.residual_norm,
        iterations: result.iterations,
    })
}
