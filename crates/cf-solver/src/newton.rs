//! Newton solver with pressure positivity and backtracking line search.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Entries below this in a column-scaled Jacobian count as zero.
const ZERO_ENTRY: f64 = 1e-12;

/// Newton solver configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Tolerance on the norm of the scaled residual vector
    pub tolerance: f64,
    /// Minimum allowed pressure (Pa)
    pub min_pressure: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Relative finite difference step
    pub fd_epsilon: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-6,
            min_pressure: 1.0,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            fd_epsilon: 1e-7,
        }
    }
}

/// Names and scales of the system, for diagnostics and step control.
pub struct SystemInfo<'a> {
    pub equation_labels: &'a [String],
    pub variable_labels: &'a [String],
    /// Indices of pressure unknowns, kept above `min_pressure`.
    pub pressure_vars: &'a [usize],
    /// Typical magnitude of each unknown.
    pub typical: &'a [f64],
}

/// Newton iteration result.
#[derive(Debug)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of iterations
    pub iterations: usize,
}

/// Newton solver with line search and positivity constraints.
///
/// Each step solves `J dx = -r` by LU on the column-scaled Jacobian. The
/// step is halved while it leaves the pressure bounds, fails to evaluate
/// or does not reduce the residual norm. When no trial reduces the norm the
/// solve fails with [`SolverError::ConvergenceFailed`].
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    info: &SystemInfo<'_>,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>, &DVector<f64>) -> SolverResult<DMatrix<f64>>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    let mut r_norm = r.norm();

    for iter in 0..config.max_iterations {
        debug!(iteration = iter, residual_norm = r_norm, "newton");
        if r_norm < config.tolerance {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
            });
        }

        let mut jac = jacobian_fn(&x, &r)?;
        for (j, scale) in info.typical.iter().enumerate().take(jac.ncols()) {
            jac.column_mut(j).scale_mut(*scale);
        }
        check_structure(&jac, info)?;

        let y = jac
            .lu()
            .solve(&(-&r))
            .ok_or_else(|| SolverError::SingularSystem {
                what: "Jacobian is singular (linearly dependent equations)".to_string(),
            })?;
        let dx = DVector::from_iterator(
            y.len(),
            y.iter()
                .enumerate()
                .map(|(j, v)| v * info.typical.get(j).copied().unwrap_or(1.0)),
        );

        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..=config.max_line_search_iters {
            let x_new = &x + alpha * &dx;
            let in_bounds = info
                .pressure_vars
                .iter()
                .all(|&i| x_new[i] > config.min_pressure);
            if in_bounds {
                if let Ok(r_new) = residual_fn(&x_new) {
                    let n = r_new.norm();
                    if n.is_finite() && n < r_norm {
                        accepted = Some((x_new, r_new, n));
                        break;
                    }
                }
            }
            alpha *= config.line_search_beta;
        }

        let Some((x_new, r_new, n)) = accepted else {
            debug!(iteration = iter, residual_norm = r_norm, "no step reduces the residual");
            return Err(SolverError::ConvergenceFailed {
                residual_norm: r_norm,
                iterations: iter + 1,
            });
        };
        x = x_new;
        r = r_new;
        r_norm = n;
    }

    if r_norm < config.tolerance {
        return Ok(NewtonResult {
            x,
            residual_norm: r_norm,
            iterations: config.max_iterations,
        });
    }
    Err(SolverError::ConvergenceFailed {
        residual_norm: r_norm,
        iterations: config.max_iterations,
    })
}

/// Name the first equation no unknown affects, or the first unknown no
/// equation depends on.
fn check_structure(jac: &DMatrix<f64>, info: &SystemInfo<'_>) -> SolverResult<()> {
    for (i, row) in jac.row_iter().enumerate() {
        if row.iter().all(|v| v.abs() < ZERO_ENTRY) {
            let name = info
                .equation_labels
                .get(i)
                .map_or_else(|| format!("equation {i}"), Clone::clone);
            return Err(SolverError::SingularSystem {
                what: format!("{name} does not depend on any unknown"),
            });
        }
    }
    for (j, col) in jac.column_iter().enumerate() {
        if col.iter().all(|v| v.abs() < ZERO_ENTRY) {
            let name = info
                .variable_labels
                .get(j)
                .map_or_else(|| format!("unknown {j}"), Clone::clone);
            return Err(SolverError::SingularSystem {
                what: format!("{name} appears in no equation"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jacobian::finite_difference_jacobian;

    fn info<'a>(labels: &'a [String], typical: &'a [f64], pressure: &'a [usize]) -> SystemInfo<'a> {
        SystemInfo {
            equation_labels: labels,
            variable_labels: labels,
            pressure_vars: pressure,
            typical,
        }
    }

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0, x > 0
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>, _r: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let labels = vec!["x".to_string()];
        let result = newton_solve(
            DVector::from_element(1, 3.0),
            residual,
            jacobian,
            &info(&labels, &[1.0], &[0]),
            &NewtonConfig::default(),
        )
        .unwrap();
        assert!((result.x[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn pressure_stays_positive() {
        // root at x = 2; a full step from 10 would overshoot below zero
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0].ln() - 2f64.ln()))
        };
        let jacobian = |x: &DVector<f64>, r: &DVector<f64>| {
            finite_difference_jacobian(x, r, residual, 1e-7, &[1.0])
        };
        let labels = vec!["p".to_string()];
        let result = newton_solve(
            DVector::from_element(1, 10.0),
            residual,
            jacobian,
            &info(&labels, &[1.0], &[0]),
            &NewtonConfig {
                min_pressure: 1e-3,
                ..NewtonConfig::default()
            },
        )
        .unwrap();
        assert!((result.x[0] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn zero_column_is_named() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] - 1.0, 2.0 * x[0] - 1.0]))
        };
        let jacobian = |x: &DVector<f64>, r: &DVector<f64>| {
            finite_difference_jacobian(x, r, residual, 1e-7, &[1.0, 1.0])
        };
        let eq_labels = vec!["a".to_string(), "b".to_string()];
        let var_labels = vec!["x".to_string(), "y".to_string()];
        let err = newton_solve(
            DVector::from_vec(vec![0.0, 0.0]),
            residual,
            jacobian,
            &SystemInfo {
                equation_labels: &eq_labels,
                variable_labels: &var_labels,
                pressure_vars: &[],
                typical: &[1.0, 1.0],
            },
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SolverError::SingularSystem {
                what: "y appears in no equation".into()
            }
        );
    }

    #[test]
    fn reports_nonconvergence() {
        // exp(x) has no root; each full step only divides it by e
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0].exp()))
        };
        let jacobian = |x: &DVector<f64>, _r: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, x[0].exp()))
        };
        let labels = vec!["x".to_string()];
        let err = newton_solve(
            DVector::from_element(1, 0.0),
            residual,
            jacobian,
            &info(&labels, &[1.0], &[]),
            &NewtonConfig {
                max_iterations: 10,
                ..NewtonConfig::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::ConvergenceFailed { .. }));
    }

    #[test]
    fn refuses_uphill_steps() {
        // Jacobian with the wrong sign: every trial along the step is worse
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] - 1.0))
        };
        let jacobian = |_x: &DVector<f64>, _r: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, -1.0))
        };
        let labels = vec!["x".to_string()];
        let err = newton_solve(
            DVector::from_element(1, 0.0),
            residual,
            jacobian,
            &info(&labels, &[1.0], &[]),
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SolverError::ConvergenceFailed {
                residual_norm: 1.0,
                iterations: 1
            }
        );
    }
}
