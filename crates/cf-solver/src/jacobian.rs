//! Finite difference Jacobian computation.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Compute the Jacobian by forward differences, one column per task.
///
/// Column `j` uses the step `epsilon * max(|x_j|, typical_j)`. If the
/// residual cannot be evaluated at the forward point (for instance the
/// state left the fluid's range) a backward difference is used instead.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    f: F,
    epsilon: f64,
    typical: &[f64],
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>> + Sync,
{
    let n = x.len();
    let m = f_x.len();

    let columns: Vec<DVector<f64>> = (0..n)
        .into_par_iter()
        .map(|j| {
            let scale = typical.get(j).copied().unwrap_or(1.0);
            let dx = epsilon * x[j].abs().max(scale);

            let mut x_perturbed = x.clone();
            x_perturbed[j] += dx;
            match f(&x_perturbed) {
                Ok(f_plus) => Ok((f_plus - f_x) / dx),
                Err(_) => {
                    x_perturbed[j] = x[j] - dx;
                    let f_minus = f(&x_perturbed)?;
                    Ok((f_x - f_minus) / dx)
                }
            }
        })
        .collect::<SolverResult<_>>()?;

    let mut jac = DMatrix::zeros(m, n);
    for (j, col) in columns.into_iter().enumerate() {
        jac.set_column(j, &col);
    }
    Ok(jac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;

    #[test]
    fn jacobian_quadratic() {
        // f(x) = [x0^2, x0 * x1], J = [[2 x0, 0], [x1, x0]]
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] * x[0], x[0] * x[1]]))
        };

        let x = DVector::from_vec(vec![3.0, 2.0]);
        let fx = f(&x).unwrap();
        let jac = finite_difference_jacobian(&x, &fx, f, 1e-7, &[1.0, 1.0]).unwrap();

        assert!((jac[(0, 0)] - 6.0).abs() < 1e-5);
        assert!(jac[(0, 1)].abs() < 1e-12);
        assert!((jac[(1, 0)] - 2.0).abs() < 1e-5);
        assert!((jac[(1, 1)] - 3.0).abs() < 1e-5);
    }

    #[test]
    fn falls_back_to_backward_difference() {
        // undefined above x = 1
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            if x[0] > 1.0 {
                return Err(SolverError::Configuration {
                    what: "out of range".into(),
                });
            }
            Ok(DVector::from_element(1, 4.0 * x[0]))
        };
        let x = DVector::from_element(1, 1.0);
        let fx = f(&x).unwrap();
        let jac = finite_difference_jacobian(&x, &fx, f, 1e-7, &[1.0]).unwrap();
        assert!((jac[(0, 0)] - 4.0).abs() < 1e-5);
    }
}
