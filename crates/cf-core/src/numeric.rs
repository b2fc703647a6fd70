use crate::CfError;

/// Floating point type used throughout the solver.
pub type Real = f64;

/// Absolute and relative tolerance pair.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CfError::NonFinite { what, value: v })
    }
}

/// Euclidean norm of a residual slice.
pub fn l2_norm(values: &[Real]) -> Real {
    values.iter().map(|v| v * v).sum::<Real>().sqrt()
}

/// Linear interpolation on a table sorted by `xs`, clamped at both ends.
pub fn interp_clamped(xs: &[Real], ys: &[Real], x: Real) -> Option<Real> {
    if xs.is_empty() || xs.len() != ys.len() {
        return None;
    }
    if x <= xs[0] {
        return Some(ys[0]);
    }
    let last = xs.len() - 1;
    if x >= xs[last] {
        return Some(ys[last]);
    }
    let upper = xs.iter().position(|&xi| xi >= x)?;
    let (x0, x1) = (xs[upper - 1], xs[upper]);
    let (y0, y1) = (ys[upper - 1], ys[upper]);
    if x1 == x0 {
        return Some(y0);
    }
    Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn norm_of_pythagorean_triple() {
        assert_eq!(l2_norm(&[3.0, 4.0]), 5.0);
        assert_eq!(l2_norm(&[]), 0.0);
    }

    #[test]
    fn interpolation_clamps_and_blends() {
        let xs = [0.5, 1.0, 1.5];
        let ys = [0.9, 0.97, 0.95];
        assert_eq!(interp_clamped(&xs, &ys, 0.1), Some(0.9));
        assert_eq!(interp_clamped(&xs, &ys, 2.0), Some(0.95));
        let mid = interp_clamped(&xs, &ys, 0.75).unwrap();
        assert!((mid - 0.935).abs() < 1e-12);
        assert_eq!(interp_clamped(&[], &[], 1.0), None);
    }
}
