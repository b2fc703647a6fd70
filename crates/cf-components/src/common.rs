//! Common utilities for component calculations.

use crate::error::{ComponentError, ComponentResult};
use crate::param::{Param, ParamValues};
use cf_core::numeric::ensure_finite;

/// Smallest terminal temperature difference used in the LMTD [K].
pub const MIN_TTD: f64 = 1e-3;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// Reject parameters a model does not accept and non-finite values.
pub fn check_param(
    kind: &'static str,
    accepts: &[Param],
    param: Param,
    value: Option<f64>,
) -> ComponentResult<()> {
    if !accepts.contains(&param) {
        return Err(ComponentError::UnknownParam {
            kind,
            param: param.key().to_string(),
        });
    }
    if let Some(v) = value {
        if !v.is_finite() {
            return Err(ComponentError::InvalidParam {
                param: param.key().to_string(),
                value: v,
                reason: "must be finite",
            });
        }
        let positive = matches!(
            param,
            Param::EtaS | Param::Pr | Param::Pr1 | Param::Pr2 | Param::KA
        );
        if positive && v <= 0.0 {
            return Err(ComponentError::InvalidParam {
                param: param.key().to_string(),
                value: v,
                reason: "must be positive",
            });
        }
        if param == Param::EtaS && v > 1.0 {
            return Err(ComponentError::InvalidParam {
                param: param.key().to_string(),
                value: v,
                reason: "must not exceed 1",
            });
        }
    }
    Ok(())
}

/// Insert or remove a value in a parameter map.
pub fn store(params: &mut ParamValues, param: Param, value: Option<f64>) {
    match value {
        Some(v) => {
            params.insert(param, v);
        }
        None => {
            params.remove(&param);
        }
    }
}

/// Logarithmic mean temperature difference of two terminal differences.
///
/// Both differences are clamped to at least [`MIN_TTD`]; equal
/// differences return their mean.
pub fn lmtd(ttd_a: f64, ttd_b: f64) -> f64 {
    let a = ttd_a.max(MIN_TTD);
    let b = ttd_b.max(MIN_TTD);
    if ((a - b) / a.max(b)).abs() < 1e-6 {
        0.5 * (a + b)
    } else {
        (a - b) / (a / b).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn lmtd_cases() {
        assert_relative_eq!(lmtd(10.0, 10.0), 10.0);
        assert_relative_eq!(lmtd(20.0, 10.0), 10.0 / 2f64.ln(), max_relative = 1e-12);
        assert_relative_eq!(lmtd(20.0, 10.0), lmtd(10.0, 20.0), max_relative = 1e-12);
        // crossing profiles stay finite
        assert!(lmtd(-5.0, 10.0).is_finite());
    }

    #[test]
    fn param_checks() {
        let accepts = [Param::EtaS, Param::P];
        assert!(check_param("Turbine", &accepts, Param::EtaS, Some(0.9)).is_ok());
        assert!(check_param("Turbine", &accepts, Param::P, Some(-1e6)).is_ok());
        assert!(check_param("Turbine", &accepts, Param::EtaS, Some(-0.1)).is_err());
        assert!(check_param("Turbine", &accepts, Param::EtaS, Some(1.0)).is_ok());
        assert!(matches!(
            check_param("Turbine", &accepts, Param::EtaS, Some(1.5)),
            Err(ComponentError::InvalidParam { reason: "must not exceed 1", .. })
        ));
        assert!(matches!(
            check_param("Turbine", &accepts, Param::KA, Some(1.0)),
            Err(ComponentError::UnknownParam { .. })
        ));
    }
}
