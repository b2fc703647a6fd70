//! Connection specifications.

use std::fmt;
use std::str::FromStr;

use cf_core::units::Quantity;
use cf_fluids::Composition;

use crate::design::StreamRecord;
use crate::error::{ComponentError, ComponentResult};
use crate::param::ModeSets;

/// Settable attribute of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConnAttr {
    /// Mass flow.
    M,
    /// Pressure.
    P,
    /// Specific enthalpy.
    H,
    /// Temperature.
    T,
    /// Vapour quality.
    X,
    /// Volumetric flow.
    V,
}

impl ConnAttr {
    pub const ALL: [ConnAttr; 6] = [
        ConnAttr::M,
        ConnAttr::P,
        ConnAttr::H,
        ConnAttr::T,
        ConnAttr::X,
        ConnAttr::V,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ConnAttr::M => "m",
            ConnAttr::P => "p",
            ConnAttr::H => "h",
            ConnAttr::T => "T",
            ConnAttr::X => "x",
            ConnAttr::V => "v",
        }
    }

    pub fn quantity(&self) -> Quantity {
        match self {
            ConnAttr::M => Quantity::MassFlow,
            ConnAttr::P => Quantity::Pressure,
            ConnAttr::H => Quantity::Enthalpy,
            ConnAttr::T => Quantity::Temperature,
            ConnAttr::X => Quantity::Dimensionless,
            ConnAttr::V => Quantity::VolumetricFlow,
        }
    }
}

impl fmt::Display for ConnAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ConnAttr {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ConnAttr::ALL
            .iter()
            .find(|a| a.key() == s || a.key().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ComponentError::InvalidArg {
                what: format!("unknown connection attribute '{s}'"),
            })
    }
}

/// User specification of one connection, SI units.
///
/// Fixed `m`, `p` and `h` remove unknowns; `T`, `x` and `v` add
/// equations (or fix `h` when pressure is also fixed).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionSpec {
    pub m: Option<f64>,
    pub p: Option<f64>,
    pub h: Option<f64>,
    pub t: Option<f64>,
    pub x: Option<f64>,
    pub v: Option<f64>,
    pub fluid: Option<Composition>,
    pub modes: ModeSets<ConnAttr>,
}

impl ConnectionSpec {
    pub fn get(&self, attr: ConnAttr) -> Option<f64> {
        match attr {
            ConnAttr::M => self.m,
            ConnAttr::P => self.p,
            ConnAttr::H => self.h,
            ConnAttr::T => self.t,
            ConnAttr::X => self.x,
            ConnAttr::V => self.v,
        }
    }

    /// Set or unset an attribute, SI units.
    pub fn set(&mut self, attr: ConnAttr, value: Option<f64>) -> ComponentResult<()> {
        if let Some(v) = value {
            let reason = if !v.is_finite() {
                Some("must be finite")
            } else {
                match attr {
                    ConnAttr::P | ConnAttr::T | ConnAttr::V if v <= 0.0 => Some("must be positive"),
                    ConnAttr::X if !(0.0..=1.0).contains(&v) => Some("must be within [0, 1]"),
                    _ => None,
                }
            };
            if let Some(reason) = reason {
                return Err(ComponentError::InvalidParam {
                    param: attr.key().to_string(),
                    value: v,
                    reason,
                });
            }
        }
        let slot = match attr {
            ConnAttr::M => &mut self.m,
            ConnAttr::P => &mut self.p,
            ConnAttr::H => &mut self.h,
            ConnAttr::T => &mut self.t,
            ConnAttr::X => &mut self.x,
            ConnAttr::V => &mut self.v,
        };
        *slot = value;
        Ok(())
    }

    /// Attributes currently set.
    pub fn fixed(&self) -> impl Iterator<Item = (ConnAttr, f64)> + '_ {
        ConnAttr::ALL
            .into_iter()
            .filter_map(|a| self.get(a).map(|v| (a, v)))
    }

    /// Specification for an offdesign run: design-only attributes are
    /// released and offdesign attributes are fixed at their design values.
    pub fn offdesign(&self, design: &StreamRecord) -> ComponentResult<ConnectionSpec> {
        let mut spec = self.clone();
        for &attr in &self.modes.design {
            spec.set(attr, None)?;
        }
        for &attr in &self.modes.offdesign {
            let value = match attr {
                ConnAttr::M => design.m,
                ConnAttr::P => design.p,
                ConnAttr::H => design.h,
                ConnAttr::T => design.t,
                ConnAttr::X => design.quality.ok_or_else(|| ComponentError::MissingDesignValue {
                    param: "x".into(),
                })?,
                ConnAttr::V => design.volumetric_flow(),
            };
            spec.set(attr, Some(value))?;
        }
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record() -> StreamRecord {
        StreamRecord {
            m: 500.0,
            p: 1.2e5,
            h: 84e3,
            t: 293.15,
            v: 0.001,
            s: 296.0,
            quality: None,
        }
    }

    #[test]
    fn set_validates() {
        let mut c = ConnectionSpec::default();
        assert!(c.set(ConnAttr::P, Some(-1.0)).is_err());
        assert!(c.set(ConnAttr::X, Some(1.5)).is_err());
        c.set(ConnAttr::T, Some(300.0)).unwrap();
        assert_eq!(c.fixed().collect::<Vec<_>>(), vec![(ConnAttr::T, 300.0)]);
    }

    #[test]
    fn offdesign_swaps_attributes() {
        let mut c = ConnectionSpec::default();
        c.set(ConnAttr::T, Some(293.15)).unwrap();
        c.set(ConnAttr::M, Some(500.0)).unwrap();
        c.modes = ModeSets::new(vec![ConnAttr::M], vec![ConnAttr::V]).unwrap();

        let off = c.offdesign(&record()).unwrap();
        assert_eq!(off.m, None);
        assert_eq!(off.t, Some(293.15));
        assert_relative_eq!(off.v.unwrap(), 0.5);
    }

    #[test]
    fn offdesign_quality_needs_two_phase_record() {
        let mut c = ConnectionSpec::default();
        c.modes.offdesign.push(ConnAttr::X);
        assert!(matches!(
            c.offdesign(&record()),
            Err(ComponentError::MissingDesignValue { .. })
        ));
    }

    #[test]
    fn attr_parsing() {
        assert_eq!("T".parse::<ConnAttr>().unwrap(), ConnAttr::T);
        assert_eq!("t".parse::<ConnAttr>().unwrap(), ConnAttr::T);
        assert!("q".parse::<ConnAttr>().is_err());
    }
}
