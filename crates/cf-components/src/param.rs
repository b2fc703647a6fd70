//! Component parameters and design/offdesign parameter sets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use cf_core::units::Quantity;

use crate::error::ComponentError;

/// Named component parameter.
///
/// Settable parameters fix one equation each; the remaining ones are
/// reported as results after a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Param {
    /// Isentropic efficiency.
    EtaS,
    /// Outlet to inlet pressure ratio.
    Pr,
    /// Pressure drop inlet to outlet.
    Dp,
    /// Mechanical power `m (h_out - h_in)`.
    P,
    /// Heat flow into the (side 1) stream.
    Q,
    /// Heat transfer coefficient times area.
    KA,
    /// Upper terminal temperature difference.
    TtdU,
    /// Lower terminal temperature difference.
    TtdL,
    Pr1,
    Pr2,
    Dp1,
    Dp2,
    /// Stodola cone law (offdesign only, no value).
    Cone,
    /// Logarithmic mean temperature difference (result).
    TdLog,
    /// Mass flow mismatch across a cycle closer (result).
    MassDeviation,
}

impl Param {
    pub const ALL: [Param; 15] = [
        Param::EtaS,
        Param::Pr,
        Param::Dp,
        Param::P,
        Param::Q,
        Param::KA,
        Param::TtdU,
        Param::TtdL,
        Param::Pr1,
        Param::Pr2,
        Param::Dp1,
        Param::Dp2,
        Param::Cone,
        Param::TdLog,
        Param::MassDeviation,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Param::EtaS => "eta_s",
            Param::Pr => "pr",
            Param::Dp => "dp",
            Param::P => "P",
            Param::Q => "Q",
            Param::KA => "kA",
            Param::TtdU => "ttd_u",
            Param::TtdL => "ttd_l",
            Param::Pr1 => "pr1",
            Param::Pr2 => "pr2",
            Param::Dp1 => "dp1",
            Param::Dp2 => "dp2",
            Param::Cone => "cone",
            Param::TdLog => "td_log",
            Param::MassDeviation => "mass_deviation",
        }
    }

    /// Quantity used to convert user values.
    pub fn quantity(&self) -> Quantity {
        match self {
            Param::TtdU | Param::TtdL | Param::TdLog => Quantity::TemperatureDifference,
            Param::Dp | Param::Dp1 | Param::Dp2 => Quantity::Pressure,
            Param::P | Param::Q => Quantity::Power,
            Param::MassDeviation => Quantity::MassFlow,
            _ => Quantity::Dimensionless,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Param {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Param::ALL
            .iter()
            .find(|p| p.key() == s.trim())
            .copied()
            .ok_or_else(|| ComponentError::InvalidArg {
                what: format!("unknown parameter '{s}'"),
            })
    }
}

/// Result values of one component, SI units.
pub type ParamValues = BTreeMap<Param, f64>;

/// Which attributes are fixed only in design and which only in offdesign.
///
/// Anything in neither list keeps its user value in both modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSets<T> {
    pub design: Vec<T>,
    pub offdesign: Vec<T>,
}

impl<T> Default for ModeSets<T> {
    fn default() -> Self {
        Self {
            design: Vec::new(),
            offdesign: Vec::new(),
        }
    }
}

impl<T: PartialEq + fmt::Display> ModeSets<T> {
    pub fn new(design: Vec<T>, offdesign: Vec<T>) -> Result<Self, ComponentError> {
        if let Some(both) = design.iter().find(|d| offdesign.contains(d)) {
            return Err(ComponentError::ConflictingModes {
                param: both.to_string(),
            });
        }
        Ok(Self { design, offdesign })
    }

    pub fn is_empty(&self) -> bool {
        self.design.is_empty() && self.offdesign.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_back() {
        for p in Param::ALL {
            assert_eq!(p.key().parse::<Param>().unwrap(), p);
        }
        assert!("zeta".parse::<Param>().is_err());
    }

    #[test]
    fn mode_sets_reject_overlap() {
        assert!(ModeSets::new(vec![Param::TtdU], vec![Param::KA]).is_ok());
        assert!(matches!(
            ModeSets::new(vec![Param::KA], vec![Param::KA]),
            Err(ComponentError::ConflictingModes { .. })
        ));
    }
}
