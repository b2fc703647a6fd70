//! Energy buses: weighted sums of component power or heat flow.

use cf_core::numeric::interp_clamped;

use crate::error::{ComponentError, ComponentResult};

/// Efficiency of a bus member as a function of relative load.
#[derive(Debug, Clone, PartialEq)]
pub enum Characteristic {
    Constant(f64),
    /// Piecewise linear `eta(load)`, clamped at the ends.
    Curve { load: Vec<f64>, eta: Vec<f64> },
}

impl Characteristic {
    pub fn curve(load: Vec<f64>, eta: Vec<f64>) -> ComponentResult<Self> {
        if load.len() != eta.len() || load.is_empty() {
            return Err(ComponentError::InvalidArg {
                what: "characteristic needs matching, non-empty load and eta lists".into(),
            });
        }
        if load.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ComponentError::InvalidArg {
                what: "characteristic load values must be strictly increasing".into(),
            });
        }
        if eta.iter().any(|e| !e.is_finite() || *e <= 0.0) {
            return Err(ComponentError::InvalidArg {
                what: "characteristic efficiencies must be positive".into(),
            });
        }
        Ok(Characteristic::Curve { load, eta })
    }

    pub fn eta(&self, load: f64) -> f64 {
        match self {
            Characteristic::Constant(eta) => *eta,
            Characteristic::Curve { load: xs, eta } => {
                interp_clamped(xs, eta, load).unwrap_or(1.0)
            }
        }
    }
}

/// Side of the conversion a member's value is measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusBase {
    /// Value is the component's; the bus sees `value * eta`
    /// (e.g. turbine shaft to generator terminals).
    #[default]
    Component,
    /// Value is the bus's; the component sees it after losses, so the bus
    /// supplies `value / eta` (e.g. motor driving a pump).
    Bus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusMember {
    /// Label of the component contributing.
    pub component: String,
    pub characteristic: Characteristic,
    pub base: BusBase,
    /// Component value at the design point; relative load is measured
    /// against it.
    pub design_value: Option<f64>,
}

impl BusMember {
    pub fn new(component: impl Into<String>, characteristic: Characteristic, base: BusBase) -> Self {
        Self {
            component: component.into(),
            characteristic,
            base,
            design_value: None,
        }
    }

    pub fn load(&self, value: f64) -> f64 {
        match self.design_value {
            Some(d) if d.abs() > f64::EPSILON => value / d,
            _ => 1.0,
        }
    }

    /// Contribution of a component value to the bus total.
    pub fn contribution(&self, value: f64) -> f64 {
        let eta = self.characteristic.eta(self.load(value));
        match self.base {
            BusBase::Component => value * eta,
            BusBase::Bus => value / eta,
        }
    }
}

/// A bus sums member contributions; with `p` set it also fixes the total.
#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    pub label: String,
    pub members: Vec<BusMember>,
    pub p: Option<f64>,
}

impl Bus {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            members: Vec::new(),
            p: None,
        }
    }

    pub fn add_member(&mut self, member: BusMember) -> ComponentResult<()> {
        if self.members.iter().any(|m| m.component == member.component) {
            return Err(ComponentError::InvalidArg {
                what: format!(
                    "component '{}' is already on bus '{}'",
                    member.component, self.label
                ),
            });
        }
        self.members.push(member);
        Ok(())
    }

    /// Total from component values aligned with `members`.
    pub fn total(&self, values: &[f64]) -> f64 {
        self.members
            .iter()
            .zip(values)
            .map(|(m, &v)| m.contribution(v))
            .sum()
    }

    /// Copy for offdesign runs with member design values filled in.
    /// `None` leaves a member without a reference load.
    pub fn with_design_values(&self, values: &[Option<f64>]) -> Bus {
        let mut bus = self.clone();
        for (member, &v) in bus.members.iter_mut().zip(values) {
            member.design_value = v;
        }
        bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn power_bus_contributions() {
        let mut bus = Bus::new("power");
        bus.add_member(BusMember::new(
            "turbine",
            Characteristic::Constant(0.97),
            BusBase::Component,
        ))
        .unwrap();
        bus.add_member(BusMember::new(
            "pump",
            Characteristic::Constant(0.97),
            BusBase::Bus,
        ))
        .unwrap();

        let total = bus.total(&[-10e6, 0.2e6]);
        assert_relative_eq!(total, -10e6 * 0.97 + 0.2e6 / 0.97, max_relative = 1e-12);
    }

    #[test]
    fn curve_uses_relative_load() {
        let curve = Characteristic::curve(vec![0.5, 1.0], vec![0.9, 0.98]).unwrap();
        let mut member = BusMember::new("turbine", curve, BusBase::Component);
        assert_relative_eq!(member.contribution(100.0), 98.0);
        member.design_value = Some(200.0);
        assert_relative_eq!(member.contribution(100.0), 90.0);
        // clamped below the table
        assert_relative_eq!(member.contribution(20.0), 18.0);
    }

    #[test]
    fn design_values_scale_curves() {
        let curve = Characteristic::curve(vec![0.5, 1.0], vec![0.9, 0.98]).unwrap();
        let mut bus = Bus::new("power");
        bus.add_member(BusMember::new("turbine", curve.clone(), BusBase::Component))
            .unwrap();
        bus.add_member(BusMember::new("pump", curve, BusBase::Component))
            .unwrap();

        let offdesign = bus.with_design_values(&[Some(200.0), None]);
        assert_eq!(offdesign.members[0].design_value, Some(200.0));
        assert_eq!(offdesign.members[1].design_value, None);
        assert!(bus.members[0].design_value.is_none());
        // turbine at half load, pump at its own reference
        assert_relative_eq!(offdesign.total(&[100.0, 100.0]), 90.0 + 98.0);
    }

    #[test]
    fn rejects_bad_curves_and_duplicates() {
        assert!(Characteristic::curve(vec![1.0, 0.5], vec![0.9, 0.9]).is_err());
        assert!(Characteristic::curve(vec![0.5], vec![0.9, 0.9]).is_err());
        let mut bus = Bus::new("b");
        let m = BusMember::new("x", Characteristic::Constant(1.0), BusBase::Component);
        bus.add_member(m.clone()).unwrap();
        assert!(bus.add_member(m).is_err());
    }
}
