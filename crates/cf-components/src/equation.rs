//! Residual equations emitted by components, connections and buses.

/// Physical kind of a residual; decides its scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquationKind {
    Mass,
    Pressure,
    Enthalpy,
    Power,
    Temperature,
    VolumetricFlow,
}

impl EquationKind {
    /// Typical magnitude of one unit of residual (kg/s, bar, kJ/kg, kW, K, L/s).
    pub fn scale(self) -> f64 {
        match self {
            EquationKind::Mass => 1.0,
            EquationKind::Pressure => 1e5,
            EquationKind::Enthalpy => 1e3,
            EquationKind::Power => 1e3,
            EquationKind::Temperature => 1.0,
            EquationKind::VolumetricFlow => 1e-3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equation {
    pub kind: EquationKind,
    pub label: &'static str,
    /// Unscaled SI residual.
    pub value: f64,
}

impl Equation {
    pub fn scaled(&self) -> f64 {
        self.value / self.kind.scale()
    }
}

/// Append-only residual buffer.
#[derive(Debug, Clone, Default)]
pub struct Equations {
    items: Vec<Equation>,
}

impl Equations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            items: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, kind: EquationKind, label: &'static str, value: f64) {
        self.items.push(Equation { kind, label, value });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Equation> {
        self.items.iter()
    }

    /// Equations pushed at or after `start`.
    pub fn since(&self, start: usize) -> &[Equation] {
        &self.items[start.min(self.items.len())..]
    }
}
