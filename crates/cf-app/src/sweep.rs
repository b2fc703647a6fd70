//! Study value generation.

use cf_project::schema::{SpacingDef, ValuesDef};

/// Spacing of generated sweep points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepType {
    Linear,
    /// Falls back to linear when a bound is not positive.
    Logarithmic,
}

impl From<SpacingDef> for SweepType {
    fn from(spacing: SpacingDef) -> Self {
        match spacing {
            SpacingDef::Linear => SweepType::Linear,
            SpacingDef::Log => SweepType::Logarithmic,
        }
    }
}

/// Points from `start` to `end` inclusive; the last point is exactly `end`.
pub fn generate(start: f64, end: f64, points: usize, sweep_type: SweepType) -> Vec<f64> {
    if points == 0 {
        return Vec::new();
    }
    if points == 1 {
        return vec![start];
    }
    let positive = start > 0.0 && end > 0.0;
    let mut out: Vec<f64> = match sweep_type {
        SweepType::Logarithmic if positive => {
            let (a, b) = (start.ln(), end.ln());
            let step = (b - a) / (points - 1) as f64;
            (0..points).map(|i| (a + i as f64 * step).exp()).collect()
        }
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points).map(|i| start + i as f64 * step).collect()
        }
    };
    out[points - 1] = end;
    out
}

/// Expand a study value definition in user units.
pub fn values(def: &ValuesDef) -> Vec<f64> {
    match def {
        ValuesDef::List(list) => list.clone(),
        ValuesDef::Range {
            start,
            end,
            points,
            spacing,
        } => generate(*start, *end, *points, (*spacing).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_points() {
        let points = generate(450.0, 750.0, 7, SweepType::Linear);
        assert_eq!(points.len(), 7);
        assert_relative_eq!(points[1], 500.0, max_relative = 1e-12);
        assert_eq!(points[6], 750.0);
    }

    #[test]
    fn descending_range() {
        let points = generate(10.0, 5.0, 11, SweepType::Linear);
        assert_relative_eq!(points[1], 9.5, max_relative = 1e-12);
        assert_eq!(points[10], 5.0);
    }

    #[test]
    fn logarithmic_points() {
        let points = generate(1e5, 1e6, 3, SweepType::Logarithmic);
        assert_relative_eq!(points[1], (1e5_f64 * 1e6).sqrt(), max_relative = 1e-9);
        assert_eq!(points[2], 1e6);
    }

    #[test]
    fn logarithmic_falls_back_to_linear() {
        let points = generate(-10.0, 10.0, 3, SweepType::Logarithmic);
        assert_eq!(points, vec![-10.0, 0.0, 10.0]);
    }

    #[test]
    fn list_values_pass_through() {
        let def = ValuesDef::List(vec![3.0, 1.0, 2.0]);
        assert_eq!(values(&def), vec![3.0, 1.0, 2.0]);
        assert_eq!(generate(1.0, 2.0, 1, SweepType::Linear), vec![1.0]);
    }
}
