//! Fluid composition (pure or mixtures) by mass fraction.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{FluidError, FluidResult};
use crate::species::Species;
use cf_core::numeric::{Tolerances, nearly_equal};

/// Allowed deviation of the fraction sum from one.
pub const FRACTION_SUM_TOLERANCE: f64 = 1e-6;

/// Fluid composition defined by mass fractions.
///
/// Fractions are validated to sum to one; species are kept sorted so two
/// compositions with the same content compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    items: Vec<(Species, f64)>,
}

impl Composition {
    /// Create a pure-species composition.
    pub fn pure(species: Species) -> Self {
        Self {
            items: vec![(species, 1.0)],
        }
    }

    /// Create a composition from mass fractions that already sum to one.
    ///
    /// Zero fractions are dropped; duplicate species are rejected.
    pub fn from_mass_fractions(fractions: Vec<(Species, f64)>) -> FluidResult<Self> {
        if fractions.is_empty() {
            return Err(FluidError::InvalidArg {
                what: "empty composition".into(),
            });
        }

        let mut sum = 0.0;
        let mut items: Vec<(Species, f64)> = Vec::with_capacity(fractions.len());
        for (species, frac) in fractions {
            if !frac.is_finite() {
                return Err(FluidError::NonPhysical {
                    what: "non-finite mass fraction",
                });
            }
            if frac < 0.0 {
                return Err(FluidError::NonPhysical {
                    what: "negative mass fraction",
                });
            }
            if items.iter().any(|(s, _)| *s == species) {
                return Err(FluidError::InvalidArg {
                    what: format!("species {species} listed twice"),
                });
            }
            sum += frac;
            if frac > 0.0 {
                items.push((species, frac));
            }
        }

        if (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
            return Err(FluidError::InvalidArg {
                what: format!("mass fractions sum to {sum}, expected 1"),
            });
        }

        items.sort_by_key(|(s, _)| *s);
        Ok(Self { items })
    }

    /// Parse a `name -> fraction` map as used in plant files.
    pub fn from_named(fractions: &BTreeMap<String, f64>) -> FluidResult<Self> {
        let parsed = fractions
            .iter()
            .map(|(name, frac)| {
                name.parse::<Species>()
                    .map(|s| (s, *frac))
                    .map_err(|what| FluidError::InvalidArg { what })
            })
            .collect::<FluidResult<Vec<_>>>()?;
        Self::from_mass_fractions(parsed)
    }

    /// Inverse of [`Composition::from_named`].
    pub fn to_named(&self) -> BTreeMap<String, f64> {
        self.items
            .iter()
            .map(|(s, f)| (s.key().to_string(), *f))
            .collect()
    }

    /// Get mass fraction of a species (0.0 if not present).
    pub fn mass_fraction(&self, species: Species) -> f64 {
        self.items
            .iter()
            .find(|(s, _)| *s == species)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Returns `Some(species)` if exactly one species has fraction ≈1.0.
    pub fn is_pure(&self) -> Option<Species> {
        if self.items.len() == 1 {
            let (species, frac) = self.items[0];
            let tol = Tolerances {
                abs: 1e-10,
                rel: 1e-10,
            };
            if nearly_equal(frac, 1.0, tol) {
                return Some(species);
            }
        }
        None
    }

    /// Iterate over all species with non-zero mass fractions.
    pub fn iter(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        self.items.iter().copied()
    }

    /// Mixture molar mass [kg/kmol]: 1 / Σ (w_i / M_i).
    pub fn molar_mass(&self) -> f64 {
        let inv: f64 = self
            .items
            .iter()
            .map(|(species, w)| w / species.molar_mass())
            .sum();
        1.0 / inv
    }

    /// Compositions equal within the fraction tolerance.
    pub fn matches(&self, other: &Composition) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(&other.items)
                .all(|((a, fa), (b, fb))| a == b && (fa - fb).abs() <= FRACTION_SUM_TOLERANCE)
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(species) = self.is_pure() {
            return write!(f, "{species}");
        }
        let parts: Vec<String> = self
            .items
            .iter()
            .map(|(s, w)| format!("{s}:{w:.4}"))
            .collect();
        f.write_str(&parts.join(","))
    }
}
