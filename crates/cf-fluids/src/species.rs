//! Chemical species definitions.

/// Working fluids and gases found in steam, organic Rankine and gas loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    /// Water / steam (H₂O)
    Water,
    /// Refrigerant R1234yf
    R1234yf,
    /// Refrigerant R134a
    R134a,
    /// Refrigerant R245fa
    R245fa,
    /// Isopentane
    Isopentane,
    /// n-Pentane
    NPentane,
    /// Isobutane
    Isobutane,
    /// n-Butane
    NButane,
    /// Propane
    Propane,
    /// Ammonia (NH₃)
    Ammonia,
    /// Nitrogen (N₂)
    N2,
    /// Oxygen (O₂)
    O2,
    /// Argon (Ar)
    Ar,
    /// Carbon dioxide (CO₂)
    CO2,
    /// Air (pseudo-pure)
    Air,
    /// Helium (He)
    He,
    /// Hydrogen (H₂)
    H2,
    /// Methane (CH₄)
    CH4,
}

impl Species {
    pub const ALL: [Species; 18] = [
        Species::Water,
        Species::R1234yf,
        Species::R134a,
        Species::R245fa,
        Species::Isopentane,
        Species::NPentane,
        Species::Isobutane,
        Species::NButane,
        Species::Propane,
        Species::Ammonia,
        Species::N2,
        Species::O2,
        Species::Ar,
        Species::CO2,
        Species::Air,
        Species::He,
        Species::H2,
        Species::CH4,
    ];

    /// Canonical name used in plant files and design points.
    pub fn key(&self) -> &'static str {
        match self {
            Species::Water => "water",
            Species::R1234yf => "R1234yf",
            Species::R134a => "R134a",
            Species::R245fa => "R245fa",
            Species::Isopentane => "Isopentane",
            Species::NPentane => "nPentane",
            Species::Isobutane => "Isobutane",
            Species::NButane => "nButane",
            Species::Propane => "Propane",
            Species::Ammonia => "NH3",
            Species::N2 => "N2",
            Species::O2 => "O2",
            Species::Ar => "Ar",
            Species::CO2 => "CO2",
            Species::Air => "Air",
            Species::He => "He",
            Species::H2 => "H2",
            Species::CH4 => "CH4",
        }
    }

    /// Molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        match self {
            Species::Water => 18.015,
            Species::R1234yf => 114.04,
            Species::R134a => 102.03,
            Species::R245fa => 134.05,
            Species::Isopentane | Species::NPentane => 72.149,
            Species::Isobutane | Species::NButane => 58.122,
            Species::Propane => 44.097,
            Species::Ammonia => 17.031,
            Species::N2 => 28.014,
            Species::O2 => 31.999,
            Species::Ar => 39.948,
            Species::CO2 => 44.010,
            Species::Air => 28.965,
            Species::He => 4.0026,
            Species::H2 => 2.016,
            Species::CH4 => 16.043,
        }
    }

    /// Ideal-gas isobaric heat capacity near 300 K [J/(kg·K)].
    ///
    /// `None` for condensable working fluids that have no meaningful
    /// perfect-gas approximation in a power cycle.
    pub fn ideal_cp(&self) -> Option<f64> {
        match self {
            Species::N2 => Some(1040.0),
            Species::O2 => Some(918.0),
            Species::Ar => Some(520.3),
            Species::CO2 => Some(846.0),
            Species::Air => Some(1005.0),
            Species::He => Some(5193.0),
            Species::H2 => Some(14_307.0),
            Species::CH4 => Some(2226.0),
            _ => None,
        }
    }

    #[cfg(feature = "coolprop")]
    pub(crate) fn rfluids_pure(&self) -> rfluids::substance::Pure {
        use rfluids::substance::Pure;
        match self {
            Species::Water => Pure::Water,
            Species::R1234yf => Pure::R1234yf,
            Species::R134a => Pure::R134a,
            Species::R245fa => Pure::R245fa,
            Species::Isopentane => Pure::Isopentane,
            Species::NPentane => Pure::nPentane,
            Species::Isobutane => Pure::Isobutane,
            Species::NButane => Pure::nButane,
            Species::Propane => Pure::nPropane,
            Species::Ammonia => Pure::Ammonia,
            Species::N2 => Pure::Nitrogen,
            Species::O2 => Pure::Oxygen,
            Species::Ar => Pure::Argon,
            Species::CO2 => Pure::CarbonDioxide,
            Species::Air => Pure::Air,
            Species::He => Pure::Helium,
            Species::H2 => Pure::Hydrogen,
            Species::CH4 => Pure::Methane,
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Species {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WATER" | "H2O" | "STEAM" => Ok(Species::Water),
            "R1234YF" => Ok(Species::R1234yf),
            "R134A" => Ok(Species::R134a),
            "R245FA" => Ok(Species::R245fa),
            "ISOPENTANE" | "I-PENTANE" => Ok(Species::Isopentane),
            "NPENTANE" | "N-PENTANE" | "PENTANE" => Ok(Species::NPentane),
            "ISOBUTANE" | "I-BUTANE" => Ok(Species::Isobutane),
            "NBUTANE" | "N-BUTANE" | "BUTANE" => Ok(Species::NButane),
            "PROPANE" | "C3H8" => Ok(Species::Propane),
            "NH3" | "AMMONIA" => Ok(Species::Ammonia),
            "N2" | "NITROGEN" => Ok(Species::N2),
            "O2" | "OXYGEN" => Ok(Species::O2),
            "AR" | "ARGON" => Ok(Species::Ar),
            "CO2" | "CARBONDIOXIDE" | "CARBON DIOXIDE" => Ok(Species::CO2),
            "AIR" => Ok(Species::Air),
            "HE" | "HELIUM" => Ok(Species::He),
            "H2" | "HYDROGEN" => Ok(Species::H2),
            "CH4" | "METHANE" => Ok(Species::CH4),
            _ => Err(format!("unknown species '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_back() {
        for species in Species::ALL {
            assert_eq!(species.key().parse::<Species>().unwrap(), species);
        }
    }

    #[test]
    fn aliases() {
        assert_eq!("H2O".parse::<Species>().unwrap(), Species::Water);
        assert_eq!("r1234yf".parse::<Species>().unwrap(), Species::R1234yf);
        assert!("unobtainium".parse::<Species>().is_err());
    }

    #[test]
    fn only_gases_have_ideal_cp() {
        assert!(Species::Air.ideal_cp().is_some());
        assert!(Species::Water.ideal_cp().is_none());
        assert!(Species::R1234yf.ideal_cp().is_none());
    }
}
