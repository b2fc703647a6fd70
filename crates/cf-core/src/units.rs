// cf-core/src/units.rs

use core::fmt;
use core::str::FromStr;

use uom::si::f64::{
    AvailableEnergy as UomAvailableEnergy, MassDensity as UomMassDensity,
    MassRate as UomMassRate, Power as UomPower, Pressure as UomPressure, Ratio as UomRatio,
    TemperatureInterval as UomTemperatureInterval,
    ThermodynamicTemperature as UomThermodynamicTemperature, VolumeRate as UomVolumeRate,
};

use crate::CfError;

// Public canonical unit types (SI, f64)
pub type Density = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type SpecificEnergy = UomAvailableEnergy;
pub type TempInterval = UomTemperatureInterval;
pub type Temperature = UomThermodynamicTemperature;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Temperature units accepted for user-facing values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemperatureUnit {
    #[cfg_attr(feature = "serde", serde(rename = "K"))]
    Kelvin,
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "C"))]
    Celsius,
    #[cfg_attr(feature = "serde", serde(rename = "F"))]
    Fahrenheit,
}

/// Pressure units accepted for user-facing values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PressureUnit {
    #[cfg_attr(feature = "serde", serde(rename = "Pa"))]
    Pascal,
    #[cfg_attr(feature = "serde", serde(rename = "kPa"))]
    Kilopascal,
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "bar"))]
    Bar,
    #[cfg_attr(feature = "serde", serde(rename = "MPa"))]
    Megapascal,
    #[cfg_attr(feature = "serde", serde(rename = "psi"))]
    Psi,
}

/// Specific enthalpy units accepted for user-facing values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnthalpyUnit {
    #[cfg_attr(feature = "serde", serde(rename = "J/kg"))]
    JoulePerKg,
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "kJ/kg"))]
    KilojoulePerKg,
}

impl FromStr for TemperatureUnit {
    type Err = CfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "K" | "kelvin" => Ok(Self::Kelvin),
            "C" | "degC" | "celsius" => Ok(Self::Celsius),
            "F" | "degF" | "fahrenheit" => Ok(Self::Fahrenheit),
            other => Err(CfError::UnknownUnit {
                quantity: "temperature",
                unit: other.to_string(),
            }),
        }
    }
}

impl FromStr for PressureUnit {
    type Err = CfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pa" => Ok(Self::Pascal),
            "kPa" => Ok(Self::Kilopascal),
            "bar" => Ok(Self::Bar),
            "MPa" => Ok(Self::Megapascal),
            "psi" => Ok(Self::Psi),
            other => Err(CfError::UnknownUnit {
                quantity: "pressure",
                unit: other.to_string(),
            }),
        }
    }
}

impl FromStr for EnthalpyUnit {
    type Err = CfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "J/kg" => Ok(Self::JoulePerKg),
            "kJ/kg" => Ok(Self::KilojoulePerKg),
            other => Err(CfError::UnknownUnit {
                quantity: "enthalpy",
                unit: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kelvin => "K",
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        })
    }
}

impl fmt::Display for PressureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pascal => "Pa",
            Self::Kilopascal => "kPa",
            Self::Bar => "bar",
            Self::Megapascal => "MPa",
            Self::Psi => "psi",
        })
    }
}

impl fmt::Display for EnthalpyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::JoulePerKg => "J/kg",
            Self::KilojoulePerKg => "kJ/kg",
        })
    }
}

/// Physical quantity of a user-facing value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantity {
    Temperature,
    TemperatureDifference,
    Pressure,
    Enthalpy,
    MassFlow,
    VolumetricFlow,
    Power,
    Dimensionless,
}

/// Units in which values are entered and reported.
///
/// Mass flow (kg/s), volumetric flow (m3/s) and power (W) are always SI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnitSystem {
    pub temperature: TemperatureUnit,
    pub pressure: PressureUnit,
    pub enthalpy: EnthalpyUnit,
}

impl UnitSystem {
    /// Plain SI: K, Pa, J/kg.
    pub fn si() -> Self {
        Self {
            temperature: TemperatureUnit::Kelvin,
            pressure: PressureUnit::Pascal,
            enthalpy: EnthalpyUnit::JoulePerKg,
        }
    }

    /// Convert a user value to SI.
    pub fn to_si(&self, quantity: Quantity, value: f64) -> f64 {
        use uom::si::{
            available_energy as ae, pressure as pr, temperature_interval as ti,
            thermodynamic_temperature as tt,
        };
        match quantity {
            Quantity::Temperature => match self.temperature {
                TemperatureUnit::Kelvin => value,
                TemperatureUnit::Celsius => {
                    Temperature::new::<tt::degree_celsius>(value).get::<tt::kelvin>()
                }
                TemperatureUnit::Fahrenheit => {
                    Temperature::new::<tt::degree_fahrenheit>(value).get::<tt::kelvin>()
                }
            },
            Quantity::TemperatureDifference => match self.temperature {
                TemperatureUnit::Kelvin | TemperatureUnit::Celsius => value,
                TemperatureUnit::Fahrenheit => {
                    TempInterval::new::<ti::degree_fahrenheit>(value).get::<ti::kelvin>()
                }
            },
            Quantity::Pressure => match self.pressure {
                PressureUnit::Pascal => value,
                PressureUnit::Kilopascal => Pressure::new::<pr::kilopascal>(value).get::<pr::pascal>(),
                PressureUnit::Bar => Pressure::new::<pr::bar>(value).get::<pr::pascal>(),
                PressureUnit::Megapascal => Pressure::new::<pr::megapascal>(value).get::<pr::pascal>(),
                PressureUnit::Psi => Pressure::new::<pr::psi>(value).get::<pr::pascal>(),
            },
            Quantity::Enthalpy => match self.enthalpy {
                EnthalpyUnit::JoulePerKg => value,
                EnthalpyUnit::KilojoulePerKg => SpecificEnergy::new::<ae::kilojoule_per_kilogram>(value)
                    .get::<ae::joule_per_kilogram>(),
            },
            Quantity::MassFlow
            | Quantity::VolumetricFlow
            | Quantity::Power
            | Quantity::Dimensionless => value,
        }
    }

    /// Convert an SI value to this unit system.
    pub fn from_si(&self, quantity: Quantity, value: f64) -> f64 {
        use uom::si::{
            available_energy as ae, pressure as pr, temperature_interval as ti,
            thermodynamic_temperature as tt,
        };
        match quantity {
            Quantity::Temperature => match self.temperature {
                TemperatureUnit::Kelvin => value,
                TemperatureUnit::Celsius => k(value).get::<tt::degree_celsius>(),
                TemperatureUnit::Fahrenheit => k(value).get::<tt::degree_fahrenheit>(),
            },
            Quantity::TemperatureDifference => match self.temperature {
                TemperatureUnit::Kelvin | TemperatureUnit::Celsius => value,
                TemperatureUnit::Fahrenheit => {
                    TempInterval::new::<ti::kelvin>(value).get::<ti::degree_fahrenheit>()
                }
            },
            Quantity::Pressure => match self.pressure {
                PressureUnit::Pascal => value,
                PressureUnit::Kilopascal => pa(value).get::<pr::kilopascal>(),
                PressureUnit::Bar => pa(value).get::<pr::bar>(),
                PressureUnit::Megapascal => pa(value).get::<pr::megapascal>(),
                PressureUnit::Psi => pa(value).get::<pr::psi>(),
            },
            Quantity::Enthalpy => match self.enthalpy {
                EnthalpyUnit::JoulePerKg => value,
                EnthalpyUnit::KilojoulePerKg => SpecificEnergy::new::<ae::joule_per_kilogram>(value)
                    .get::<ae::kilojoule_per_kilogram>(),
            },
            Quantity::MassFlow
            | Quantity::VolumetricFlow
            | Quantity::Power
            | Quantity::Dimensionless => value,
        }
    }

    /// Short unit label for table headers.
    pub fn label(&self, quantity: Quantity) -> String {
        match quantity {
            Quantity::Temperature | Quantity::TemperatureDifference => {
                self.temperature.to_string()
            }
            Quantity::Pressure => self.pressure.to_string(),
            Quantity::Enthalpy => self.enthalpy.to_string(),
            Quantity::MassFlow => "kg/s".to_string(),
            Quantity::VolumetricFlow => "m3/s".to_string(),
            Quantity::Power => "W".to_string(),
            Quantity::Dimensionless => "-".to_string(),
        }
    }
}
