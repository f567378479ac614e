pub mod errors;

pub use errors::{XsectError, XsectErrorCategory};

use crate::common::constants::{REFERENCE_PRESSURE, REFERENCE_TEMPERATURE};
use crate::lines::Parametrization;
use crate::numerics::lineshape::LineShape;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Serial,
    Parallel,
}

/// Named spectral profile for the synthesis entry points.
///
/// Each kind fixes both the line shape that is evaluated and the
/// parametrization (preset candidates) that feeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Doppler,
    Lorentz,
    Voigt,
    #[serde(rename = "sdvoigt")]
    SdVoigt,
    #[serde(rename = "ht")]
    Ht,
    Priority,
}

impl ProfileKind {
    pub const ALL: [Self; 6] = [
        Self::Doppler,
        Self::Lorentz,
        Self::Voigt,
        Self::SdVoigt,
        Self::Ht,
        Self::Priority,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doppler => "Doppler",
            Self::Lorentz => "Lorentz",
            Self::Voigt => "Voigt",
            Self::SdVoigt => "SDVoigt",
            Self::Ht => "HT",
            Self::Priority => "Priority",
        }
    }

    pub const fn line_shape(self) -> LineShape {
        match self {
            Self::Doppler => LineShape::Doppler,
            Self::Lorentz => LineShape::Lorentz,
            Self::Voigt => LineShape::Voigt,
            Self::SdVoigt => LineShape::SdVoigt,
            Self::Ht | Self::Priority => LineShape::Ht,
        }
    }

    pub const fn parametrization(self) -> Parametrization {
        match self {
            Self::Doppler => Parametrization::Doppler,
            Self::Lorentz => Parametrization::Lorentz,
            Self::Voigt => Parametrization::Voigt,
            Self::SdVoigt => Parametrization::SdVoigt,
            Self::Ht => Parametrization::Ht,
            Self::Priority => Parametrization::Priority,
        }
    }

    pub const fn coarse_step_threshold(self) -> f64 {
        self.line_shape().coarse_step_threshold()
    }
}

impl Display for ProfileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsorptionUnits {
    /// cm^2/molecule
    #[default]
    CrossSection,
    /// cm^-1, scaled by the number density at (p, T)
    Coefficient,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub temperature: f64,
    pub pressure: f64,
    pub reference_temperature: f64,
    pub reference_pressure: f64,
}

impl Environment {
    pub fn new(temperature: f64, pressure: f64) -> Self {
        Self {
            temperature,
            pressure,
            ..Self::default()
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            temperature: REFERENCE_TEMPERATURE,
            pressure: REFERENCE_PRESSURE,
            reference_temperature: REFERENCE_TEMPERATURE,
            reference_pressure: REFERENCE_PRESSURE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Component {
    pub molecule: u32,
    pub isotopologue: u32,
    #[serde(default)]
    pub abundance: Option<f64>,
}

impl Component {
    pub fn new(molecule: u32, isotopologue: u32) -> Self {
        Self {
            molecule,
            isotopologue,
            abundance: None,
        }
    }

    pub fn with_abundance(mut self, abundance: f64) -> Self {
        self.abundance = Some(abundance);
        self
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiluentError {
    #[error("diluent fraction for '{broadener}' must lie in [0, 1], got {fraction}")]
    FractionOutOfRange { broadener: String, fraction: f64 },
    #[error("diluent broadener name '{broadener}' is not a valid column suffix")]
    InvalidBroadener { broadener: String },
    #[error("diluent broadener '{broadener}' is listed more than once")]
    DuplicateBroadener { broadener: String },
    #[error("cannot derive a default diluent from broadening column '{gamma_l}'")]
    UnknownBroadeningDefault { gamma_l: String },
}

/// Broadener mixture: ordered (species, mole fraction) pairs.
///
/// Fractions are validated to lie in [0, 1] but are not renormalized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Diluent {
    entries: Vec<(String, f64)>,
}

impl Diluent {
    pub fn new<I, S>(entries: I) -> Result<Self, DiluentError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut diluent = Self::default();
        for (broadener, fraction) in entries {
            diluent.push(broadener.into(), fraction)?;
        }
        Ok(diluent)
    }

    /// `gamma_air` implies pure air, `gamma_self` pure self-broadening.
    pub fn from_broadening_default(gamma_l: &str) -> Result<Self, DiluentError> {
        match gamma_l.to_ascii_lowercase().as_str() {
            "gamma_air" => Self::new([("air", 1.0)]),
            "gamma_self" => Self::new([("self", 1.0)]),
            _ => Err(DiluentError::UnknownBroadeningDefault {
                gamma_l: gamma_l.to_string(),
            }),
        }
    }

    fn push(&mut self, broadener: String, fraction: f64) -> Result<(), DiluentError> {
        let valid_name = !broadener.is_empty()
            && broadener
                .chars()
                .all(|character| character.is_ascii_alphanumeric() || character == '_');
        if !valid_name {
            return Err(DiluentError::InvalidBroadener { broadener });
        }
        if !(0.0..=1.0).contains(&fraction) {
            return Err(DiluentError::FractionOutOfRange {
                broadener,
                fraction,
            });
        }
        if self
            .entries
            .iter()
            .any(|(existing, _)| existing.eq_ignore_ascii_case(&broadener))
        {
            return Err(DiluentError::DuplicateBroadener { broadener });
        }
        self.entries.push((broadener, fraction));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries
            .iter()
            .map(|(broadener, fraction)| (broadener.as_str(), *fraction))
    }

    pub fn total_fraction(&self) -> f64 {
        self.entries.iter().map(|(_, fraction)| fraction).sum()
    }
}
