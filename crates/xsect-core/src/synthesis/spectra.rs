//! Spectra derived from an absorption coefficient over a uniform path.

use crate::common::constants::{
    ATM_PER_DYN_CM2, BOLTZMANN, ERG_PER_SECOND_TO_WATT, PLANCK, SPEED_OF_LIGHT,
};
use crate::domain::XsectError;
use serde::{Deserialize, Serialize};

/// Path length used when none is given, cm.
pub const DEFAULT_PATH_LENGTH: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpectrumError {
    #[error("{wavenumbers} wavenumbers but {coefficient} coefficient values")]
    LengthMismatch {
        wavenumbers: usize,
        coefficient: usize,
    },
    #[error("path length must be finite and >= 0, got {value}")]
    InvalidPathLength { value: f64 },
    #[error("temperature must be finite and > 0, got {value}")]
    InvalidTemperature { value: f64 },
}

impl From<SpectrumError> for XsectError {
    fn from(error: SpectrumError) -> Self {
        Self::input_validation("INPUT.SPECTRUM", error.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectrumKind {
    Transmittance,
    Absorption,
    Radiance,
}

impl SpectrumKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transmittance => "transmittance",
            Self::Absorption => "absorption",
            Self::Radiance => "radiance",
        }
    }
}

/// Number density of an ideal gas at `pressure` (atm) and `temperature` (K), cm^-3.
pub fn volume_concentration(pressure: f64, temperature: f64) -> f64 {
    (pressure / ATM_PER_DYN_CM2) / (BOLTZMANN * temperature)
}

pub fn transmittance(coefficient: &[f64], path_length: f64) -> Vec<f64> {
    coefficient
        .iter()
        .map(|&value| (-value * path_length).exp())
        .collect()
}

pub fn absorption(coefficient: &[f64], path_length: f64) -> Vec<f64> {
    coefficient
        .iter()
        .map(|&value| 1.0 - (-value * path_length).exp())
        .collect()
}

/// Thermal emission of a homogeneous layer, W/sr/cm^2/cm^-1.
pub fn radiance(
    wavenumbers: &[f64],
    coefficient: &[f64],
    path_length: f64,
    temperature: f64,
) -> Vec<f64> {
    wavenumbers
        .iter()
        .zip(coefficient)
        .map(|(&nu, &value)| {
            let emissivity = 1.0 - (-value * path_length).exp();
            let planck = 2.0 * PLANCK * SPEED_OF_LIGHT * SPEED_OF_LIGHT * nu.powi(3)
                / ((PLANCK * SPEED_OF_LIGHT * nu / (BOLTZMANN * temperature)).exp() - 1.0)
                * ERG_PER_SECOND_TO_WATT;
            emissivity * planck
        })
        .collect()
}

/// Checked entry point for the three derived spectra.
pub fn derive_spectrum(
    kind: SpectrumKind,
    wavenumbers: &[f64],
    coefficient: &[f64],
    path_length: f64,
    temperature: f64,
) -> Result<Vec<f64>, SpectrumError> {
    if wavenumbers.len() != coefficient.len() {
        return Err(SpectrumError::LengthMismatch {
            wavenumbers: wavenumbers.len(),
            coefficient: coefficient.len(),
        });
    }
    if !path_length.is_finite() || path_length < 0.0 {
        return Err(SpectrumError::InvalidPathLength { value: path_length });
    }

    Ok(match kind {
        SpectrumKind::Transmittance => transmittance(coefficient, path_length),
        SpectrumKind::Absorption => absorption(coefficient, path_length),
        SpectrumKind::Radiance => {
            if !temperature.is_finite() || temperature <= 0.0 {
                return Err(SpectrumError::InvalidTemperature { value: temperature });
            }
            radiance(wavenumbers, coefficient, path_length, temperature)
        }
    })
}
