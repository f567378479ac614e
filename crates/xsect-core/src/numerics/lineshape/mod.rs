//! Line shapes: the Hartmann-Tran core and the named profile adapters.

pub mod htp;
pub mod profiles;

pub use htp::{HtInput, HtShape, pcqsdhc};
pub use profiles::{doppler, ht, lorentz, rautian, sd_rautian, sd_voigt, voigt};

use crate::numerics::cpf::ComplexProbabilityFunction;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("{shape} profile requires {parameter}")]
    MissingParameter {
        shape: LineShape,
        parameter: &'static str,
    },
    #[error("{shape} profile requires {parameter} to be finite and > 0, got {value}")]
    NonPositiveWidth {
        shape: LineShape,
        parameter: &'static str,
        value: f64,
    },
}

/// Resolved per-line parameters passed to a line shape.
///
/// Shapes read only the fields they need and ignore the rest; absent
/// optional fields count as zero unless the shape requires them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineParameters {
    pub nu: f64,
    pub sw: f64,
    pub gamma_d: Option<f64>,
    pub gamma0: Option<f64>,
    pub delta0: Option<f64>,
    pub gamma2: Option<f64>,
    pub delta2: Option<f64>,
    pub nu_vc: Option<Complex64>,
    pub eta: Option<Complex64>,
    pub y_rosen: Option<f64>,
}

impl LineParameters {
    pub fn new(nu: f64) -> Self {
        Self {
            nu,
            sw: 1.0,
            gamma_d: None,
            gamma0: None,
            delta0: None,
            gamma2: None,
            delta2: None,
            nu_vc: None,
            eta: None,
            y_rosen: None,
        }
    }

    pub fn with_intensity(mut self, sw: f64) -> Self {
        self.sw = sw;
        self
    }

    pub fn with_doppler_width(mut self, gamma_d: f64) -> Self {
        self.gamma_d = Some(gamma_d);
        self
    }

    pub fn with_collisional_width(mut self, gamma0: f64) -> Self {
        self.gamma0 = Some(gamma0);
        self
    }

    pub fn with_shift(mut self, delta0: f64) -> Self {
        self.delta0 = Some(delta0);
        self
    }

    pub fn with_speed_dependence(mut self, gamma2: f64, delta2: f64) -> Self {
        self.gamma2 = Some(gamma2);
        self.delta2 = Some(delta2);
        self
    }

    pub fn with_velocity_changing(mut self, nu_vc: Complex64) -> Self {
        self.nu_vc = Some(nu_vc);
        self
    }

    pub fn with_correlation(mut self, eta: Complex64) -> Self {
        self.eta = Some(eta);
        self
    }

    pub fn with_line_mixing(mut self, y_rosen: f64) -> Self {
        self.y_rosen = Some(y_rosen);
        self
    }

    /// Largest of the collisional and Doppler half-widths, zero if neither is set.
    pub fn max_half_width(&self) -> f64 {
        self.gamma0.unwrap_or(0.0).max(self.gamma_d.unwrap_or(0.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineShape {
    Doppler,
    Lorentz,
    Voigt,
    #[serde(rename = "sdvoigt")]
    SdVoigt,
    Rautian,
    #[serde(rename = "sdrautian")]
    SdRautian,
    #[serde(rename = "ht")]
    Ht,
}

impl LineShape {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doppler => "Doppler",
            Self::Lorentz => "Lorentz",
            Self::Voigt => "Voigt",
            Self::SdVoigt => "SDVoigt",
            Self::Rautian => "Rautian",
            Self::SdRautian => "SDRautian",
            Self::Ht => "HT",
        }
    }

    /// Doppler-limited shapes need a finer grid than pressure-broadened ones.
    pub const fn coarse_step_threshold(self) -> f64 {
        match self {
            Self::Doppler => 0.005,
            _ => 0.1,
        }
    }

    /// Uniform entry point used by the synthesis loop.
    pub fn evaluate(
        self,
        parameters: &LineParameters,
        grid: &[f64],
        cpf: &dyn ComplexProbabilityFunction,
    ) -> Result<Vec<f64>, ProfileError> {
        let zero = Complex64::new(0.0, 0.0);
        let nu = parameters.nu;
        let sw = parameters.sw;
        let delta0 = parameters.delta0.unwrap_or(0.0);
        let gamma2 = parameters.gamma2.unwrap_or(0.0);
        let delta2 = parameters.delta2.unwrap_or(0.0);
        let nu_vc = parameters.nu_vc.unwrap_or(zero);
        let eta = parameters.eta.unwrap_or(zero);
        let y_rosen = parameters.y_rosen.unwrap_or(0.0);

        let gamma_d = || self.width(parameters.gamma_d, "GammaD");
        let gamma0 = || {
            parameters.gamma0.ok_or(ProfileError::MissingParameter {
                shape: self,
                parameter: "Gamma0",
            })
        };

        Ok(match self {
            Self::Doppler => doppler(nu, gamma_d()?, grid, sw),
            Self::Lorentz => {
                let gamma0 = self.width(parameters.gamma0, "Gamma0")?;
                lorentz(nu, gamma0, delta0, grid, y_rosen, sw)
            }
            Self::Voigt => voigt(nu, gamma_d()?, gamma0()?, delta0, grid, y_rosen, sw, cpf),
            Self::SdVoigt => sd_voigt(
                nu, gamma_d()?, gamma0()?, gamma2, delta0, delta2, grid, y_rosen, sw, cpf,
            ),
            Self::Rautian => rautian(
                nu, gamma_d()?, gamma0()?, delta0, nu_vc, grid, y_rosen, sw, cpf,
            ),
            Self::SdRautian => sd_rautian(
                nu, gamma_d()?, gamma0()?, gamma2, delta0, delta2, nu_vc, grid, y_rosen, sw, cpf,
            ),
            Self::Ht => ht(
                nu, gamma_d()?, gamma0()?, gamma2, delta0, delta2, nu_vc, eta, grid, y_rosen, sw,
                cpf,
            ),
        })
    }

    fn width(self, value: Option<f64>, parameter: &'static str) -> Result<f64, ProfileError> {
        let value = value.ok_or(ProfileError::MissingParameter {
            shape: self,
            parameter,
        })?;
        if !value.is_finite() || value <= 0.0 {
            return Err(ProfileError::NonPositiveWidth {
                shape: self,
                parameter,
                value,
            });
        }
        Ok(value)
    }
}

impl Display for LineShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
