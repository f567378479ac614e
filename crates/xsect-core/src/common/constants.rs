//! Physical constants in CGS units and fixed computational constants.
//!
//! Values follow the HITRAN line-by-line conventions so that computed
//! intensities and Doppler widths match database reference values.

/// Boltzmann constant, erg/K.
pub const BOLTZMANN: f64 = 1.380_648_813e-16;
/// Speed of light, cm/s.
pub const SPEED_OF_LIGHT: f64 = 2.997_924_58e10;
/// Planck constant, erg s.
pub const PLANCK: f64 = 6.626_196e-27;
/// Atomic mass unit in grams (molar mass g/mol to grams per molecule).
pub const ATOMIC_MASS_UNIT: f64 = 1.660_538_73e-24;
/// Second radiation constant hc/k, cm K.
pub const SECOND_RADIATION_CONSTANT: f64 = 1.438_802_849_664_225_7;
/// Pressure of one dyn/cm^2 expressed in atm.
pub const ATM_PER_DYN_CM2: f64 = 9.869_233e-7;

pub const LN2: f64 = std::f64::consts::LN_2;
/// sqrt(ln 2)/sqrt(pi)
pub const SQRT_LN2_DIV_SQRT_PI: f64 = 0.469_718_639_349_825_66;
/// 1/sqrt(pi)
pub const RECIPROCAL_SQRT_PI: f64 = 0.564_189_583_547_756_286_948;

pub const REFERENCE_TEMPERATURE: f64 = 296.0;
pub const REFERENCE_PRESSURE: f64 = 1.0;

/// Wing applied when a line has neither collisional nor Doppler width.
pub const FALLBACK_WING: f64 = 10.0;

/// Radiance conversion from erg/s/sr/cm^2/cm^-1 to W/sr/cm^2/cm^-1.
pub const ERG_PER_SECOND_TO_WATT: f64 = 1.0e-7;
