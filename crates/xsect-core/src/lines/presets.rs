//! Static registry of pressure-induced parameter presets.
//!
//! A preset names the database columns that feed one parameter of one
//! profile family and the law that scales them to (T, p). Column templates
//! use `{b}` for the broadener and `{t}` for the reference temperature.

use crate::common::constants::{REFERENCE_PRESSURE, REFERENCE_TEMPERATURE};
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProfileFamily {
    Lorentz,
    Voigt,
    #[serde(rename = "SDVoigt")]
    SdVoigt,
    #[serde(rename = "HT")]
    Ht,
}

impl ProfileFamily {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lorentz => "Lorentz",
            Self::Voigt => "Voigt",
            Self::SdVoigt => "SDVoigt",
            Self::Ht => "HT",
        }
    }
}

/// Parameters resolved through the preset ladder, one value per broadener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParameterKind {
    Gamma0,
    Delta0,
    Gamma2,
    Delta2,
    #[serde(rename = "NuVC")]
    NuVc,
    YRosen,
}

impl ParameterKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gamma0 => "Gamma0",
            Self::Delta0 => "Delta0",
            Self::Gamma2 => "Gamma2",
            Self::Delta2 => "Delta2",
            Self::NuVc => "NuVC",
            Self::YRosen => "YRosen",
        }
    }
}

impl Display for ParameterKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    Default,
    Dimensionless,
    Multitemp,
}

impl PresetName {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dimensionless => "dimensionless",
            Self::Multitemp => "multitemp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentRole {
    /// Value at the reference conditions.
    Reference,
    /// Exponent of (T_ref / T).
    TemperatureExponent,
    /// Slope of the linear temperature law.
    TemperatureCoefficient,
    /// Dimensionless speed-dependence ratio multiplying the reference width.
    SpeedDependence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceTemperature {
    Standard,
    /// Bucketed by the actual temperature: 50, 150, 296 or 700 K.
    Multitemp,
}

impl ReferenceTemperature {
    pub fn resolve(self, temperature: f64) -> f64 {
        match self {
            Self::Standard => REFERENCE_TEMPERATURE,
            Self::Multitemp => multitemp_reference(temperature),
        }
    }
}

pub fn multitemp_reference(temperature: f64) -> f64 {
    if temperature < 100.0 {
        50.0
    } else if temperature < 200.0 {
        150.0
    } else if temperature < 400.0 {
        296.0
    } else {
        700.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependenceLaw {
    /// `ref * (T_ref/T)^n * p/p_ref`
    PowerLaw,
    /// `(ref + coef (T - T_ref)) * p/p_ref`
    LinearLaw,
    /// Power law applied to `ref * sd`.
    ScaledPowerLaw,
    /// Family has no such parameter; always zero.
    Zero,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LawArguments {
    pub reference: f64,
    pub exponent: f64,
    pub coefficient: f64,
    pub speed_dependence: f64,
}

impl LawArguments {
    pub fn set(&mut self, role: ArgumentRole, value: f64) {
        match role {
            ArgumentRole::Reference => self.reference = value,
            ArgumentRole::TemperatureExponent => self.exponent = value,
            ArgumentRole::TemperatureCoefficient => self.coefficient = value,
            ArgumentRole::SpeedDependence => self.speed_dependence = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LawConditions {
    pub temperature: f64,
    pub pressure: f64,
    pub reference_temperature: f64,
    pub reference_pressure: f64,
}

impl DependenceLaw {
    pub fn evaluate(self, arguments: LawArguments, conditions: LawConditions) -> f64 {
        let pressure_ratio = conditions.pressure / conditions.reference_pressure;
        let power = |reference: f64| {
            reference
                * (conditions.reference_temperature / conditions.temperature)
                    .powf(arguments.exponent)
                * pressure_ratio
        };
        match self {
            Self::PowerLaw => power(arguments.reference),
            Self::LinearLaw => {
                (arguments.reference
                    + arguments.coefficient
                        * (conditions.temperature - conditions.reference_temperature))
                    * pressure_ratio
            }
            Self::ScaledPowerLaw => power(arguments.reference * arguments.speed_dependence),
            Self::Zero => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub role: ArgumentRole,
    pub template: &'static str,
    pub default: Option<f64>,
}

impl ColumnSpec {
    pub fn column_name(&self, broadener: &str, reference_temperature: f64) -> String {
        let mut name = self.template.replace("{b}", broadener);
        if name.contains("{t}") {
            name = name.replace("{t}", &format!("{}", reference_temperature as i64));
        }
        name
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupCase {
    pub label: &'static str,
    pub arguments: &'static [ColumnSpec],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub family: ProfileFamily,
    pub parameter: ParameterKind,
    pub name: PresetName,
    pub reference_temperature: ReferenceTemperature,
    pub reference_pressure: f64,
    pub law: DependenceLaw,
    pub cases: &'static [LookupCase],
}

const fn required(role: ArgumentRole, template: &'static str) -> ColumnSpec {
    ColumnSpec {
        role,
        template,
        default: None,
    }
}

const fn defaulted(role: ArgumentRole, template: &'static str, default: f64) -> ColumnSpec {
    ColumnSpec {
        role,
        template,
        default: Some(default),
    }
}

const fn preset(
    family: ProfileFamily,
    parameter: ParameterKind,
    name: PresetName,
    reference_temperature: ReferenceTemperature,
    law: DependenceLaw,
    cases: &'static [LookupCase],
) -> Preset {
    Preset {
        family,
        parameter,
        name,
        reference_temperature,
        reference_pressure: REFERENCE_PRESSURE,
        law,
        cases,
    }
}

use ArgumentRole::{Reference, SpeedDependence, TemperatureCoefficient, TemperatureExponent};
use DependenceLaw::{LinearLaw, PowerLaw, ScaledPowerLaw, Zero};
use ParameterKind::{Delta0, Delta2, Gamma0, Gamma2, NuVc, YRosen};
use PresetName::{Default as DefaultPreset, Dimensionless, Multitemp};
use ProfileFamily::{Ht, Lorentz, SdVoigt, Voigt};
use ReferenceTemperature::{Multitemp as Bucketed, Standard};

const LORENTZ_GAMMA0: &[LookupCase] = &[
    LookupCase {
        label: "Lorentz 1",
        arguments: &[
            required(Reference, "gamma_{b}"),
            required(TemperatureExponent, "n_{b}"),
        ],
    },
    LookupCase {
        label: "Lorentz 2",
        arguments: &[
            required(Reference, "gamma_{b}"),
            required(TemperatureExponent, "n_air"),
        ],
    },
];

const LORENTZ_DELTA0: &[LookupCase] = &[LookupCase {
    label: "Lorentz 1",
    arguments: &[
        defaulted(Reference, "delta_{b}", 0.0),
        defaulted(TemperatureCoefficient, "deltap_{b}", 0.0),
    ],
}];

const LORENTZ_YROSEN: &[LookupCase] = &[LookupCase {
    label: "Lorentz 1",
    arguments: &[
        defaulted(Reference, "y_{b}", 0.0),
        defaulted(TemperatureCoefficient, "n_y_{b}", 0.0),
    ],
}];

/// Same columns as [`LORENTZ_YROSEN`], read as reference and exponent.
const VOIGT_YROSEN: &[LookupCase] = &[LookupCase {
    label: "Lorentz 1",
    arguments: &[
        defaulted(Reference, "y_{b}", 0.0),
        defaulted(TemperatureExponent, "n_y_{b}", 0.0),
    ],
}];

const NO_COLUMNS: &[LookupCase] = &[LookupCase {
    label: "absent",
    arguments: &[],
}];

const SDV_GAMMA0: &[LookupCase] = &[LookupCase {
    label: "SDVoigt 1",
    arguments: &[
        required(Reference, "gamma_SDV_0_{b}_{t}"),
        defaulted(TemperatureExponent, "n_SDV_{b}_{t}", 0.0),
    ],
}];

const SDV_DELTA0: &[LookupCase] = &[LookupCase {
    label: "SDVoigt 1",
    arguments: &[
        required(Reference, "delta_SDV_0_{b}_{t}"),
        required(TemperatureCoefficient, "deltap_SDV_{b}_{t}"),
    ],
}];

const SDV_GAMMA2: &[LookupCase] = &[LookupCase {
    label: "SDVoigt 1",
    arguments: &[
        required(Reference, "gamma_SDV_2_{b}_{t}"),
        defaulted(TemperatureExponent, "n_gamma_SDV_2_{b}_{t}", 0.0),
    ],
}];

const SDV_GAMMA2_DIMENSIONLESS: &[LookupCase] = &[
    LookupCase {
        label: "SDVoigt 1",
        arguments: &[
            required(Reference, "gamma_{b}"),
            required(SpeedDependence, "SD_{b}"),
            defaulted(TemperatureExponent, "n_SD_{b}", 0.0),
        ],
    },
    LookupCase {
        label: "SDVoigt 2",
        arguments: &[
            required(Reference, "gamma_{b}"),
            required(SpeedDependence, "SD_{b}"),
            defaulted(TemperatureExponent, "n_SD_air", 0.0),
        ],
    },
];

const SDV_DELTA2: &[LookupCase] = &[LookupCase {
    label: "SDVoigt 1",
    arguments: &[
        defaulted(Reference, "delta_SDV_2_{b}_{t}", 0.0),
        defaulted(TemperatureCoefficient, "deltap_SDV_2_{b}_{t}", 0.0),
    ],
}];

const SDV_YROSEN: &[LookupCase] = &[LookupCase {
    label: "Lorentz 1",
    arguments: &[
        defaulted(Reference, "Y_SDV_{b}_{t}", 0.0),
        defaulted(TemperatureExponent, "n_Y_SDV_{b}_{t}", 0.0),
    ],
}];

const HT_GAMMA0: &[LookupCase] = &[LookupCase {
    label: "HT 1",
    arguments: &[
        required(Reference, "gamma_HT_0_{b}_{t}"),
        defaulted(TemperatureExponent, "n_HT_{b}_{t}", 0.0),
    ],
}];

const HT_DELTA0: &[LookupCase] = &[LookupCase {
    label: "HT 1",
    arguments: &[
        required(Reference, "delta_HT_0_{b}_{t}"),
        required(TemperatureCoefficient, "deltap_HT_{b}_{t}"),
    ],
}];

const HT_GAMMA2: &[LookupCase] = &[LookupCase {
    label: "HT 1",
    arguments: &[
        required(Reference, "gamma_HT_2_{b}_{t}"),
        defaulted(TemperatureExponent, "n_gamma_HT_2_{b}_{t}", 0.0),
    ],
}];

const HT_DELTA2: &[LookupCase] = &[LookupCase {
    label: "HT 1",
    arguments: &[
        defaulted(Reference, "delta_HT_2_{b}_{t}", 0.0),
        defaulted(TemperatureCoefficient, "deltap_HT_2_{b}_{t}", 0.0),
    ],
}];

const HT_NUVC: &[LookupCase] = &[LookupCase {
    label: "HT 1",
    arguments: &[
        required(Reference, "nu_HT_{b}"),
        defaulted(TemperatureExponent, "kappa_HT_{b}", 0.0),
    ],
}];

const HT_YROSEN: &[LookupCase] = &[LookupCase {
    label: "Lorentz 1",
    arguments: &[
        defaulted(Reference, "Y_HT_{b}_{t}", 0.0),
        defaulted(TemperatureExponent, "n_Y_HT_{b}_{t}", 0.0),
    ],
}];

pub static PRESETS: &[Preset] = &[
    preset(Lorentz, Gamma0, DefaultPreset, Standard, PowerLaw, LORENTZ_GAMMA0),
    preset(Lorentz, Delta0, DefaultPreset, Standard, LinearLaw, LORENTZ_DELTA0),
    preset(Lorentz, YRosen, DefaultPreset, Standard, LinearLaw, LORENTZ_YROSEN),
    preset(Voigt, Gamma0, DefaultPreset, Standard, PowerLaw, LORENTZ_GAMMA0),
    preset(Voigt, Delta0, DefaultPreset, Standard, LinearLaw, LORENTZ_DELTA0),
    preset(Voigt, Gamma2, DefaultPreset, Standard, Zero, NO_COLUMNS),
    preset(Voigt, Delta2, DefaultPreset, Standard, Zero, NO_COLUMNS),
    preset(Voigt, NuVc, DefaultPreset, Standard, Zero, NO_COLUMNS),
    preset(Voigt, YRosen, DefaultPreset, Standard, PowerLaw, VOIGT_YROSEN),
    preset(SdVoigt, Gamma0, DefaultPreset, Standard, PowerLaw, SDV_GAMMA0),
    preset(SdVoigt, Delta0, DefaultPreset, Standard, LinearLaw, SDV_DELTA0),
    preset(SdVoigt, Gamma2, DefaultPreset, Standard, PowerLaw, SDV_GAMMA2),
    preset(
        SdVoigt,
        Gamma2,
        Dimensionless,
        Standard,
        ScaledPowerLaw,
        SDV_GAMMA2_DIMENSIONLESS,
    ),
    preset(SdVoigt, Delta2, DefaultPreset, Standard, LinearLaw, SDV_DELTA2),
    preset(SdVoigt, YRosen, DefaultPreset, Standard, PowerLaw, SDV_YROSEN),
    preset(Ht, Gamma0, DefaultPreset, Standard, PowerLaw, HT_GAMMA0),
    preset(Ht, Gamma0, Multitemp, Bucketed, PowerLaw, HT_GAMMA0),
    preset(Ht, Delta0, DefaultPreset, Standard, LinearLaw, HT_DELTA0),
    preset(Ht, Delta0, Multitemp, Bucketed, LinearLaw, HT_DELTA0),
    preset(Ht, Gamma2, DefaultPreset, Standard, PowerLaw, HT_GAMMA2),
    preset(Ht, Gamma2, Multitemp, Bucketed, PowerLaw, HT_GAMMA2),
    preset(Ht, Delta2, DefaultPreset, Standard, LinearLaw, HT_DELTA2),
    preset(Ht, Delta2, Multitemp, Bucketed, LinearLaw, HT_DELTA2),
    preset(Ht, NuVc, DefaultPreset, Standard, PowerLaw, HT_NUVC),
    preset(Ht, YRosen, DefaultPreset, Standard, PowerLaw, HT_YROSEN),
];

pub fn find_preset(
    family: ProfileFamily,
    parameter: ParameterKind,
    name: PresetName,
) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| {
        preset.family == family && preset.parameter == parameter && preset.name == name
    })
}
