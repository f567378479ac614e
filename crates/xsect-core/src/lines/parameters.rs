//! Per-line profile parameters: intensity and Doppler scaling, mixture sums
//! over the diluent, and the correlation terms of the HT profile.

use super::ladder::{
    ArgumentTrace, BroadenerTrace, Candidate, LadderError, ParameterPlan,
};
use super::presets::{ParameterKind, PresetName, ProfileFamily};
use super::table::LineSource;
use crate::common::constants::{
    ATOMIC_MASS_UNIT, BOLTZMANN, LN2, REFERENCE_TEMPERATURE, SECOND_RADIATION_CONSTANT,
    SPEED_OF_LIGHT,
};
use crate::domain::{Diluent, Environment};
use crate::numerics::lineshape::LineParameters;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Parameters a profile can consume, as named in traces and exclude sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum ProfileParameter {
    GammaD,
    Gamma0,
    Delta0,
    Gamma2,
    Delta2,
    Eta,
    #[serde(rename = "NuVC")]
    NuVc,
    YRosen,
}

impl ProfileParameter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GammaD => "GammaD",
            Self::Gamma0 => "Gamma0",
            Self::Delta0 => "Delta0",
            Self::Gamma2 => "Gamma2",
            Self::Delta2 => "Delta2",
            Self::Eta => "Eta",
            Self::NuVc => "NuVC",
            Self::YRosen => "YRosen",
        }
    }

    /// The preset parameter this one is resolved through, if any.
    pub const fn ladder_kind(self) -> Option<ParameterKind> {
        match self {
            Self::Gamma0 => Some(ParameterKind::Gamma0),
            Self::Delta0 => Some(ParameterKind::Delta0),
            Self::Gamma2 => Some(ParameterKind::Gamma2),
            Self::Delta2 => Some(ParameterKind::Delta2),
            Self::NuVc => Some(ParameterKind::NuVc),
            Self::YRosen => Some(ParameterKind::YRosen),
            Self::GammaD | Self::Eta => None,
        }
    }
}

impl Display for ProfileParameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Which parameters are computed for a line and which presets feed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Parametrization {
    Doppler,
    Lorentz,
    Voigt,
    #[serde(rename = "sdvoigt")]
    SdVoigt,
    #[serde(rename = "ht")]
    Ht,
    Priority,
}

const LORENTZ_CANDIDATES: &[Candidate] =
    &[Candidate::new(ProfileFamily::Lorentz, PresetName::Default)];

const VOIGT_CANDIDATES: &[Candidate] = &[Candidate::new(ProfileFamily::Voigt, PresetName::Default)];

const SDVOIGT_CANDIDATES: &[Candidate] = &[
    Candidate::new(ProfileFamily::SdVoigt, PresetName::Default),
    Candidate::new(ProfileFamily::SdVoigt, PresetName::Dimensionless),
    Candidate::new(ProfileFamily::Voigt, PresetName::Default),
];

const HT_CANDIDATES: &[Candidate] = &[
    Candidate::new(ProfileFamily::Ht, PresetName::Multitemp),
    Candidate::new(ProfileFamily::Ht, PresetName::Default),
    Candidate::new(ProfileFamily::Voigt, PresetName::Default),
];

const PRIORITY_CANDIDATES: &[Candidate] = &[
    Candidate::new(ProfileFamily::Ht, PresetName::Multitemp),
    Candidate::new(ProfileFamily::Ht, PresetName::Default),
    Candidate::new(ProfileFamily::SdVoigt, PresetName::Default),
    Candidate::new(ProfileFamily::Voigt, PresetName::Default),
];

use ProfileParameter::{Delta0, Delta2, Eta, Gamma0, Gamma2, GammaD, NuVc, YRosen};

impl Parametrization {
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

    pub const fn candidates(self) -> &'static [Candidate] {
        match self {
            Self::Doppler => &[],
            Self::Lorentz => LORENTZ_CANDIDATES,
            Self::Voigt => VOIGT_CANDIDATES,
            Self::SdVoigt => SDVOIGT_CANDIDATES,
            Self::Ht => HT_CANDIDATES,
            Self::Priority => PRIORITY_CANDIDATES,
        }
    }

    /// Parameters in calculation order.
    pub const fn parameters(self) -> &'static [ProfileParameter] {
        match self {
            Self::Doppler => &[GammaD],
            Self::Lorentz => &[Gamma0, Delta0, YRosen],
            Self::Voigt => &[GammaD, Gamma0, Delta0, YRosen],
            Self::SdVoigt => &[GammaD, Gamma0, Delta0, Gamma2, Delta2, YRosen],
            Self::Ht | Self::Priority => {
                &[GammaD, Gamma0, Delta0, Gamma2, Delta2, Eta, NuVc, YRosen]
            }
        }
    }

    pub fn uses(self, parameter: ProfileParameter) -> bool {
        self.parameters().contains(&parameter)
    }

    /// Whether any parameter is summed over the diluent.
    pub fn needs_diluent(self) -> bool {
        self.parameters()
            .iter()
            .any(|parameter| parameter.ladder_kind().is_some())
    }
}

impl Display for Parametrization {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Intensity at `temperature` from the database value at the reference.
pub fn line_intensity(
    reference_intensity: f64,
    nu: f64,
    lower_energy: f64,
    temperature: f64,
    reference_temperature: f64,
    partition_sum: f64,
    reference_partition_sum: f64,
) -> f64 {
    let boltzmann_factor = |t: f64| {
        (-SECOND_RADIATION_CONSTANT * lower_energy / t).exp()
            * (1.0 - (-SECOND_RADIATION_CONSTANT * nu / t).exp())
    };
    reference_intensity * reference_partition_sum / partition_sum * boltzmann_factor(temperature)
        / boltzmann_factor(reference_temperature)
}

/// Doppler HWHM in cm-1; `molar_mass` in g/mol.
pub fn doppler_half_width(nu: f64, temperature: f64, molar_mass: f64) -> f64 {
    let mass = molar_mass * ATOMIC_MASS_UNIT;
    (2.0 * BOLTZMANN * temperature * LN2 / mass / (SPEED_OF_LIGHT * SPEED_OF_LIGHT)).sqrt() * nu
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterStatus {
    Ok,
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterTrace {
    pub parameter: ProfileParameter,
    pub status: ParameterStatus,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imaginary: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mixture: Vec<BroadenerTrace>,
}

impl ParameterTrace {
    fn excluded(parameter: ProfileParameter) -> Self {
        Self {
            parameter,
            status: ParameterStatus::Excluded,
            value: 0.0,
            imaginary: None,
            mixture: Vec::new(),
        }
    }
}

/// Everything that went into one line's contribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrace {
    pub table: String,
    pub row: usize,
    pub molecule: u32,
    pub isotopologue: u32,
    pub nu: f64,
    pub sw: f64,
    pub partition_sum: f64,
    pub reference_partition_sum: f64,
    pub wing: f64,
    pub parameters: Vec<ParameterTrace>,
}

/// Line quantities computed before the ladder runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineContext {
    pub nu: f64,
    pub sw: f64,
    pub gamma_d: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedLine {
    pub parameters: LineParameters,
    pub trace: Option<Vec<ParameterTrace>>,
}

#[derive(Debug, Clone)]
struct CorrelationColumn {
    column: String,
    index: Option<usize>,
}

#[derive(Debug, Clone)]
struct BroadenerPlans {
    broadener: String,
    fraction: f64,
    plans: Vec<(ParameterKind, ParameterPlan)>,
    correlation: Option<CorrelationColumn>,
}

const SLOTS: usize = 6;

const fn slot(kind: ParameterKind) -> usize {
    match kind {
        ParameterKind::Gamma0 => 0,
        ParameterKind::Delta0 => 1,
        ParameterKind::Gamma2 => 2,
        ParameterKind::Delta2 => 3,
        ParameterKind::NuVc => 4,
        ParameterKind::YRosen => 5,
    }
}

/// Compiled parameter calculation for one table under one environment.
#[derive(Debug, Clone)]
pub struct ParameterCalculator {
    parametrization: Parametrization,
    exclude: BTreeSet<ProfileParameter>,
    broadeners: Vec<BroadenerPlans>,
}

impl ParameterCalculator {
    pub fn compile(
        parametrization: Parametrization,
        exclude: &BTreeSet<ProfileParameter>,
        diluent: &Diluent,
        source: &dyn LineSource,
        environment: &Environment,
    ) -> Result<Self, LadderError> {
        let active = |parameter: ProfileParameter| {
            parametrization.uses(parameter) && !exclude.contains(&parameter)
        };

        let mut broadeners = Vec::with_capacity(diluent.len());
        for (broadener, fraction) in diluent.iter() {
            let mut plans = Vec::new();
            for &parameter in parametrization.parameters() {
                let Some(kind) = parameter.ladder_kind() else {
                    continue;
                };
                if !active(parameter) {
                    continue;
                }
                let plan = ParameterPlan::compile(
                    kind,
                    parametrization.candidates(),
                    broadener,
                    source,
                    environment,
                )?;
                plans.push((kind, plan));
            }
            let correlation = active(Eta).then(|| {
                let column = format!("eta_HT_{broadener}");
                CorrelationColumn {
                    index: source.column_index(&column),
                    column,
                }
            });
            broadeners.push(BroadenerPlans {
                broadener: broadener.to_string(),
                fraction,
                plans,
                correlation,
            });
        }

        Ok(Self {
            parametrization,
            exclude: exclude.clone(),
            broadeners,
        })
    }

    pub fn parametrization(&self) -> Parametrization {
        self.parametrization
    }

    pub fn calculate(
        &self,
        source: &dyn LineSource,
        row: usize,
        line: LineContext,
        capture_trace: bool,
    ) -> Result<CalculatedLine, LadderError> {
        let mut mixed = [0.0_f64; SLOTS];
        let mut mixtures: Option<Vec<Vec<BroadenerTrace>>> =
            capture_trace.then(|| vec![Vec::new(); SLOTS]);
        let mut eta_traces: Vec<BroadenerTrace> = Vec::new();

        let mut correlated_width = Complex64::new(0.0, 0.0);
        let mut speed_dependence = Complex64::new(0.0, 0.0);
        let mut plain_correlation = Complex64::new(0.0, 0.0);
        let mut correlated_velocity = Complex64::new(0.0, 0.0);
        let mut collisional = Complex64::new(0.0, 0.0);

        for broadener in &self.broadeners {
            let mut values = [0.0_f64; SLOTS];
            for (kind, plan) in &broadener.plans {
                let value = match mixtures.as_mut() {
                    Some(mixtures) => {
                        let (value, trace) = plan.resolve_traced(source, row)?;
                        mixtures[slot(*kind)].push(trace);
                        value
                    }
                    None => plan.resolve(source, row)?,
                };
                values[slot(*kind)] = value;
                mixed[slot(*kind)] += broadener.fraction * value;
            }

            let Some(correlation) = &broadener.correlation else {
                continue;
            };
            let column_value = correlation
                .index
                .and_then(|index| source.value(index, row));
            let eta = column_value.unwrap_or(0.0);
            let fraction = broadener.fraction;
            let c0 = Complex64::new(
                values[slot(ParameterKind::Gamma0)],
                values[slot(ParameterKind::Delta0)],
            );
            let c2 = Complex64::new(
                values[slot(ParameterKind::Gamma2)],
                values[slot(ParameterKind::Delta2)],
            );
            correlated_width += c2 * (fraction * eta);
            speed_dependence += c2 * fraction;
            plain_correlation += fraction * eta;
            correlated_velocity += c0 * (fraction * eta);
            collisional += c0 * fraction;

            if capture_trace {
                eta_traces.push(BroadenerTrace {
                    broadener: broadener.broadener.clone(),
                    family: ProfileFamily::Ht,
                    preset: PresetName::Default,
                    case: "HT 1",
                    reference_temperature: REFERENCE_TEMPERATURE,
                    value: eta,
                    arguments: vec![ArgumentTrace {
                        column: correlation.column.clone(),
                        source: if column_value.is_some() {
                            correlation.column.clone()
                        } else {
                            "default".to_string()
                        },
                        value: eta,
                    }],
                });
            }
        }

        let eta = if !self.is_active(Eta) {
            Complex64::new(0.0, 0.0)
        } else if speed_dependence.norm() > 0.0 {
            correlated_width / speed_dependence
        } else {
            plain_correlation
        };
        let nu_vc = if !self.is_active(NuVc) {
            Complex64::new(0.0, 0.0)
        } else {
            mixed[slot(ParameterKind::NuVc)] - correlated_velocity + eta * collisional
        };

        let mut parameters = LineParameters::new(line.nu).with_intensity(line.sw);
        for &parameter in self.parametrization.parameters() {
            let value = match parameter.ladder_kind() {
                Some(kind) => mixed[slot(kind)],
                None => 0.0,
            };
            match parameter {
                GammaD => {
                    parameters.gamma_d = Some(if self.is_active(GammaD) {
                        line.gamma_d
                    } else {
                        0.0
                    });
                }
                Gamma0 => parameters.gamma0 = Some(value),
                Delta0 => parameters.delta0 = Some(value),
                Gamma2 => parameters.gamma2 = Some(value),
                Delta2 => parameters.delta2 = Some(value),
                Eta => parameters.eta = Some(eta),
                NuVc => parameters.nu_vc = Some(nu_vc),
                YRosen => parameters.y_rosen = Some(value),
            }
        }

        let trace = mixtures.map(|mut mixtures| {
            self.parametrization
                .parameters()
                .iter()
                .map(|&parameter| {
                    if !self.is_active(parameter) {
                        return ParameterTrace::excluded(parameter);
                    }
                    let (value, imaginary, mixture) = match parameter {
                        GammaD => (line.gamma_d, None, Vec::new()),
                        Eta => (eta.re, Some(eta.im), std::mem::take(&mut eta_traces)),
                        NuVc => (
                            nu_vc.re,
                            Some(nu_vc.im),
                            std::mem::take(&mut mixtures[slot(ParameterKind::NuVc)]),
                        ),
                        other => {
                            let kind = other.ladder_kind().map_or(0, slot);
                            (mixed[kind], None, std::mem::take(&mut mixtures[kind]))
                        }
                    };
                    ParameterTrace {
                        parameter,
                        status: ParameterStatus::Ok,
                        value,
                        imaginary,
                        mixture,
                    }
                })
                .collect()
        });

        Ok(CalculatedLine { parameters, trace })
    }

    fn is_active(&self, parameter: ProfileParameter) -> bool {
        self.parametrization.uses(parameter) && !self.exclude.contains(&parameter)
    }
}
