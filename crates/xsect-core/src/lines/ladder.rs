//! Priority search over presets for one parameter and one broadener.
//!
//! A [`ParameterPlan`] is compiled once per (table, broadener, environment):
//! every column name is formatted and looked up up front so resolving a row
//! only indexes into the table. The first lookup case whose required
//! columns are all present (or defaulted) wins.

use super::presets::{
    ArgumentRole, LawArguments, LawConditions, ParameterKind, Preset, PresetName,
    ProfileFamily, find_preset,
};
use super::table::LineSource;
use crate::domain::Environment;
use serde::Serialize;

/// One `(profile family, preset)` entry of a priority list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub family: ProfileFamily,
    pub preset: PresetName,
}

impl Candidate {
    pub const fn new(family: ProfileFamily, preset: PresetName) -> Self {
        Self { family, preset }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LadderError {
    #[error("no preset among the candidates defines {parameter}")]
    NoPreset { parameter: ParameterKind },
    #[error(
        "cannot resolve {parameter} for broadener '{broadener}': missing columns {}",
        missing.join(", ")
    )]
    ParameterNotFound {
        parameter: ParameterKind,
        broadener: String,
        missing: Vec<String>,
    },
}

/// Where one law argument came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentTrace {
    pub column: String,
    /// The column name, or `default` when the declared default was used.
    pub source: String,
    pub value: f64,
}

/// The winning preset for one broadener and its inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BroadenerTrace {
    pub broadener: String,
    pub family: ProfileFamily,
    pub preset: PresetName,
    pub case: &'static str,
    pub reference_temperature: f64,
    pub value: f64,
    pub arguments: Vec<ArgumentTrace>,
}

#[derive(Debug, Clone)]
struct PlannedArgument {
    role: ArgumentRole,
    column: String,
    index: Option<usize>,
    default: Option<f64>,
}

impl PlannedArgument {
    fn read(&self, source: &dyn LineSource, row: usize) -> Option<f64> {
        self.index
            .and_then(|index| source.value(index, row))
            .or(self.default)
    }
}

#[derive(Debug, Clone)]
struct PlannedCase {
    preset: &'static Preset,
    label: &'static str,
    conditions: LawConditions,
    arguments: Vec<PlannedArgument>,
}

impl PlannedCase {
    fn arguments(&self, source: &dyn LineSource, row: usize) -> Option<LawArguments> {
        let mut arguments = LawArguments::default();
        for argument in &self.arguments {
            arguments.set(argument.role, argument.read(source, row)?);
        }
        Some(arguments)
    }

    fn trace(&self, broadener: &str, value: f64, source: &dyn LineSource, row: usize) -> BroadenerTrace {
        let arguments = self
            .arguments
            .iter()
            .map(|argument| {
                let column_value = argument.index.and_then(|index| source.value(index, row));
                ArgumentTrace {
                    column: argument.column.clone(),
                    source: if column_value.is_some() {
                        argument.column.clone()
                    } else {
                        "default".to_string()
                    },
                    value: column_value.or(argument.default).unwrap_or(0.0),
                }
            })
            .collect();
        BroadenerTrace {
            broadener: broadener.to_string(),
            family: self.preset.family,
            preset: self.preset.name,
            case: self.label,
            reference_temperature: self.conditions.reference_temperature,
            value,
            arguments,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParameterPlan {
    parameter: ParameterKind,
    broadener: String,
    cases: Vec<PlannedCase>,
}

impl ParameterPlan {
    /// Lays out every lookup case of every candidate preset, in priority
    /// order. Candidates without a preset for `parameter` are skipped.
    pub fn compile(
        parameter: ParameterKind,
        candidates: &[Candidate],
        broadener: &str,
        source: &dyn LineSource,
        environment: &Environment,
    ) -> Result<Self, LadderError> {
        let mut cases = Vec::new();
        for candidate in candidates {
            let Some(preset) = find_preset(candidate.family, parameter, candidate.preset) else {
                continue;
            };
            let conditions = LawConditions {
                temperature: environment.temperature,
                pressure: environment.pressure,
                reference_temperature: preset
                    .reference_temperature
                    .resolve(environment.temperature),
                reference_pressure: preset.reference_pressure,
            };
            for case in preset.cases {
                let arguments = case
                    .arguments
                    .iter()
                    .map(|spec| {
                        let column = spec.column_name(broadener, conditions.reference_temperature);
                        PlannedArgument {
                            role: spec.role,
                            index: source.column_index(&column),
                            column,
                            default: spec.default,
                        }
                    })
                    .collect();
                cases.push(PlannedCase {
                    preset,
                    label: case.label,
                    conditions,
                    arguments,
                });
            }
        }

        if cases.is_empty() {
            return Err(LadderError::NoPreset { parameter });
        }
        Ok(Self {
            parameter,
            broadener: broadener.to_string(),
            cases,
        })
    }

    pub fn parameter(&self) -> ParameterKind {
        self.parameter
    }

    pub fn broadener(&self) -> &str {
        &self.broadener
    }

    pub fn resolve(&self, source: &dyn LineSource, row: usize) -> Result<f64, LadderError> {
        self.cases
            .iter()
            .find_map(|case| {
                case.arguments(source, row)
                    .map(|arguments| case.preset.law.evaluate(arguments, case.conditions))
            })
            .ok_or_else(|| self.not_found(source, row))
    }

    pub fn resolve_traced(
        &self,
        source: &dyn LineSource,
        row: usize,
    ) -> Result<(f64, BroadenerTrace), LadderError> {
        for case in &self.cases {
            if let Some(arguments) = case.arguments(source, row) {
                let value = case.preset.law.evaluate(arguments, case.conditions);
                return Ok((value, case.trace(&self.broadener, value, source, row)));
            }
        }
        Err(self.not_found(source, row))
    }

    fn not_found(&self, source: &dyn LineSource, row: usize) -> LadderError {
        let mut missing: Vec<String> = Vec::new();
        for argument in self.cases.iter().flat_map(|case| &case.arguments) {
            if argument.read(source, row).is_none() && !missing.contains(&argument.column) {
                missing.push(argument.column.clone());
            }
        }
        LadderError::ParameterNotFound {
            parameter: self.parameter,
            broadener: self.broadener.clone(),
            missing,
        }
    }
}

/// True when some column name carries `_<broadener>` as a name segment.
pub fn references_broadener(source: &dyn LineSource, broadener: &str) -> bool {
    let suffix = format!("_{}", broadener.to_ascii_lowercase());
    let infix = format!("{suffix}_");
    source.column_names().iter().any(|column| {
        let column = column.to_ascii_lowercase();
        column.ends_with(&suffix) || column.contains(&infix)
    })
}
