//! On-disk JSON form of a synthesis run.
//!
//! Table paths are resolved against the directory holding the config file.

use super::catalog::{BuiltinCatalog, CatalogError, IsotopologueInfo, TabulatedPartitionFunction};
use crate::domain::{
    AbsorptionUnits, Component, Diluent, Environment, ExecutionMode, ProfileKind, XsectError,
};
use crate::lines::{Parametrization, ProfileParameter};
use crate::numerics::cpf::CpfKind;
use crate::numerics::lineshape::LineShape;
use crate::synthesis::output::{DEFAULT_ROW_FORMAT, RowFormat};
use crate::synthesis::request::{
    DEFAULT_BROADENING, DEFAULT_INTENSITY_THRESHOLD, DEFAULT_RELATIVE_WING, DEFAULT_STEP,
    SynthesisRequest, WavenumberSpec,
};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config '{origin}': {source}")]
    Parse {
        origin: String,
        source: serde_json::Error,
    },
    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl ToString) -> Self {
        Self::Invalid {
            field,
            reason: reason.to_string(),
        }
    }
}

impl From<ConfigError> for XsectError {
    fn from(error: ConfigError) -> Self {
        let message = error.to_string();
        match error {
            ConfigError::Read { .. } => Self::io_system("IO.CONFIG", message),
            ConfigError::Parse { .. } | ConfigError::Invalid { .. } => {
                Self::input_validation("INPUT.CONFIG", message)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Named profile; sets both the line shape and the parametrization.
    #[serde(default)]
    pub profile: Option<ProfileKind>,
    #[serde(default)]
    pub line_shape: Option<LineShape>,
    #[serde(default)]
    pub parametrization: Option<Parametrization>,
    pub tables: Vec<PathBuf>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    /// Broadener name to mole fraction.
    #[serde(default)]
    pub diluent: BTreeMap<String, f64>,
    #[serde(default = "default_broadening")]
    pub broadening_default: String,
    #[serde(default)]
    pub wavenumbers: WavenumberConfig,
    #[serde(default)]
    pub wing: f64,
    #[serde(default = "default_wing_half_widths")]
    pub wing_half_widths: f64,
    #[serde(default = "default_intensity_threshold")]
    pub intensity_threshold: f64,
    #[serde(default)]
    pub units: AbsorptionUnits,
    #[serde(default = "default_true")]
    pub line_shift: bool,
    #[serde(default)]
    pub line_mixing: bool,
    #[serde(default)]
    pub exclude: BTreeSet<ProfileParameter>,
    #[serde(default)]
    pub cpf: CpfKind,
    #[serde(default)]
    pub suppress_line_errors: bool,
    #[serde(default)]
    pub execution: ExecutionMode,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub partition_sums: Vec<PartitionSumConfig>,
    #[serde(default)]
    pub isotopologues: Vec<IsotopologueConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_pressure")]
    pub pressure: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            pressure: default_pressure(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WavenumberConfig {
    #[serde(default)]
    pub range: Option<[f64; 2]>,
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default)]
    pub grid: Option<Vec<f64>>,
}

impl Default for WavenumberConfig {
    fn default() -> Self {
        Self {
            range: None,
            step: default_step(),
            grid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartitionSumConfig {
    pub molecule: u32,
    pub isotopologue: u32,
    pub temperatures: Vec<f64>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IsotopologueConfig {
    pub molecule: u32,
    pub isotopologue: u32,
    #[serde(default)]
    pub formula: String,
    pub natural_abundance: f64,
    pub molar_mass: f64,
}

fn default_broadening() -> String {
    DEFAULT_BROADENING.to_string()
}
fn default_wing_half_widths() -> f64 {
    DEFAULT_RELATIVE_WING
}
fn default_intensity_threshold() -> f64 {
    DEFAULT_INTENSITY_THRESHOLD
}
fn default_true() -> bool {
    true
}
fn default_format() -> String {
    DEFAULT_ROW_FORMAT.to_string()
}
fn default_temperature() -> f64 {
    Environment::default().temperature
}
fn default_pressure() -> f64 {
    Environment::default().pressure
}
fn default_step() -> f64 {
    DEFAULT_STEP
}

impl RunConfig {
    pub fn from_json_str(source: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(source).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })
    }

    pub fn to_request(&self) -> Result<SynthesisRequest, ConfigError> {
        let mut request = SynthesisRequest::default();
        if let Some(profile) = self.profile {
            request = request.with_profile(profile);
        }
        if let Some(line_shape) = self.line_shape {
            request = request.with_line_shape(line_shape);
        }
        if let Some(parametrization) = self.parametrization {
            request = request.with_parametrization(parametrization);
        }

        let wavenumbers = match (&self.wavenumbers.grid, self.wavenumbers.range) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::invalid(
                    "wavenumbers",
                    "give either a range or a grid, not both",
                ));
            }
            (Some(grid), None) => WavenumberSpec::Explicit(grid.clone()),
            (None, range) => WavenumberSpec::Uniform {
                range: range.map(|[lower, upper]| (lower, upper)),
                step: self.wavenumbers.step,
            },
        };
        let diluent = Diluent::new(
            self.diluent
                .iter()
                .map(|(broadener, fraction)| (broadener.as_str(), *fraction)),
        )
        .map_err(|error| ConfigError::invalid("diluent", error))?;

        request.components = self.components.clone();
        request.environment =
            Environment::new(self.environment.temperature, self.environment.pressure);
        request.diluent = diluent;
        request.broadening_default = self.broadening_default.clone();
        request.wavenumbers = wavenumbers;
        request.absolute_wing = self.wing;
        request.relative_wing = self.wing_half_widths;
        request.intensity_threshold = self.intensity_threshold;
        request.units = self.units;
        request.line_shift = self.line_shift;
        request.line_mixing = self.line_mixing;
        request.exclude = self.exclude.clone();
        request.cpf = self.cpf;
        request.suppress_line_errors = self.suppress_line_errors;
        request.execution = self.execution;
        Ok(request)
    }

    pub fn row_format(&self) -> Result<RowFormat, ConfigError> {
        self.format
            .parse()
            .map_err(|error| ConfigError::invalid("format", error))
    }

    pub fn table_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.tables
            .iter()
            .map(|path| {
                if path.is_absolute() {
                    path.clone()
                } else {
                    base.join(path)
                }
            })
            .collect()
    }

    pub fn partition_function(&self) -> Result<TabulatedPartitionFunction, ConfigError> {
        let mut partition = TabulatedPartitionFunction::new();
        for table in &self.partition_sums {
            partition
                .insert(
                    table.molecule,
                    table.isotopologue,
                    table.temperatures.clone(),
                    table.values.clone(),
                )
                .map_err(|error: CatalogError| ConfigError::invalid("partition_sums", error))?;
        }
        Ok(partition)
    }

    pub fn catalog(&self) -> BuiltinCatalog {
        self.isotopologues
            .iter()
            .fold(BuiltinCatalog::new(), |catalog, entry| {
                catalog.with_isotopologue(IsotopologueInfo {
                    molecule: entry.molecule,
                    isotopologue: entry.isotopologue,
                    formula: entry.formula.clone(),
                    natural_abundance: entry.natural_abundance,
                    molar_mass: entry.molar_mass,
                })
            })
    }
}

pub fn load_run_config(path: impl AsRef<Path>) -> Result<RunConfig, ConfigError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    RunConfig::from_json_str(&source, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RunConfig, load_run_config};
    use crate::common::catalog::{IsotopologueCatalog, PartitionFunction};
    use crate::domain::{ExecutionMode, ProfileKind};
    use crate::lines::{Parametrization, ProfileParameter};
    use crate::numerics::cpf::CpfKind;
    use crate::numerics::lineshape::LineShape;
    use crate::synthesis::request::WavenumberSpec;
    use std::fs;
    use std::path::Path;

    #[test]
    fn minimal_config_takes_defaults() {
        let config = RunConfig::from_json_str(r#"{"tables": ["co2.json"]}"#, "inline")
            .expect("config");
        let request = config.to_request().expect("request");

        assert_eq!(request.environment.temperature, 296.0);
        assert_eq!(request.relative_wing, 50.0);
        assert_eq!(
            request.wavenumbers,
            WavenumberSpec::Uniform {
                range: None,
                step: 0.01
            }
        );
        assert!(request.diluent.is_empty());
        assert!(request.line_shape.is_none());
        assert_eq!(config.row_format().expect("format").as_str(), "%.12f %e");
    }

    #[test]
    fn full_config_maps_onto_the_request() {
        let source = r#"{
            "profile": "voigt",
            "parametrization": "priority",
            "tables": ["lines.json"],
            "components": [{"molecule": 2, "isotopologue": 1, "abundance": 0.5}],
            "environment": {"temperature": 250.0, "pressure": 0.5},
            "diluent": {"air": 0.8, "self": 0.2},
            "wavenumbers": {"range": [2340.0, 2360.0], "step": 0.002},
            "wing": 1.0,
            "line_mixing": true,
            "exclude": ["NuVC"],
            "cpf": {"kind": "humlicek"},
            "execution": "parallel"
        }"#;
        let config = RunConfig::from_json_str(source, "inline").expect("config");
        let request = config.to_request().expect("request");

        assert_eq!(request.line_shape, Some(LineShape::Voigt));
        assert_eq!(request.parametrization, Some(Parametrization::Priority));
        assert_eq!(request.components[0].abundance, Some(0.5));
        assert_eq!(request.environment.pressure, 0.5);
        assert_eq!(request.diluent.len(), 2);
        assert_eq!(
            request.wavenumbers,
            WavenumberSpec::Uniform {
                range: Some((2340.0, 2360.0)),
                step: 0.002
            }
        );
        assert_eq!(request.absolute_wing, 1.0);
        assert!(request.line_mixing);
        assert!(request.exclude.contains(&ProfileParameter::NuVc));
        assert_eq!(request.cpf, CpfKind::Humlicek);
        assert_eq!(request.execution, ExecutionMode::Parallel);
        assert_eq!(config.profile, Some(ProfileKind::Voigt));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        let error = RunConfig::from_json_str(r#"{"tables": [], "tempo": 1}"#, "inline")
            .expect_err("unknown key");
        assert!(matches!(error, ConfigError::Parse { .. }));

        let config = RunConfig::from_json_str(
            r#"{"tables": [], "diluent": {"air": 1.5}}"#,
            "inline",
        )
        .expect("config");
        assert!(matches!(
            config.to_request(),
            Err(ConfigError::Invalid { field: "diluent", .. })
        ));

        let config = RunConfig::from_json_str(
            r#"{"tables": [], "wavenumbers": {"range": [1.0, 2.0], "grid": [1.0]}}"#,
            "inline",
        )
        .expect("config");
        assert!(matches!(
            config.to_request(),
            Err(ConfigError::Invalid { field: "wavenumbers", .. })
        ));
    }

    #[test]
    fn builds_collaborators_and_resolves_paths() {
        let source = r#"{
            "tables": ["lines.json", "/abs/lines.json"],
            "partition_sums": [
                {
                    "molecule": 2,
                    "isotopologue": 1,
                    "temperatures": [200.0, 300.0],
                    "values": [200.0, 300.0]
                }
            ],
            "isotopologues": [
                {"molecule": 99, "isotopologue": 1, "natural_abundance": 1.0, "molar_mass": 10.0}
            ]
        }"#;
        let config = RunConfig::from_json_str(source, "inline").expect("config");
        let partition = config.partition_function().expect("partition");
        let q = partition.partition_sum(2, 1, 250.0).expect("q");
        assert!((q - 250.0).abs() < 1.0e-12);
        assert!(config.catalog().isotopologue(99, 1).is_some());

        let paths = config.table_paths(Path::new("/data"));
        assert_eq!(paths[0], Path::new("/data/lines.json"));
        assert_eq!(paths[1], Path::new("/abs/lines.json"));
    }

    #[test]
    fn loads_from_disk() {
        let directory = tempfile::tempdir().expect("tempdir");
        let path = directory.path().join("run.json");
        fs::write(&path, r#"{"tables": ["a.json"], "profile": "ht"}"#).expect("write");
        let config = load_run_config(&path).expect("config");
        assert_eq!(config.profile, Some(ProfileKind::Ht));

        let missing = load_run_config(directory.path().join("absent.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
