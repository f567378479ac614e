//! Line-by-line synthesis of absorption coefficients.
//!
//! Every selected line is scaled to the requested environment, its profile
//! parameters are resolved through the preset ladder, and its shape is
//! evaluated on the part of the grid within its wing and added into the
//! output. Parallel runs split each table into chunks that own partial
//! accumulators, merged in chunk order.

pub mod output;
pub mod request;
pub mod spectra;

pub use output::{DEFAULT_ROW_FORMAT, OutputError, RowFormat, save_columns, write_columns};
pub use request::{CancellationToken, SynthesisRequest, WavenumberSpec};
pub use spectra::{
    DEFAULT_PATH_LENGTH, SpectrumError, SpectrumKind, derive_spectrum, volume_concentration,
};

use crate::common::catalog::{CatalogError, IsotopologueCatalog, PartitionFunction};
use crate::common::constants::FALLBACK_WING;
use crate::domain::{AbsorptionUnits, Component, Diluent, DiluentError, ExecutionMode, XsectError};
use crate::lines::{
    CoreColumns, LadderError, LineContext, LineSource, LineTableError, LineTrace,
    ParameterCalculator, ProfileParameter, doppler_half_width, line_intensity,
    references_broadener,
};
use crate::numerics::cpf::{ComplexProbabilityFunction, CpfError};
use crate::numerics::lineshape::{LineShape, ProfileError};
use crate::numerics::{GridError, max_spacing, robust_arange, sorted_grid, window_bounds};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Smallest number of lines handed to one parallel task.
pub const MIN_CHUNK_LINES: usize = 256;
/// Upper bound on partial accumulators per table in parallel mode.
pub const MAX_PARTIALS: usize = 64;

/// Broadeners that need no table column to be accepted.
const STANDARD_BROADENERS: [&str; 2] = ["air", "self"];

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error(transparent)]
    Table(#[from] LineTableError),
    #[error(transparent)]
    Ladder(#[from] LadderError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("no line shape was supplied")]
    MissingLineShape,
    #[error("no parametrization was supplied for the line shape")]
    MissingParametrization,
    #[error("no source tables were supplied")]
    NoSourceTables,
    #[error(transparent)]
    Diluent(#[from] DiluentError),
    #[error("broadener '{broadener}' is not referenced by any column of the source tables")]
    UnknownBroadener { broadener: String },
    #[error("isotopologue ({molecule}, {isotopologue}) is not in the catalog")]
    UnknownIsotopologue { molecule: u32, isotopologue: u32 },
    #[error("{name} must be {requirement}, got {value}")]
    InvalidSetting {
        name: &'static str,
        requirement: &'static str,
        value: f64,
    },
    #[error("cannot infer a wavenumber range: the source tables hold no line centres")]
    EmptyRange,
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Table(#[from] LineTableError),
    #[error(transparent)]
    Ladder(#[from] LadderError),
    #[error(transparent)]
    Cpf(#[from] CpfError),
    #[error("line {row} of table '{table}': {source}")]
    Line {
        table: String,
        row: usize,
        source: LineError,
    },
    #[error("synthesis was cancelled")]
    Cancelled,
}

impl From<SynthesisError> for XsectError {
    fn from(error: SynthesisError) -> Self {
        let message = error.to_string();
        match error {
            SynthesisError::Diluent(_) | SynthesisError::UnknownBroadener { .. } => {
                Self::input_validation("INPUT.DILUENT", message)
            }
            SynthesisError::EmptyRange | SynthesisError::Grid(_) => {
                Self::input_validation("INPUT.GRID", message)
            }
            SynthesisError::Table(_) => Self::input_validation("INPUT.TABLE", message),
            SynthesisError::MissingLineShape
            | SynthesisError::MissingParametrization
            | SynthesisError::NoSourceTables
            | SynthesisError::UnknownIsotopologue { .. }
            | SynthesisError::InvalidSetting { .. }
            | SynthesisError::Cpf(_) => Self::input_validation("INPUT.CONFIG", message),
            SynthesisError::Ladder(_) => Self::internal("RUN.PRESET", message),
            SynthesisError::Line {
                source: LineError::Ladder(_),
                ..
            } => Self::computation("RUN.LADDER", message),
            SynthesisError::Line { .. } => Self::computation("RUN.LINE", message),
            SynthesisError::Cancelled => Self::computation("RUN.CANCELLED", message),
        }
    }
}

/// Non-fatal conditions, logged and returned with the spectrum.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SynthesisWarning {
    CoarseStep { step: f64, threshold: f64 },
    DefaultWing { table: String, row: usize, wing: f64 },
    LineSkipped { table: String, row: usize, reason: String },
}

impl Display for SynthesisWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CoarseStep { step, threshold } => write!(
                f,
                "wavenumber step {step} exceeds {threshold}: possible accuracy decline"
            ),
            Self::DefaultWing { table, row, wing } => write!(
                f,
                "line {row} of table '{table}' has no Gamma0 or GammaD; using a {wing} cm-1 wing"
            ),
            Self::LineSkipped { table, row, reason } => {
                write!(f, "line {row} of table '{table}' skipped: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbsorptionSpectrum {
    pub wavenumbers: Vec<f64>,
    pub coefficient: Vec<f64>,
    pub units: AbsorptionUnits,
    pub lines_used: usize,
    pub lines_skipped: usize,
    pub warnings: Vec<SynthesisWarning>,
    pub traces: Vec<LineTrace>,
}

impl AbsorptionSpectrum {
    pub fn derive(
        &self,
        kind: SpectrumKind,
        path_length: f64,
        temperature: f64,
    ) -> Result<Vec<f64>, SpectrumError> {
        derive_spectrum(
            kind,
            &self.wavenumbers,
            &self.coefficient,
            path_length,
            temperature,
        )
    }

    pub fn save(&self, path: impl AsRef<Path>, format: &RowFormat) -> Result<(), OutputError> {
        save_columns(path, format, &self.wavenumbers, &self.coefficient)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResolvedComponent {
    abundance_ratio: f64,
    molar_mass: f64,
}

/// Runs requests against a catalog and a partition function.
pub struct Synthesizer<'a> {
    catalog: &'a dyn IsotopologueCatalog,
    partition: &'a dyn PartitionFunction,
}

impl<'a> Synthesizer<'a> {
    pub fn new(catalog: &'a dyn IsotopologueCatalog, partition: &'a dyn PartitionFunction) -> Self {
        Self { catalog, partition }
    }

    pub fn run(
        &self,
        request: &SynthesisRequest,
        sources: &[&dyn LineSource],
    ) -> Result<AbsorptionSpectrum, SynthesisError> {
        let started = Instant::now();
        let line_shape = request.line_shape.ok_or(SynthesisError::MissingLineShape)?;
        let parametrization = request
            .parametrization
            .ok_or(SynthesisError::MissingParametrization)?;
        if sources.is_empty() {
            return Err(SynthesisError::NoSourceTables);
        }
        validate_settings(request)?;

        let diluent = if request.diluent.is_empty() {
            Diluent::from_broadening_default(&request.broadening_default)?
        } else {
            request.diluent.clone()
        };
        if parametrization.needs_diluent() {
            check_broadeners(&diluent, sources)?;
        }

        let cores = sources
            .iter()
            .map(|source| CoreColumns::resolve(*source))
            .collect::<Result<Vec<_>, _>>()?;
        let components = self.resolve_components(&request.components, sources, &cores)?;
        let (grid, step) = build_grid(&request.wavenumbers, sources, &cores)?;

        let mut warnings = Vec::new();
        if let Some(step) = step {
            let threshold = line_shape.coarse_step_threshold();
            if step > threshold {
                warn!(step, threshold, "big wavenumber step: possible accuracy decline");
                warnings.push(SynthesisWarning::CoarseStep { step, threshold });
            }
        }

        let factor = match request.units {
            AbsorptionUnits::CrossSection => 1.0,
            AbsorptionUnits::Coefficient => volume_concentration(
                request.environment.pressure,
                request.environment.temperature,
            ),
        };
        let cpf = request.cpf.build()?;
        let exclude = request.effective_exclusions();

        let mut coefficient = vec![0.0; grid.len()];
        let mut tally = Tally {
            warnings,
            ..Tally::default()
        };
        for (source, core) in sources.iter().zip(&cores) {
            if request.is_cancelled() {
                return Err(SynthesisError::Cancelled);
            }
            let calculator = ParameterCalculator::compile(
                parametrization,
                &exclude,
                &diluent,
                *source,
                &request.environment,
            )?;
            let table = TableRun {
                request,
                source: *source,
                core,
                calculator,
                components: &components,
                line_shape,
                cpf: cpf.as_ref(),
                partition: self.partition,
                grid: &grid,
            };
            debug!(
                table = source.name(),
                rows = source.row_count(),
                profile = %line_shape,
                "synthesizing table"
            );
            match request.execution {
                ExecutionMode::Serial => table.run_serial(&mut coefficient, factor, &mut tally)?,
                ExecutionMode::Parallel => {
                    table.run_parallel(&mut coefficient, factor, &mut tally)?
                }
            }
        }

        info!(
            lines_used = tally.used,
            lines_skipped = tally.skipped,
            points = grid.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "absorption coefficient computed"
        );

        Ok(AbsorptionSpectrum {
            wavenumbers: grid,
            coefficient,
            units: request.units,
            lines_used: tally.used,
            lines_skipped: tally.skipped,
            warnings: tally.warnings,
            traces: tally.traces,
        })
    }

    fn resolve_components(
        &self,
        requested: &[Component],
        sources: &[&dyn LineSource],
        cores: &[CoreColumns],
    ) -> Result<BTreeMap<(u32, u32), ResolvedComponent>, SynthesisError> {
        let components: Vec<Component> = if requested.is_empty() {
            let mut pairs = BTreeSet::new();
            for (source, core) in sources.iter().zip(cores) {
                pairs.extend((0..source.row_count()).filter_map(|row| core.species(*source, row)));
            }
            pairs
                .into_iter()
                .map(|(molecule, isotopologue)| Component::new(molecule, isotopologue))
                .collect()
        } else {
            requested.to_vec()
        };

        let mut resolved = BTreeMap::new();
        for component in components {
            let info = self
                .catalog
                .isotopologue(component.molecule, component.isotopologue)
                .ok_or(SynthesisError::UnknownIsotopologue {
                    molecule: component.molecule,
                    isotopologue: component.isotopologue,
                })?;
            let abundance = component.abundance.unwrap_or(info.natural_abundance);
            resolved.insert(
                (component.molecule, component.isotopologue),
                ResolvedComponent {
                    abundance_ratio: abundance / info.natural_abundance,
                    molar_mass: info.molar_mass,
                },
            );
        }
        Ok(resolved)
    }
}

fn validate_settings(request: &SynthesisRequest) -> Result<(), SynthesisError> {
    let environment = &request.environment;
    let checks = [
        ("temperature", "finite and > 0", environment.temperature, environment.temperature > 0.0),
        ("pressure", "finite and >= 0", environment.pressure, environment.pressure >= 0.0),
        (
            "reference temperature",
            "finite and > 0",
            environment.reference_temperature,
            environment.reference_temperature > 0.0,
        ),
        ("absolute wing", "finite and >= 0", request.absolute_wing, request.absolute_wing >= 0.0),
        ("relative wing", "finite and >= 0", request.relative_wing, request.relative_wing >= 0.0),
        (
            "intensity threshold",
            "finite",
            request.intensity_threshold,
            true,
        ),
    ];
    for (name, requirement, value, valid) in checks {
        if !value.is_finite() || !valid {
            return Err(SynthesisError::InvalidSetting {
                name,
                requirement,
                value,
            });
        }
    }
    Ok(())
}

fn check_broadeners(diluent: &Diluent, sources: &[&dyn LineSource]) -> Result<(), SynthesisError> {
    for (broadener, _) in diluent.iter() {
        let standard = STANDARD_BROADENERS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(broadener));
        if !standard
            && !sources
                .iter()
                .any(|source| references_broadener(*source, broadener))
        {
            return Err(SynthesisError::UnknownBroadener {
                broadener: broadener.to_string(),
            });
        }
    }
    Ok(())
}

/// The grid and the step used for the accuracy check.
fn build_grid(
    spec: &WavenumberSpec,
    sources: &[&dyn LineSource],
    cores: &[CoreColumns],
) -> Result<(Vec<f64>, Option<f64>), SynthesisError> {
    match spec {
        WavenumberSpec::Explicit(values) => {
            let grid = sorted_grid(values)?;
            let step = max_spacing(&grid);
            Ok((grid, step))
        }
        WavenumberSpec::Uniform { range, step } => {
            let (lower, upper) = match range {
                Some(range) => *range,
                None => center_span(sources, cores).ok_or(SynthesisError::EmptyRange)?,
            };
            Ok((robust_arange(lower, upper, *step)?, Some(*step)))
        }
    }
}

fn center_span(sources: &[&dyn LineSource], cores: &[CoreColumns]) -> Option<(f64, f64)> {
    sources
        .iter()
        .zip(cores)
        .flat_map(|(source, core)| {
            (0..source.row_count()).filter_map(move |row| core.center(*source, row))
        })
        .fold(None, |span, nu| match span {
            None => Some((nu, nu)),
            Some((lower, upper)) => Some((f64::min(lower, nu), f64::max(upper, nu))),
        })
}

#[derive(Debug, Default)]
struct Tally {
    used: usize,
    skipped: usize,
    warnings: Vec<SynthesisWarning>,
    traces: Vec<LineTrace>,
}

impl Tally {
    fn merge(&mut self, other: Tally) {
        self.used += other.used;
        self.skipped += other.skipped;
        self.warnings.extend(other.warnings);
        self.traces.extend(other.traces);
    }
}

/// Profile values of one line and the grid index they start at.
struct Contribution {
    start: usize,
    values: Vec<f64>,
}

/// Accumulator covering only the grid span touched by one chunk of lines.
#[derive(Debug, Default)]
struct Partial {
    start: usize,
    values: Vec<f64>,
}

impl Partial {
    fn add(&mut self, start: usize, values: &[f64], factor: f64) {
        if values.is_empty() {
            return;
        }
        let end = start + values.len();
        if self.values.is_empty() {
            self.start = start;
            self.values = vec![0.0; values.len()];
        } else {
            if start < self.start {
                let grow = self.start - start;
                self.values.splice(0..0, std::iter::repeat_n(0.0, grow));
                self.start = start;
            }
            if end > self.start + self.values.len() {
                self.values.resize(end - self.start, 0.0);
            }
        }
        let offset = start - self.start;
        for (slot, &value) in self.values[offset..offset + values.len()]
            .iter_mut()
            .zip(values)
        {
            *slot += factor * value;
        }
    }

    fn merge_into(&self, accumulator: &mut [f64]) {
        for (slot, &value) in accumulator[self.start..self.start + self.values.len()]
            .iter_mut()
            .zip(&self.values)
        {
            *slot += value;
        }
    }
}

struct TableRun<'r> {
    request: &'r SynthesisRequest,
    source: &'r dyn LineSource,
    core: &'r CoreColumns,
    calculator: ParameterCalculator,
    components: &'r BTreeMap<(u32, u32), ResolvedComponent>,
    line_shape: LineShape,
    cpf: &'r dyn ComplexProbabilityFunction,
    partition: &'r dyn PartitionFunction,
    grid: &'r [f64],
}

impl TableRun<'_> {
    fn run_serial(
        &self,
        accumulator: &mut [f64],
        factor: f64,
        tally: &mut Tally,
    ) -> Result<(), SynthesisError> {
        for row in 0..self.source.row_count() {
            if self.request.is_cancelled() {
                return Err(SynthesisError::Cancelled);
            }
            if let Some(contribution) = self.line(row, tally)? {
                let end = contribution.start + contribution.values.len();
                for (slot, &value) in accumulator[contribution.start..end]
                    .iter_mut()
                    .zip(&contribution.values)
                {
                    *slot += factor * value;
                }
            }
        }
        Ok(())
    }

    fn run_parallel(
        &self,
        accumulator: &mut [f64],
        factor: f64,
        tally: &mut Tally,
    ) -> Result<(), SynthesisError> {
        let rows = self.source.row_count();
        let chunk_len = MIN_CHUNK_LINES.max(rows.div_ceil(MAX_PARTIALS));
        let chunks = rows.div_ceil(chunk_len);

        let results: Vec<Result<(Partial, Tally), SynthesisError>> = (0..chunks)
            .into_par_iter()
            .map(|chunk| {
                let mut partial = Partial::default();
                let mut chunk_tally = Tally::default();
                let first = chunk * chunk_len;
                for row in first..rows.min(first + chunk_len) {
                    if self.request.is_cancelled() {
                        return Err(SynthesisError::Cancelled);
                    }
                    if let Some(contribution) = self.line(row, &mut chunk_tally)? {
                        partial.add(contribution.start, &contribution.values, factor);
                    }
                }
                Ok((partial, chunk_tally))
            })
            .collect();

        for result in results {
            let (partial, chunk_tally) = result?;
            partial.merge_into(accumulator);
            tally.merge(chunk_tally);
        }
        Ok(())
    }

    /// Applies the suppression policy to one line.
    fn line(&self, row: usize, tally: &mut Tally) -> Result<Option<Contribution>, SynthesisError> {
        match self.contribute(row, tally) {
            Ok(contribution) => Ok(contribution),
            Err(error) if self.request.suppress_line_errors => {
                let table = self.source.name().to_string();
                warn!(table = %table, row, %error, "line skipped");
                tally.skipped += 1;
                tally.warnings.push(SynthesisWarning::LineSkipped {
                    table,
                    row,
                    reason: error.to_string(),
                });
                Ok(None)
            }
            Err(source) => Err(SynthesisError::Line {
                table: self.source.name().to_string(),
                row,
                source,
            }),
        }
    }

    fn contribute(&self, row: usize, tally: &mut Tally) -> Result<Option<Contribution>, LineError> {
        let fields = self.core.read(self.source, row)?;
        let Some(component) = self.components.get(&(fields.molecule, fields.isotopologue)) else {
            tally.skipped += 1;
            return Ok(None);
        };

        let environment = &self.request.environment;
        let partition_sum = self.partition_sum(
            fields.molecule,
            fields.isotopologue,
            environment.temperature,
        )?;
        let reference_partition_sum = self.partition_sum(
            fields.molecule,
            fields.isotopologue,
            environment.reference_temperature,
        )?;
        let sw = line_intensity(
            fields.sw,
            fields.nu,
            fields.elower,
            environment.temperature,
            environment.reference_temperature,
            partition_sum,
            reference_partition_sum,
        ) * component.abundance_ratio;
        if sw < self.request.intensity_threshold {
            tally.skipped += 1;
            return Ok(None);
        }

        let gamma_d = if self
            .calculator
            .parametrization()
            .uses(ProfileParameter::GammaD)
        {
            doppler_half_width(fields.nu, environment.temperature, component.molar_mass)
        } else {
            0.0
        };
        let line = LineContext {
            nu: fields.nu,
            sw,
            gamma_d,
        };
        let calculated = self
            .calculator
            .calculate(self.source, row, line, self.request.capture_trace)?;

        let half_width = calculated.parameters.max_half_width();
        let wing = if half_width == 0.0 && self.request.absolute_wing == 0.0 {
            warn!(
                table = self.source.name(),
                row,
                wing = FALLBACK_WING,
                "Gamma0 and GammaD are missing; using the default wing"
            );
            tally.warnings.push(SynthesisWarning::DefaultWing {
                table: self.source.name().to_string(),
                row,
                wing: FALLBACK_WING,
            });
            FALLBACK_WING
        } else {
            self.request
                .absolute_wing
                .max(self.request.relative_wing * half_width)
        };

        let (start, end) = window_bounds(self.grid, fields.nu - wing, fields.nu + wing);
        let values = if start < end {
            self.line_shape
                .evaluate(&calculated.parameters, &self.grid[start..end], self.cpf)?
        } else {
            Vec::new()
        };

        tally.used += 1;
        if let Some(parameters) = calculated.trace {
            tally.traces.push(LineTrace {
                table: self.source.name().to_string(),
                row,
                molecule: fields.molecule,
                isotopologue: fields.isotopologue,
                nu: fields.nu,
                sw,
                partition_sum,
                reference_partition_sum,
                wing,
                parameters,
            });
        }
        Ok(Some(Contribution { start, values }))
    }

    fn partition_sum(
        &self,
        molecule: u32,
        isotopologue: u32,
        temperature: f64,
    ) -> Result<f64, CatalogError> {
        let value = self
            .partition
            .partition_sum(molecule, isotopologue, temperature)?;
        if !value.is_finite() || value <= 0.0 {
            return Err(CatalogError::NonPositivePartitionSum { temperature, value });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Partial, SynthesisError, SynthesisRequest, SynthesisWarning, Synthesizer};
    use crate::common::catalog::BuiltinCatalog;
    use crate::domain::{Diluent, ProfileKind, XsectError, XsectErrorCategory};
    use crate::lines::{LineSource, LineTable, Parametrization};
    use crate::numerics::lineshape::LineShape;

    fn unit_partition(_: u32, _: u32, _: f64) -> f64 {
        1.0
    }

    fn single_line(columns: &[(&str, f64)]) -> LineTable {
        let base = [
            ("molec_id", 2.0),
            ("local_iso_id", 1.0),
            ("nu", 1000.0),
            ("sw", 1.0e-20),
            ("elower", 0.0),
        ];
        base.iter()
            .chain(columns)
            .try_fold(LineTable::new("line"), |table, (name, value)| {
                table.with_values(*name, &[*value])
            })
            .expect("table")
    }

    #[test]
    fn partial_grows_in_both_directions() {
        let mut partial = Partial::default();
        partial.add(5, &[1.0, 1.0], 2.0);
        partial.add(3, &[1.0], 1.0);
        partial.add(6, &[1.0, 1.0, 1.0], 1.0);
        assert_eq!(partial.start, 3);
        assert_eq!(partial.values, vec![1.0, 0.0, 2.0, 3.0, 1.0, 1.0]);

        let mut accumulator = vec![0.0; 10];
        partial.merge_into(&mut accumulator);
        assert_eq!(accumulator[5], 2.0);
        assert_eq!(accumulator[9], 0.0);
    }

    #[test]
    fn missing_shape_or_parametrization_is_a_configuration_error() {
        let catalog = BuiltinCatalog::new();
        let synthesizer = Synthesizer::new(&catalog, &unit_partition);
        let table = single_line(&[("gamma_air", 0.05), ("n_air", 0.7)]);
        let sources: [&dyn LineSource; 1] = [&table];

        let error = synthesizer
            .run(&SynthesisRequest::default(), &sources)
            .expect_err("no shape");
        assert!(matches!(error, SynthesisError::MissingLineShape));

        let request = SynthesisRequest::default().with_line_shape(LineShape::Voigt);
        let error = synthesizer.run(&request, &sources).expect_err("no parametrization");
        assert!(matches!(error, SynthesisError::MissingParametrization));
        let error = XsectError::from(error);
        assert_eq!(error.category(), XsectErrorCategory::InputValidationError);
        assert_eq!(error.placeholder(), "INPUT.CONFIG");
    }

    #[test]
    fn unknown_broadener_is_rejected_before_any_line() {
        let catalog = BuiltinCatalog::new();
        let synthesizer = Synthesizer::new(&catalog, &unit_partition);
        let table = single_line(&[("gamma_air", 0.05), ("n_air", 0.7)]);
        let request = SynthesisRequest::for_profile(ProfileKind::Lorentz)
            .with_diluent(Diluent::new([("h2", 1.0)]).expect("diluent"));

        let error = synthesizer.run(&request, &[&table]).expect_err("unknown");
        assert!(matches!(error, SynthesisError::UnknownBroadener { broadener } if broadener == "h2"));
    }

    #[test]
    fn default_wing_is_used_when_no_width_is_known() {
        let catalog = BuiltinCatalog::new();
        let synthesizer = Synthesizer::new(&catalog, &unit_partition);
        let table = single_line(&[("gamma_air", 0.0), ("n_air", 0.7)]);
        let request = SynthesisRequest::default()
            .with_line_shape(LineShape::Doppler)
            .with_parametrization(Parametrization::Lorentz)
            .with_range(980.0, 1020.0, 0.5)
            .with_suppressed_line_errors(true);

        let spectrum = synthesizer.run(&request, &[&table]).expect("spectrum");
        assert!(spectrum.warnings.iter().any(|warning| matches!(
            warning,
            SynthesisWarning::DefaultWing { wing, .. } if *wing == 10.0
        )));
        // Doppler evaluation without a Doppler width fails and is suppressed.
        assert_eq!(spectrum.lines_skipped, 1);
        assert!(spectrum.coefficient.iter().all(|value| *value == 0.0));
    }
}
