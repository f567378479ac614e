use super::CliError;
use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;
use xsect_core::common::{BuiltinCatalog, RunConfig, TabulatedPartitionFunction, load_run_config};
use xsect_core::domain::XsectError;
use xsect_core::lines::{LineSource, LineTable, LineTrace};
use xsect_core::synthesis::{
    AbsorptionSpectrum, RowFormat, SynthesisRequest, SynthesisWarning, Synthesizer,
};

/// Everything a subcommand needs, loaded from one config file.
pub(super) struct PreparedRun {
    pub(super) request: SynthesisRequest,
    pub(super) tables: Vec<LineTable>,
    pub(super) catalog: BuiltinCatalog,
    pub(super) partition: TabulatedPartitionFunction,
    pub(super) format: RowFormat,
}

impl PreparedRun {
    pub(super) fn load(config_path: &Path, format: Option<&str>) -> Result<Self, CliError> {
        let config = load_run_config(config_path).map_err(XsectError::from)?;
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_config(&config, base, format)
    }

    fn from_config(
        config: &RunConfig,
        base: &Path,
        format: Option<&str>,
    ) -> Result<Self, CliError> {
        let request = config.to_request().map_err(XsectError::from)?;
        let format = match format {
            Some(format) => format.parse::<RowFormat>().map_err(XsectError::from)?,
            None => config.row_format().map_err(XsectError::from)?,
        };

        let mut tables = Vec::with_capacity(config.tables.len());
        for path in config.table_paths(base) {
            let table = LineTable::from_json_path(&path).map_err(XsectError::from)?;
            info!(
                path = %path.display(),
                table = table.name(),
                rows = table.row_count(),
                "line table loaded"
            );
            tables.push(table);
        }

        Ok(Self {
            request,
            tables,
            catalog: config.catalog(),
            partition: config.partition_function().map_err(XsectError::from)?,
            format,
        })
    }

    pub(super) fn compute(&self) -> Result<AbsorptionSpectrum, CliError> {
        let sources: Vec<&dyn LineSource> = self
            .tables
            .iter()
            .map(|table| table as &dyn LineSource)
            .collect();
        let synthesizer = Synthesizer::new(&self.catalog, &self.partition);
        Ok(synthesizer
            .run(&self.request, &sources)
            .map_err(XsectError::from)?)
    }
}

#[derive(Serialize)]
struct TraceReport<'a> {
    lines_used: usize,
    lines_skipped: usize,
    warnings: &'a [SynthesisWarning],
    lines: &'a [LineTrace],
}

pub(super) fn write_trace(path: &Path, spectrum: &AbsorptionSpectrum) -> Result<(), CliError> {
    ensure_parent_dir(path)?;
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create trace file '{}'", path.display()))?;
    let report = TraceReport {
        lines_used: spectrum.lines_used,
        lines_skipped: spectrum.lines_skipped,
        warnings: &spectrum.warnings,
        lines: &spectrum.traces,
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &report)
        .with_context(|| format!("failed to write trace file '{}'", path.display()))?;
    Ok(())
}

pub(super) fn ensure_parent_dir(path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    Ok(())
}

pub(super) fn print_summary(
    command: &str,
    spectrum: &AbsorptionSpectrum,
    output: &Path,
    trace: Option<&PathBuf>,
) {
    println!(
        "{command}: {} points, {} lines used, {} skipped, {} warnings",
        spectrum.wavenumbers.len(),
        spectrum.lines_used,
        spectrum.lines_skipped,
        spectrum.warnings.len()
    );
    println!("Output: {}", output.display());
    if let Some(trace) = trace {
        println!("Trace: {}", trace.display());
    }
}
