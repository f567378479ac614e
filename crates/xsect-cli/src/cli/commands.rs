use super::CliError;
use super::helpers::{PreparedRun, ensure_parent_dir, print_summary, write_trace};
use std::path::PathBuf;
use tracing::{debug, info};
use xsect_core::domain::{AbsorptionUnits, XsectError};
use xsect_core::synthesis::{DEFAULT_PATH_LENGTH, SpectrumKind, save_columns};

#[derive(clap::Args)]
pub(super) struct AbscoefArgs {
    /// Run configuration (JSON)
    #[arg(short, long, default_value = "xsect.json")]
    config: PathBuf,

    /// Two-column output file
    #[arg(short, long, default_value = "abscoef.txt")]
    output: PathBuf,

    /// Row format overriding the config, e.g. "%.12f %e"
    #[arg(long)]
    format: Option<String>,

    /// Write per-line parameter traces as JSON
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Skip lines whose parameters cannot be resolved instead of failing
    #[arg(long)]
    suppress_line_errors: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub(super) enum SpectrumArg {
    Transmittance,
    Absorption,
    Radiance,
}

impl From<SpectrumArg> for SpectrumKind {
    fn from(kind: SpectrumArg) -> Self {
        match kind {
            SpectrumArg::Transmittance => Self::Transmittance,
            SpectrumArg::Absorption => Self::Absorption,
            SpectrumArg::Radiance => Self::Radiance,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct SpectrumArgs {
    /// Run configuration (JSON)
    #[arg(short, long, default_value = "xsect.json")]
    config: PathBuf,

    /// Two-column output file
    #[arg(short, long, default_value = "spectrum.txt")]
    output: PathBuf,

    /// Derived quantity
    #[arg(long, value_enum, default_value = "transmittance")]
    kind: SpectrumArg,

    /// Optical path length in cm
    #[arg(long, default_value_t = DEFAULT_PATH_LENGTH)]
    path_length: f64,

    /// Row format overriding the config
    #[arg(long)]
    format: Option<String>,
}

pub(super) fn run_abscoef_command(args: AbscoefArgs) -> Result<i32, CliError> {
    let mut run = PreparedRun::load(&args.config, args.format.as_deref())?;
    run.request.suppress_line_errors |= args.suppress_line_errors;
    run.request.capture_trace = args.trace.is_some();

    let spectrum = run.compute()?;
    ensure_parent_dir(&args.output)?;
    spectrum
        .save(&args.output, &run.format)
        .map_err(XsectError::from)?;
    if let Some(trace) = &args.trace {
        write_trace(trace, &spectrum)?;
    }

    info!(output = %args.output.display(), "absorption coefficient written");
    print_summary("abscoef", &spectrum, &args.output, args.trace.as_ref());
    Ok(0)
}

pub(super) fn run_spectrum_command(args: SpectrumArgs) -> Result<i32, CliError> {
    let mut run = PreparedRun::load(&args.config, args.format.as_deref())?;
    if run.request.units != AbsorptionUnits::Coefficient {
        debug!("derived spectra need a coefficient in cm-1; switching units");
        run.request.units = AbsorptionUnits::Coefficient;
    }

    let spectrum = run.compute()?;
    let kind = SpectrumKind::from(args.kind);
    let values = spectrum
        .derive(kind, args.path_length, run.request.environment.temperature)
        .map_err(XsectError::from)?;

    ensure_parent_dir(&args.output)?;
    save_columns(&args.output, &run.format, &spectrum.wavenumbers, &values)
        .map_err(XsectError::from)?;

    info!(
        kind = kind.as_str(),
        path_length = args.path_length,
        output = %args.output.display(),
        "spectrum written"
    );
    print_summary(kind.as_str(), &spectrum, &args.output, None);
    Ok(0)
}
