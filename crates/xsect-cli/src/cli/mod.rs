mod commands;
mod helpers;

use crate::logging;
use clap::Parser;
use xsect_core::domain::XsectError;

pub fn run_from_env() -> i32 {
    match parse_and_dispatch(std::env::args().collect()) {
        Ok(code) => code,
        Err(error) => {
            let error = error.as_xsect_error();
            eprintln!("{}", error.diagnostic_line());
            eprintln!("{}", error.fatal_exit_line());
            error.exit_code()
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            logging::init(cli.verbose);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{err}");
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "xsect",
    version,
    about = "Line-by-line absorption cross sections from spectral line tables"
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Compute an absorption coefficient or cross section
    Abscoef(commands::AbscoefArgs),
    /// Compute a transmittance, absorption or radiance spectrum
    Spectrum(commands::SpectrumArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Abscoef(args) => commands::run_abscoef_command(args),
        CliCommand::Spectrum(args) => commands::run_spectrum_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(XsectError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<XsectError> for CliError {
    fn from(error: XsectError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_xsect_error(&self) -> XsectError {
        match self {
            Self::Usage(message) => {
                XsectError::input_validation("INPUT.CLI_USAGE", message.clone())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => XsectError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
