use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use citsv_parser::config::AgencyConfig;
use citsv_parser::convert;
use citsv_parser::error::ConvertError;
use citsv_parser::output::OutputTarget;

/// Convert the CITSV GTFS feed into app data files.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// GTFS feed, as a .zip archive or an unpacked directory
    #[arg(default_value = "input/gtfs.zip")]
    input: PathBuf,

    /// Directory the converted files are written to
    #[arg(default_value = "output")]
    output_dir: PathBuf,

    /// Prefix for every output file name
    #[arg(default_value = "")]
    file_prefix: String,
}

fn run(args: &Args) -> Result<(), ConvertError> {
    let config = AgencyConfig::from_env()?;
    let target = OutputTarget::new(&args.output_dir, args.file_prefix.as_str());
    let today = chrono::Local::now().date_naive();
    convert::run(&args.input, &target, config, today)?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
