//! `vellum`: the thin `from`/`to`/`silent` manifest conversion entry point
//! this core is invoked through. No package-manager commands
//! (install/update/etc.) live here — only the conversion surface.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod context;
mod formats;

use clap::Parser;
use context::CliRepositoryContext;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use vellum_converters::{convert, ConvertError};
use vellum_core::Environment;

/// Convert a dependency manifest from one format to another, resolving
/// against a package index when the conversion crosses the lock boundary.
#[derive(Parser, Debug)]
#[command(name = "vellum", version, about, propagate_version = true)]
struct Cli {
    /// Source format name (see `--list-formats`).
    #[arg(long = "from-format", value_name = "FORMAT")]
    from_format: String,

    /// Path to the source manifest.
    #[arg(long = "from-path", value_name = "PATH")]
    from_path: PathBuf,

    /// Target format name.
    #[arg(long = "to-format", value_name = "FORMAT")]
    to_format: String,

    /// Path to write the converted manifest to, or `-` for stdout.
    #[arg(long = "to-path", value_name = "PATH")]
    to_path: PathBuf,

    /// Suppress resolver progress reporting. Never suppresses `tracing`
    /// output, only the progress surface this binary would otherwise print.
    #[arg(short, long)]
    silent: bool,

    /// Path to a `vellum` config file; defaults to the platform config
    /// directory.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the list of supported format names and exit.
    #[arg(long)]
    list_formats: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list_formats {
        for name in formats::FORMAT_NAMES {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            exit_code_for(&err)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).without_time().init();
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("reading --config file: {0}")]
    Config(#[from] vellum_config::ConfigError),
    #[error("unknown --from-format: {0}")]
    UnknownFromFormat(String),
    #[error("unknown --to-format: {0}")]
    UnknownToFormat(String),
    #[error("reading --from-path {path}: {source}")]
    ReadFrom { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("writing --to-path {path}: {source}")]
    WriteTo { path: PathBuf, source: std::io::Error },
}

fn exit_code_for(err: &CliError) -> ExitCode {
    match err {
        CliError::Convert(ConvertError::Resolve(vellum_core::error::Error::Conflict(_))) => ExitCode::from(2),
        CliError::Convert(ConvertError::Resolve(vellum_core::error::Error::Cancelled)) => ExitCode::from(130),
        _ => ExitCode::FAILURE,
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = vellum_config::ConfigLoader::new(cli.config.clone().or_else(vellum_config::default_config_path))
        .resolve()?;

    let from = formats::by_name(&cli.from_format).map_err(CliError::UnknownFromFormat)?;
    let to = formats::by_name(&cli.to_format).map_err(CliError::UnknownToFormat)?;

    let from_text = std::fs::read_to_string(&cli.from_path).map_err(|source| CliError::ReadFrom {
        path: cli.from_path.clone(),
        source,
    })?;

    let project = from.loads(&from_text).map_err(|e| CliError::Convert(ConvertError::Load(e)))?;
    let repos = CliRepositoryContext::build(&project, &config);
    let env = Environment::current();

    let output = convert(from.as_ref(), &from_text, to.as_ref(), &repos, &env, cli.silent)?;

    if cli.to_path.as_os_str() == "-" {
        print!("{output}");
    } else {
        std::fs::write(&cli.to_path, output).map_err(|source| CliError::WriteTo {
            path: cli.to_path.clone(),
            source,
        })?;
    }

    Ok(())
}
