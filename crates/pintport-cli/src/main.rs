mod cli;
mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Env, Target};

use crate::cli::Cli;
use crate::error::CliError;

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let result = commands::run(&cli)?;
    output::render(&result, cli.format, cli.pretty)?;

    if cli.strict && !result.warnings.is_empty() {
        return Err(CliError::StrictModeViolation {
            warning_count: result.warnings.len(),
        });
    }

    Ok(())
}

fn init_logging() {
    let env = Env::default()
        .filter_or("PINTPORT_LOG", "warn")
        .write_style("PINTPORT_LOG_STYLE");

    // stdout carries command output; keep logs on stderr.
    Builder::from_env(env).target(Target::Stderr).init();
}
