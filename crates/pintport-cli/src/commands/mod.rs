mod config;
mod sources;

use pintport_core::Config;
use serde_json::Value;

use crate::cli::{Cli, Command, SourcesCommand};
use crate::error::CliError;

#[derive(Debug)]
pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

pub fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(pintport_core::default_config_path);
    let loaded = Config::load_from(&path)?;

    match &cli.command {
        Command::Config => config::run(&path, &loaded),
        Command::Sources(args) => match &args.command {
            SourcesCommand::Validate(args) => sources::validate(args, &loaded),
        },
    }
}
