//! CLI argument definitions for pintport.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `config` | Show where configuration is read from and which providers have keys |
//! | `sources validate` | Load a source manifest and print the ids the list assigns |
//!
//! # Examples
//!
//! ```bash
//! pintport config
//! pintport sources validate gbp.json --pretty
//! pintport sources validate gbp.json --policy monotonic --format table
//! pintport sources validate gbp.json --policy monotonic --high-water-mark 12
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pintport_core::IdPolicy;

/// Price-source registry for a security.
#[derive(Debug, Parser)]
#[command(name = "pintport", author, version, about = "Price-source registry tools")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Read configuration from this file instead of ~/.pintport/config.json.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing.
    Table,
    /// Single JSON object output.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the configuration file location and configured providers.
    ///
    /// API keys themselves are never printed.
    Config,

    /// Source manifest commands.
    Sources(SourcesArgs),
}

/// Arguments for the `sources` command group.
#[derive(Debug, Args)]
pub struct SourcesArgs {
    #[command(subcommand)]
    pub command: SourcesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SourcesCommand {
    /// Build a source list from a JSON manifest and report the assigned ids.
    ///
    /// The manifest is an array of objects with `provider`, `query` and
    /// optional `symbol`, `exchange`, `currency`, `name` and `id` fields.
    Validate(ValidateArgs),
}

/// Arguments for `sources validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to the manifest file.
    pub manifest: PathBuf,

    /// How ids are chosen for entries without one.
    #[arg(long, value_enum, default_value_t = PolicyArg::HighWaterMark)]
    pub policy: PolicyArg,

    /// Highest id handed out by an earlier version of this list.
    ///
    /// Only the monotonic policy honours it; new ids start above it.
    #[arg(long, value_name = "ID")]
    pub high_water_mark: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// One past the highest id among current members.
    HighWaterMark,
    /// One past the highest id ever held.
    Monotonic,
}

impl From<PolicyArg> for IdPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::HighWaterMark => Self::HighWaterMark,
            PolicyArg::Monotonic => Self::Monotonic,
        }
    }
}
