use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    SourceList(#[from] pintport_core::SourceListError),

    #[error(transparent)]
    Config(#[from] pintport_core::ConfigError),

    #[error("invalid manifest '{path}': {source}")]
    Manifest {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("strict mode failed: warnings={warning_count}")]
    StrictModeViolation { warning_count: usize },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::SourceList(_) | Self::Manifest { .. } => 2,
            Self::StrictModeViolation { .. } => 5,
            Self::Config(_) | Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
