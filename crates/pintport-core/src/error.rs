use std::path::PathBuf;

use thiserror::Error;

use crate::SourceId;

/// Field-level validation errors for source descriptors and timestamps.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },

    #[error("currency must be a 3-letter uppercase ISO code: '{value}'")]
    InvalidCurrency { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
}

/// Rejections raised by `SourceList` mutators.
///
/// Every variant is returned before the live list is touched, so the
/// collection is unchanged whenever one of these comes back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceListError {
    #[error("member at index {index} is not a well-formed source: {reason}")]
    InvalidMember {
        index: usize,
        reason: ValidationError,
    },

    #[error("duplicate source id {id}")]
    DuplicateId { id: SourceId },

    #[error("duplicate source key (query='{query}', symbol={symbol:?})")]
    DuplicateKey {
        query: String,
        symbol: Option<String>,
    },

    #[error("index {index} is out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("source id space exhausted")]
    IdOverflow,
}

impl SourceListError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidMember { .. } => "source_list.invalid_member",
            Self::DuplicateId { .. } => "source_list.duplicate_id",
            Self::DuplicateKey { .. } => "source_list.duplicate_key",
            Self::IndexOutOfRange { .. } => "source_list.index_out_of_range",
            Self::IdOverflow => "source_list.id_overflow",
        }
    }
}

/// Failures while reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
