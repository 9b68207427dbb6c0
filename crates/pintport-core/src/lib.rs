//! Core contracts for pintport.
//!
//! This crate contains:
//! - `Source` descriptors and the id-stable `SourceList` that orders them
//! - User configuration (`~/.pintport/config.json`) and API key lookup
//! - The time-series provider trait that sources fetch through
//! - Structured validation and list errors

pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod source;
pub mod source_list;

pub use config::{default_config_path, Config};
pub use data_source::{
    ProviderRegistry, SeriesRequest, SourceError, SourceErrorKind, TimeSeriesProvider,
};
pub use domain::{Observation, TimeSeries, UtcDateTime};
pub use error::{ConfigError, SourceListError, ValidationError};
pub use source::{Source, SourceEntry, SourceId, DEFAULT_CURRENCY};
pub use source_list::{FetchAttempt, FetchFailure, FetchSuccess, IdPolicy, SourceList};
