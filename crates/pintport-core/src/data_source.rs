use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::{TimeSeries, UtcDateTime};

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    Unauthorized,
    NotFound,
    InvalidRequest,
    ProviderNotRegistered,
    Internal,
}

/// Error returned by a time-series provider.
///
/// `Source::fetch` hands these back exactly as the provider produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message, true)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message, true)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unauthorized, message, false)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound, message, false)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message, false)
    }

    pub fn provider_not_registered(provider: &str) -> Self {
        Self::new(
            SourceErrorKind::ProviderNotRegistered,
            format!("time-series provider '{provider}' is not registered"),
            false,
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Internal, message, false)
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Unauthorized => "source.unauthorized",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::ProviderNotRegistered => "source.provider_not_registered",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Arguments handed to a provider for one series lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    /// Vendor dataset, taken from `Source::query`.
    pub dataset: String,
    /// Series name within the dataset, taken from `Source::symbol`.
    pub name: Option<String>,
    pub start: Option<UtcDateTime>,
    pub end: Option<UtcDateTime>,
    pub api_key: Option<String>,
}

/// External time-series provider.
///
/// Implementations own transport, authentication and wire format; callers
/// only see a `TimeSeries` or a `SourceError`.
pub trait TimeSeriesProvider: Send + Sync {
    fn id(&self) -> &str;
    fn series(&self, req: &SeriesRequest) -> Result<TimeSeries, SourceError>;
}

/// Providers keyed by the name used in `Source::provider`.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn TimeSeriesProvider>>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<Arc<dyn TimeSeriesProvider>>) -> Self {
        let providers = providers
            .into_iter()
            .map(|provider| (provider.id().to_owned(), provider))
            .collect();
        Self { providers }
    }

    /// Add or replace the provider registered under its own id.
    pub fn register(&mut self, provider: Arc<dyn TimeSeriesProvider>) {
        self.providers.insert(provider.id().to_owned(), provider);
    }

    pub fn get(&self, provider: &str) -> Option<&dyn TimeSeriesProvider> {
        self.providers.get(provider).map(|provider| provider.as_ref())
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.providers.contains_key(provider)
    }

    /// Registered provider ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}
