use std::fmt::{Display, Formatter};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::data_source::{SeriesRequest, SourceError, TimeSeriesProvider};
use crate::{Config, TimeSeries, UtcDateTime, ValidationError};

pub const DEFAULT_CURRENCY: &str = "USD";

/// Stable identifier of a source within its list.
///
/// Persisted price rows refer to sources by this number, so a value handed
/// out by a `SourceList` is never changed while the source is a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub u32);

impl SourceId {
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where and how to fetch a price series for one security.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    id: Option<SourceId>,
    name: Option<String>,
    provider: String,
    query: String,
    symbol: Option<String>,
    exchange: String,
    currency: String,
    #[serde(skip)]
    api_key: Option<String>,
}

impl Source {
    /// Describe a source, resolving its API key from [`Config::global`].
    pub fn new(
        provider: impl Into<String>,
        query: impl Into<String>,
        symbol: Option<&str>,
        exchange: impl Into<String>,
    ) -> Self {
        Self::with_config(provider, query, symbol, exchange, Config::global())
    }

    /// Describe a source, resolving its API key from `config`.
    pub fn with_config(
        provider: impl Into<String>,
        query: impl Into<String>,
        symbol: Option<&str>,
        exchange: impl Into<String>,
        config: &Config,
    ) -> Self {
        let provider = provider.into();
        let api_key = config.api_key(&provider).map(str::to_owned);
        if api_key.is_none() {
            debug!("no api key configured for provider '{provider}'");
        }

        Self {
            id: None,
            name: None,
            provider,
            query: query.into(),
            symbol: symbol.map(str::to_owned),
            exchange: exchange.into(),
            currency: String::from(DEFAULT_CURRENCY),
            api_key,
        }
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Attach a display label. Labels are informational and may repeat.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restore an id that a `SourceList` assigned earlier, e.g. when
    /// reloading sources whose id is already referenced by stored prices.
    pub fn with_id(mut self, id: SourceId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<SourceId> {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn currency_code(&self) -> &str {
        &self.currency
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Pair that identifies what a fetch targets; unique within a list.
    pub fn dedup_key(&self) -> (&str, Option<&str>) {
        (self.query.as_str(), self.symbol.as_deref())
    }

    /// Check the descriptor fields a list member must satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.provider.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "provider" });
        }
        if self.query.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "query" });
        }
        if self
            .symbol
            .as_deref()
            .is_some_and(|symbol| symbol.trim().is_empty())
        {
            return Err(ValidationError::EmptyField { field: "symbol" });
        }
        validate_currency_code(&self.currency)
    }

    /// Look up this source's series through `provider`.
    pub fn fetch(
        &self,
        provider: &dyn TimeSeriesProvider,
        start: Option<UtcDateTime>,
        end: Option<UtcDateTime>,
    ) -> Result<TimeSeries, SourceError> {
        debug!(
            "fetching dataset '{}' name {:?} via '{}'",
            self.query,
            self.symbol,
            provider.id()
        );
        provider.series(&self.series_request(start, end))
    }

    pub fn series_request(
        &self,
        start: Option<UtcDateTime>,
        end: Option<UtcDateTime>,
    ) -> SeriesRequest {
        SeriesRequest {
            dataset: self.query.clone(),
            name: self.symbol.clone(),
            start,
            end,
            api_key: self.api_key.clone(),
        }
    }

    pub(crate) fn assign_id(&mut self, id: SourceId) {
        self.id = Some(id);
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "#{id} ")?,
            None => f.write_str("#- ")?,
        }
        write!(f, "{}:{}", self.provider, self.query)?;
        if let Some(symbol) = &self.symbol {
            write!(f, "/{symbol}")?;
        }
        write!(f, " @{} ({})", self.exchange, self.currency)
    }
}

/// Serialized form of a source, as found in manifests.
///
/// API keys are never part of a manifest; they are resolved from the
/// configuration when the entry is turned into a [`Source`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub provider: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default)]
    pub exchange: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl SourceEntry {
    pub fn into_source(self, config: &Config) -> Source {
        let mut source = Source::with_config(
            self.provider,
            self.query,
            self.symbol.as_deref(),
            self.exchange,
            config,
        )
        .currency(self.currency);
        source.name = self.name;
        source.id = self.id;
        source
    }
}

impl From<&Source> for SourceEntry {
    fn from(source: &Source) -> Self {
        Self {
            id: source.id,
            name: source.name.clone(),
            provider: source.provider.clone(),
            query: source.query.clone(),
            symbol: source.symbol.clone(),
            exchange: source.exchange.clone(),
            currency: source.currency.clone(),
        }
    }
}

fn default_currency() -> String {
    String::from(DEFAULT_CURRENCY)
}

fn validate_currency_code(value: &str) -> Result<(), ValidationError> {
    let valid = value.len() == 3 && value.bytes().all(|byte| byte.is_ascii_uppercase());
    if !valid {
        return Err(ValidationError::InvalidCurrency {
            value: value.to_owned(),
        });
    }
    Ok(())
}
