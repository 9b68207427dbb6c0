use std::sync::{Arc, Mutex};

use pintport_core::{
    Config, Observation, ProviderRegistry, SeriesRequest, Source, SourceError, SourceErrorKind,
    SourceId, SourceList, TimeSeries, TimeSeriesProvider, UtcDateTime,
};

/// Serves a fixed daily series for any dataset and records every request.
struct StaticProvider {
    id: &'static str,
    requests: Mutex<Vec<SeriesRequest>>,
}

impl StaticProvider {
    fn new(id: &'static str) -> Self {
        Self {
            id,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<SeriesRequest> {
        self.requests.lock().expect("not poisoned").clone()
    }
}

impl TimeSeriesProvider for StaticProvider {
    fn id(&self) -> &str {
        self.id
    }

    fn series(&self, req: &SeriesRequest) -> Result<TimeSeries, SourceError> {
        self.requests.lock().expect("not poisoned").push(req.clone());
        let observations = (1..=5)
            .map(|day| {
                Observation::new(ts(&format!("2019-03-0{day}T16:00:00Z")), 870.0 + f64::from(day))
                    .expect("finite")
            })
            .collect();
        let column = req.name.clone().unwrap_or_else(|| req.dataset.clone());
        Ok(TimeSeries::new(column, observations).between(req.start, req.end))
    }
}

/// Always fails with the configured error.
struct FailingProvider {
    id: &'static str,
    error: SourceError,
}

impl TimeSeriesProvider for FailingProvider {
    fn id(&self) -> &str {
        self.id
    }

    fn series(&self, _req: &SeriesRequest) -> Result<TimeSeries, SourceError> {
        Err(self.error.clone())
    }
}

fn ts(raw: &str) -> UtcDateTime {
    UtcDateTime::parse(raw).expect("valid timestamp")
}

fn config() -> Config {
    Config::default().with_api_key("quandl", "q-key")
}

#[test]
fn fetch_maps_query_symbol_and_key_onto_the_request() {
    let provider = StaticProvider::new("quandl");
    let source = Source::with_config("quandl", "ECB", Some("EURUSD"), "FX", &config());

    let series = source
        .fetch(
            &provider,
            Some(ts("2019-03-02T00:00:00Z")),
            Some(ts("2019-03-04T23:59:59Z")),
        )
        .expect("static provider succeeds");

    assert_eq!(series.column, "EURUSD");
    assert_eq!(series.len(), 3);
    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].dataset, "ECB");
    assert_eq!(requests[0].name.as_deref(), Some("EURUSD"));
    assert_eq!(requests[0].api_key.as_deref(), Some("q-key"));
}

#[test]
fn fetch_propagates_provider_error_unchanged() {
    let error = SourceError::rate_limited("50 calls per day exceeded");
    let provider = FailingProvider {
        id: "quandl",
        error: error.clone(),
    };
    let source = Source::with_config("quandl", "ECB", Some("EURUSD"), "FX", &config());

    let err = source.fetch(&provider, None, None).expect_err("provider fails");

    assert_eq!(err, error);
    assert!(err.retryable());
}

#[test]
fn list_fetch_falls_back_in_priority_order() {
    let failing: Arc<dyn TimeSeriesProvider> = Arc::new(FailingProvider {
        id: "quandl",
        error: SourceError::unavailable("maintenance window"),
    });
    let working: Arc<dyn TimeSeriesProvider> = Arc::new(StaticProvider::new("fred"));
    let registry = ProviderRegistry::new(vec![failing, working]);

    let list = SourceList::try_from_sources(vec![
        Source::with_config("quandl", "ECB", Some("EURUSD"), "FX", &config()),
        Source::with_config("yahoo", "EURUSD=X", None, "CCY", &config()),
        Source::with_config("fred", "DEXUSEU", None, "FX", &config()),
    ])
    .expect("valid");

    let success = list.fetch(&registry, None, None).expect("third source serves");

    assert_eq!(success.source_id, SourceId(2));
    assert_eq!(success.series.column, "DEXUSEU");
    let failed: Vec<(SourceId, SourceErrorKind)> = success
        .failed_attempts
        .iter()
        .map(|attempt| (attempt.source_id, attempt.error.kind()))
        .collect();
    assert_eq!(
        failed,
        vec![
            (SourceId(0), SourceErrorKind::Unavailable),
            (SourceId(1), SourceErrorKind::ProviderNotRegistered),
        ]
    );
}

#[test]
fn list_fetch_reports_every_failure_when_nothing_serves() {
    let failing: Arc<dyn TimeSeriesProvider> = Arc::new(FailingProvider {
        id: "quandl",
        error: SourceError::unauthorized("invalid api key"),
    });
    let registry = ProviderRegistry::new(vec![failing]);
    let list = SourceList::try_from_sources(vec![
        Source::with_config("quandl", "ECB", Some("EURUSD"), "FX", &config()),
        Source::with_config("quandl", "BOE", Some("XUDLUSS"), "FX", &config()),
    ])
    .expect("valid");

    let failure = list.fetch(&registry, None, None).expect_err("all fail");

    assert_eq!(failure.attempts.len(), 2);
    assert!(failure.to_string().starts_with("all 2 sources failed"));
}

#[test]
fn empty_list_fetch_fails_without_attempts() {
    let failure = SourceList::new()
        .fetch(&ProviderRegistry::default(), None, None)
        .expect_err("nothing to fetch from");

    assert!(failure.attempts.is_empty());
    assert_eq!(failure.to_string(), "no sources to fetch from");
}
