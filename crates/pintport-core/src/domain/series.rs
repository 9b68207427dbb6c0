use serde::{Deserialize, Serialize};

use crate::{UtcDateTime, ValidationError};

/// One timestamped value of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub ts: UtcDateTime,
    pub value: f64,
}

impl Observation {
    pub fn new(ts: UtcDateTime, value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "value" });
        }
        Ok(Self { ts, value })
    }
}

/// Single-column time series indexed by timestamp, as returned by providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub column: String,
    pub observations: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series, sorting observations by timestamp.
    pub fn new(column: impl Into<String>, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|observation| observation.ts);
        Self {
            column: column.into(),
            observations,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Observations with `start <= ts <= end`; `None` leaves that side open.
    pub fn between(&self, start: Option<UtcDateTime>, end: Option<UtcDateTime>) -> Self {
        let observations = self
            .observations
            .iter()
            .filter(|o| start.map_or(true, |s| o.ts >= s) && end.map_or(true, |e| o.ts <= e))
            .copied()
            .collect();
        Self {
            column: self.column.clone(),
            observations,
        }
    }
}
