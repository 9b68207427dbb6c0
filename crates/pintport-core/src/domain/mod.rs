mod series;
mod timestamp;

pub use series::{Observation, TimeSeries};
pub use timestamp::UtcDateTime;
