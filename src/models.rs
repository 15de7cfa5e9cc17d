use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A single observation. A missing value is stored as `f64::NAN`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_nan()
    }
}

/// Level series and its year-over-year growth series for one metric.
/// Either side may be absent; growth is never present without level.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct MetricSeries {
    pub level: Option<Vec<DataPoint>>,
    pub growth: Option<Vec<DataPoint>>,
}

impl MetricSeries {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.level.is_none()
    }
}
