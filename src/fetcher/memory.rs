use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{normalize_order, DataSource};
use crate::error::RetrievalFailure;
use crate::models::DataPoint;

/// In-memory provider with fixed series per symbol. Symbols registered as
/// failing return a provider error; unknown symbols are treated the same way.
pub struct StaticSource {
    name: String,
    series: HashMap<String, Vec<DataPoint>>,
    failing: HashMap<String, String>,
    requests: AtomicUsize,
}

impl StaticSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            series: HashMap::new(),
            failing: HashMap::new(),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn with_series(mut self, symbol: &str, points: Vec<DataPoint>) -> Self {
        self.series.insert(symbol.to_string(), normalize_order(points));
        self
    }

    pub fn with_failure(mut self, symbol: &str, message: &str) -> Self {
        self.failing.insert(symbol.to_string(), message.to_string());
        self
    }

    /// Number of `fetch_range` calls served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>, RetrievalFailure> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.failing.get(symbol) {
            return Err(RetrievalFailure::provider(&self.name, symbol, message));
        }

        let points = self
            .series
            .get(symbol)
            .ok_or_else(|| RetrievalFailure::provider(&self.name, symbol, "unknown symbol"))?;

        let in_range: Vec<DataPoint> = points
            .iter()
            .filter(|p| {
                let day = p.timestamp.date_naive();
                day >= start && day <= end
            })
            .cloned()
            .collect();

        if in_range.is_empty() {
            return Err(RetrievalFailure::empty(&self.name, symbol));
        }
        Ok(in_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_filters_to_range() {
        let points = (1..=10)
            .map(|d| DataPoint::new(Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap(), d as f64))
            .collect();
        let source = StaticSource::new("memory").with_series("X", points);

        let got = source.fetch_range("X", day(2024, 1, 3), day(2024, 1, 5)).await.unwrap();
        assert_eq!(got.iter().map(|p| p.value).collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert_eq!(source.requests(), 1);
    }

    #[tokio::test]
    async fn test_failure_and_empty() {
        let source = StaticSource::new("memory")
            .with_failure("BAD", "boom")
            .with_series(
                "OLD",
                vec![DataPoint::new(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(), 1.0)],
            );

        let bad = source.fetch_range("BAD", day(2024, 1, 1), day(2024, 2, 1)).await;
        assert!(matches!(bad, Err(RetrievalFailure::Provider { .. })));

        let old = source.fetch_range("OLD", day(2024, 1, 1), day(2024, 2, 1)).await;
        assert!(matches!(old, Err(RetrievalFailure::Empty { .. })));
    }
}
