use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::RetrievalFailure;
use crate::models::DataPoint;

pub mod fred;
pub mod yahoo;
pub mod memory;

/// A provider of one scalar time series per symbol.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    /// Observations for `symbol` in `[start, end]`, sorted by timestamp.
    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>, RetrievalFailure>;
}

/// The two providers the resolver talks to: macro series and instrument prices.
#[derive(Clone)]
pub struct DataProviderClient {
    pub macro_series: Arc<dyn DataSource>,
    pub prices: Arc<dyn DataSource>,
}

impl DataProviderClient {
    pub fn new(macro_series: Arc<dyn DataSource>, prices: Arc<dyn DataSource>) -> Self {
        Self { macro_series, prices }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            macro_series: Arc::new(fred::FredFetcher::new(
                config.fred_api_key.clone(),
                &config.user_agent,
            )),
            prices: Arc::new(yahoo::YahooFetcher::new()),
        }
    }
}

/// Sort by timestamp and keep the last observation for a repeated timestamp.
pub(crate) fn normalize_order(mut points: Vec<DataPoint>) -> Vec<DataPoint> {
    points.sort_by_key(|p| p.timestamp);
    let mut out: Vec<DataPoint> = Vec::with_capacity(points.len());
    for p in points {
        match out.last_mut() {
            Some(last) if last.timestamp == p.timestamp => *last = p,
            _ => out.push(p),
        }
    }
    out
}
