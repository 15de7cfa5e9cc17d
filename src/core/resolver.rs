use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::core::timeseries::{forward_fill, tail, yoy_growth, YOY_LAG_DAYS};
use crate::error::RetrievalFailure;
use crate::fetcher::{DataProviderClient, DataSource};
use crate::indicators::registry::{Registry, RetrievalStrategy, PROXY_TICKER};
use crate::models::{DataPoint, MetricSeries};

/// Turns a metric name into its level series and YoY growth series.
///
/// Every failure is logged and collapsed to an absent series at this
/// boundary; `resolve` itself never fails.
pub struct SeriesResolver {
    providers: DataProviderClient,
}

impl SeriesResolver {
    pub fn new(providers: DataProviderClient) -> Self {
        Self { providers }
    }

    /// Resolve against today's UTC date.
    pub async fn resolve(&self, metric_name: &str, window_days: u32) -> MetricSeries {
        self.resolve_as_of(metric_name, window_days, Utc::now().date_naive()).await
    }

    pub async fn resolve_as_of(
        &self,
        metric_name: &str,
        window_days: u32,
        today: NaiveDate,
    ) -> MetricSeries {
        if window_days == 0 {
            warn!(metric = metric_name, "window of 0 days requested, nothing to return");
            return MetricSeries::absent();
        }

        if Registry::get_metadata(metric_name).is_none() {
            info!(
                metric = metric_name,
                proxy = PROXY_TICKER,
                "metric not in catalog, using proxy"
            );
        }
        let strategy = Registry::strategy_for(metric_name);

        let level = match self.fetch_level(&strategy, window_days, today).await {
            Ok(level) if !level.is_empty() => level,
            Ok(_) => {
                warn!(metric = metric_name, "level series is empty");
                return MetricSeries::absent();
            }
            Err(e) => {
                warn!(metric = metric_name, error = %e, "retrieval failed");
                return MetricSeries::absent();
            }
        };

        // Growth is computed on the full fetched history, before the window cut
        let growth = match yoy_growth(&level) {
            Ok(growth) => Some(growth),
            Err(e) => {
                warn!(metric = metric_name, error = %e, "growth computation failed");
                None
            }
        };

        let window = window_days as usize;
        let level = tail(level, window);
        let growth = growth.map(|g| tail(g, window));

        debug!(
            metric = metric_name,
            level_points = level.len(),
            growth_points = growth.as_ref().map_or(0, Vec::len),
            "resolved"
        );

        MetricSeries { level: Some(level), growth }
    }

    /// Raw level series for a strategy, covering the window plus one year of history.
    pub async fn fetch_level(
        &self,
        strategy: &RetrievalStrategy,
        window_days: u32,
        today: NaiveDate,
    ) -> Result<Vec<DataPoint>, RetrievalFailure> {
        let start = window_start(today, window_days);

        match strategy {
            RetrievalStrategy::MacroSeries { id } => {
                fetch_filled(self.providers.macro_series.as_ref(), id, start, today).await
            }
            RetrievalStrategy::SingleInstrument { ticker } => {
                fetch_filled(self.providers.prices.as_ref(), ticker, start, today).await
            }
            RetrievalStrategy::DefaultProxy => {
                fetch_filled(self.providers.prices.as_ref(), PROXY_TICKER, start, today).await
            }
            RetrievalStrategy::Ratio { .. } => {
                self.calculate(strategy, self.providers.prices.as_ref(), start, today).await
            }
            RetrievalStrategy::Spread { .. } => {
                self.calculate(strategy, self.providers.macro_series.as_ref(), start, today).await
            }
        }
    }

    /// Fetch every input of a two-series strategy; any missing input fails the whole metric.
    async fn calculate(
        &self,
        strategy: &RetrievalStrategy,
        source: &dyn DataSource,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>, RetrievalFailure> {
        let calculator = strategy.calculator().ok_or_else(|| {
            RetrievalFailure::provider(source.name(), "-", "strategy has no calculator")
        })?;

        let mut inputs = Vec::new();
        for symbol in calculator.required_inputs() {
            let data = fetch_filled(source, symbol, start, end)
                .await
                .map_err(|e| RetrievalFailure::Input {
                    input: symbol.to_string(),
                    source: Box::new(e),
                })?;
            inputs.push(data);
        }

        Ok(calculator.calculate(inputs).await?)
    }
}

/// Earliest day ever requested from a provider; no catalog series starts before it.
pub fn earliest_fetch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// First day to fetch: the window plus one year before `today`, never before
/// `earliest_fetch_date()`.
pub fn window_start(today: NaiveDate, window_days: u32) -> NaiveDate {
    let earliest = earliest_fetch_date();
    let start = Duration::try_days(window_days as i64 + YOY_LAG_DAYS as i64)
        .and_then(|span| today.checked_sub_signed(span))
        .unwrap_or(earliest);
    if start < earliest {
        debug!(window_days, %earliest, "window reaches past earliest fetch date, clamping");
        return earliest;
    }
    start
}

async fn fetch_filled(
    source: &dyn DataSource,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DataPoint>, RetrievalFailure> {
    let mut data = source.fetch_range(symbol, start, end).await?;
    forward_fill(&mut data);
    Ok(data)
}
