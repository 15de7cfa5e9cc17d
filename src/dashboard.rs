use cached::{Cached, TimedCache};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::resolver::SeriesResolver;
use crate::core::timeseries::percent_change;
use crate::indicators::registry::{Category, Registry};
use crate::models::{DataPoint, MetricSeries};

/// Lookback choices offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
pub enum TimeRange {
    #[default]
    #[value(name = "1y")]
    OneYear,
    #[value(name = "2y")]
    TwoYears,
    #[value(name = "5y")]
    FiveYears,
}

impl TimeRange {
    pub fn days(&self) -> u32 {
        match self {
            TimeRange::OneYear => 365,
            TimeRange::TwoYears => 730,
            TimeRange::FiveYears => 1825,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::OneYear => "1 Year",
            TimeRange::TwoYears => "2 Years",
            TimeRange::FiveYears => "5 Years",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PanelStatus {
    Ready,
    /// Shown as "Unable to fetch data for this metric"
    Unavailable,
}

/// Everything needed to draw one metric's chart and its change label.
#[derive(Debug, Clone, Serialize)]
pub struct MetricPanel {
    pub name: String,
    pub definition: String,
    pub level: Option<Vec<DataPoint>>,
    pub growth: Option<Vec<DataPoint>>,
    /// Percent change across the displayed level window
    pub change: Option<f64>,
    pub status: PanelStatus,
}

impl MetricPanel {
    fn from_series(name: &str, series: MetricSeries) -> Self {
        let definition = Registry::definition(name).unwrap_or_default().to_string();
        let level = series.level.filter(|l| !l.is_empty());

        match level {
            Some(level) => MetricPanel {
                name: name.to_string(),
                definition,
                change: percent_change(&level),
                level: Some(level),
                growth: series.growth,
                status: PanelStatus::Ready,
            },
            None => MetricPanel {
                name: name.to_string(),
                definition,
                level: None,
                growth: None,
                change: None,
                status: PanelStatus::Unavailable,
            },
        }
    }

    pub fn latest_level(&self) -> Option<f64> {
        self.level.as_ref()?.last().map(|p| p.value)
    }

    pub fn latest_growth(&self) -> Option<f64> {
        self.growth.as_ref()?.last().map(|p| p.value)
    }
}

/// Resolver plus a time-bounded result cache keyed by `(metric, window_days)`.
pub struct Dashboard {
    resolver: SeriesResolver,
    cache: Mutex<TimedCache<(String, u32), MetricSeries>>,
    /// Resolve as of this date instead of today's UTC date
    as_of: Option<NaiveDate>,
}

impl Dashboard {
    pub fn new(resolver: SeriesResolver, ttl: Duration) -> Self {
        Self {
            resolver,
            cache: Mutex::new(TimedCache::with_lifespan(ttl)),
            as_of: None,
        }
    }

    /// Pin every resolve to `date`.
    pub fn with_as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    /// Cached `resolve`. Absent results are cached too, until expiry or `refresh`.
    pub async fn fetch(&self, metric_name: &str, window_days: u32) -> MetricSeries {
        let key = (metric_name.to_string(), window_days);

        if let Some(hit) = self.cache.lock().await.cache_get(&key) {
            debug!(metric = metric_name, window_days, "cache hit");
            return hit.clone();
        }

        let today = self.as_of.unwrap_or_else(|| Utc::now().date_naive());
        let series = self.resolver.resolve_as_of(metric_name, window_days, today).await;
        self.cache.lock().await.cache_set(key, series.clone());
        series
    }

    /// Drop every cached result.
    pub async fn refresh(&self) {
        self.cache.lock().await.cache_clear();
        info!("dashboard cache cleared");
    }

    pub async fn panel(&self, metric_name: &str, range: TimeRange) -> MetricPanel {
        let series = self.fetch(metric_name, range.days()).await;
        MetricPanel::from_series(metric_name, series)
    }

    /// Panels for one category in display order, fetched one after another.
    pub async fn category_panels(
        &self,
        category: Category,
        range: TimeRange,
    ) -> Vec<MetricPanel> {
        let mut panels = Vec::new();
        for meta in Registry::get_by_category(category) {
            panels.push(self.panel(meta.name, range).await);
        }
        panels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::memory::StaticSource;
    use crate::fetcher::DataProviderClient;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::sync::Arc;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
    }

    fn daily_until(days_back: i64, value: f64) -> Vec<DataPoint> {
        let today = Utc.from_utc_datetime(&as_of().and_hms_opt(0, 0, 0).unwrap());
        (0..=days_back)
            .rev()
            .map(|back| DataPoint::new(today - ChronoDuration::days(back), value))
            .collect()
    }

    fn dashboard(macro_source: Arc<StaticSource>, prices: Arc<StaticSource>) -> Dashboard {
        let resolver = SeriesResolver::new(DataProviderClient::new(macro_source, prices));
        Dashboard::new(resolver, Duration::from_secs(3600)).with_as_of(as_of())
    }

    #[test]
    fn test_time_range_days() {
        assert_eq!(TimeRange::default(), TimeRange::OneYear);
        assert_eq!(TimeRange::OneYear.days(), 365);
        assert_eq!(TimeRange::TwoYears.days(), 730);
        assert_eq!(TimeRange::FiveYears.days(), 1825);
        assert_eq!(TimeRange::TwoYears.label(), "2 Years");
    }

    #[tokio::test]
    async fn test_cache_and_refresh() {
        let macro_source =
            Arc::new(StaticSource::new("macro").with_series("DFF", daily_until(800, 2.0)));
        let prices = Arc::new(StaticSource::new("prices"));
        let board = dashboard(macro_source.clone(), prices);

        let first = board.fetch("Key Interest Rates", 365).await;
        let second = board.fetch("Key Interest Rates", 365).await;
        assert_eq!(first, second);
        assert_eq!(macro_source.requests(), 1);

        // A different window is a different key
        board.fetch("Key Interest Rates", 730).await;
        assert_eq!(macro_source.requests(), 2);

        board.refresh().await;
        board.fetch("Key Interest Rates", 365).await;
        assert_eq!(macro_source.requests(), 3);
    }

    #[tokio::test]
    async fn test_unavailable_panel() {
        let macro_source = Arc::new(StaticSource::new("macro").with_failure("GDPC1", "503"));
        let prices = Arc::new(StaticSource::new("prices"));
        let board = dashboard(macro_source, prices);

        let panel = board.panel("GDP Growth Rate", TimeRange::OneYear).await;
        assert_eq!(panel.status, PanelStatus::Unavailable);
        assert!(panel.level.is_none() && panel.growth.is_none() && panel.change.is_none());
        assert!(panel.definition.contains("GDPC1"));
    }

    #[tokio::test]
    async fn test_category_panels_in_order() {
        let macro_source = Arc::new(
            StaticSource::new("macro")
                .with_series("DFF", daily_until(800, 5.0))
                .with_series("BAA", daily_until(800, 6.0))
                .with_series("DGS10", daily_until(800, 4.0)),
        );
        let prices =
            Arc::new(StaticSource::new("prices").with_series("^VIX", daily_until(800, 15.0)));
        let board = dashboard(macro_source, prices);

        let panels = board.category_panels(Category::InterestRate, TimeRange::OneYear).await;
        let names: Vec<&str> = panels.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Key Interest Rates", "Credit Spread", "VIX Index"]);
        assert!(panels.iter().all(|p| p.status == PanelStatus::Ready));

        assert_eq!(panels[1].latest_level(), Some(2.0));
        assert_eq!(panels[1].change, Some(0.0));
        assert_eq!(panels[2].latest_growth(), Some(0.0));
    }

    #[tokio::test]
    async fn test_pinned_date_bounds_the_window() {
        // Data running past the pinned date must not leak into the panel
        let mut series = daily_until(800, 3.0);
        let last = series.last().unwrap().timestamp;
        series.extend((1..=30).map(|d| DataPoint::new(last + ChronoDuration::days(d), 9.0)));
        let macro_source = Arc::new(StaticSource::new("macro").with_series("DFF", series));
        let board = dashboard(macro_source, Arc::new(StaticSource::new("prices")));

        let panel = board.panel("Key Interest Rates", TimeRange::OneYear).await;
        let level = panel.level.unwrap();
        assert_eq!(level.len(), 365);
        assert_eq!(level.last().unwrap().timestamp, last);
        assert_eq!(panel.change, Some(0.0));
    }
}
