use crate::error::RetrievalFailure;
use crate::models::DataPoint;
use super::{normalize_order, DataSource};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use yahoo_finance_api as yahoo;
use time::OffsetDateTime;
use tracing::debug;

const PROVIDER: &str = "Yahoo";

/// Daily closing prices for futures, indices and equities.
pub struct YahooFetcher;

impl YahooFetcher {
    pub fn new() -> Self {
        YahooFetcher
    }
}

impl Default for YahooFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Yahoo API uses the `time` crate instead of `chrono`
fn to_offset(symbol: &str, date: NaiveDate) -> Result<OffsetDateTime, RetrievalFailure> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| RetrievalFailure::provider(PROVIDER, symbol, "invalid date"))?;
    OffsetDateTime::from_unix_timestamp(midnight.and_utc().timestamp())
        .map_err(|e| RetrievalFailure::provider(PROVIDER, symbol, e))
}

/// Quotes carry an intraday timestamp; keep only the calendar day so instruments align.
fn quote_day(symbol: &str, unix_secs: i64) -> Result<chrono::DateTime<Utc>, RetrievalFailure> {
    let ts = Utc
        .timestamp_opt(unix_secs, 0)
        .single()
        .ok_or_else(|| RetrievalFailure::malformed(PROVIDER, symbol, "bad quote timestamp"))?;
    let midnight = ts
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| RetrievalFailure::malformed(PROVIDER, symbol, "bad quote date"))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

#[async_trait]
impl DataSource for YahooFetcher {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>, RetrievalFailure> {
        let provider = yahoo::YahooConnector::new().map_err(|e| {
            RetrievalFailure::provider(PROVIDER, symbol, format!("failed to init connector: {}", e))
        })?;

        debug!(symbol, %start, %end, "Yahoo fetch");

        let resp = provider
            .get_quote_history(symbol, to_offset(symbol, start)?, to_offset(symbol, end)?)
            .await
            .map_err(|e| RetrievalFailure::provider(PROVIDER, symbol, e))?;

        let quotes = resp
            .quotes()
            .map_err(|e| RetrievalFailure::malformed(PROVIDER, symbol, e))?;

        let mut data_points = Vec::with_capacity(quotes.len());
        for quote in quotes {
            data_points.push(DataPoint {
                timestamp: quote_day(symbol, quote.timestamp as i64)?,
                value: quote.close,
            });
        }

        if data_points.is_empty() {
            return Err(RetrievalFailure::empty(PROVIDER, symbol));
        }

        Ok(normalize_order(data_points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_quote_day_truncates_to_midnight() {
        // 2023-11-14 22:13:20 UTC
        let day = quote_day("^GSPC", 1_700_000_000).unwrap();
        assert_eq!(day.date_naive(), NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
        assert_eq!(day.hour(), 0);
    }

    #[test]
    fn test_to_offset_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let offset = to_offset("^VIX", date).unwrap();
        assert_eq!(offset.unix_timestamp(), 1_704_153_600);
    }
}
