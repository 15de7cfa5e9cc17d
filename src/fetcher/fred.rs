use async_trait::async_trait;
use crate::error::RetrievalFailure;
use crate::models::DataPoint;
use super::{normalize_order, DataSource};
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

const PROVIDER: &str = "FRED";
const OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

pub struct FredFetcher {
    api_key: String,
    client: Client,
}

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

impl FredFetcher {
    pub fn new(api_key: String, user_agent: &str) -> Self {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("MacroDashboard/1.0"));
        headers.insert(USER_AGENT, agent);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { api_key, client }
    }
}

#[async_trait]
impl DataSource for FredFetcher {
    fn name(&self) -> &str {
        "fred"
    }

    async fn fetch_range(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>, RetrievalFailure> {
        // FRED keys are 32 lowercase alphanumerics
        let sanitized_key = self.api_key.trim().to_lowercase();

        // Length only, never the key itself
        debug!(series_id, key_len = sanitized_key.len(), %start, %end, "FRED fetch");

        if sanitized_key.is_empty() {
            return Err(RetrievalFailure::provider(PROVIDER, series_id, "API key is empty"));
        }
        if sanitized_key.len() != 32 {
            warn!(
                key_len = sanitized_key.len(),
                "FRED API key is not 32 characters, request will likely fail"
            );
        }

        let start_str = start.format("%Y-%m-%d").to_string();
        let end_str = end.format("%Y-%m-%d").to_string();

        let resp = self
            .client
            .get(OBSERVATIONS_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", sanitized_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start_str.as_str()),
                ("observation_end", end_str.as_str()),
            ])
            .send()
            .await
            .map_err(|e| RetrievalFailure::provider(PROVIDER, series_id, e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(RetrievalFailure::provider(
                PROVIDER,
                series_id,
                format!("{} - Body: {}", status, error_text),
            ));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| RetrievalFailure::malformed(PROVIDER, series_id, e))?;

        let points = Self::parse_observations(series_id, &json)?;
        if points.is_empty() {
            return Err(RetrievalFailure::empty(PROVIDER, series_id));
        }
        Ok(points)
    }
}

impl FredFetcher {
    /// `"."` marks a missing observation and becomes NaN so the caller can forward-fill it.
    fn parse_observations(
        series_id: &str,
        json: &Value,
    ) -> Result<Vec<DataPoint>, RetrievalFailure> {
        let observations = json["observations"].as_array().ok_or_else(|| {
            RetrievalFailure::malformed(PROVIDER, series_id, "no observations array")
        })?;

        let mut data_points = Vec::with_capacity(observations.len());

        for obs in observations {
            // "date": "2023-01-01", "value": "123.45"
            let (Some(date_str), Some(value_str)) = (obs["date"].as_str(), obs["value"].as_str())
            else {
                continue;
            };

            let naive_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| RetrievalFailure::malformed(PROVIDER, series_id, e))?;
            let Some(midnight) = naive_date.and_hms_opt(0, 0, 0) else {
                continue;
            };

            let value = if value_str == "." {
                f64::NAN
            } else {
                value_str.trim().parse::<f64>().unwrap_or(f64::NAN)
            };

            data_points.push(DataPoint {
                timestamp: Utc.from_utc_datetime(&midnight),
                value,
            });
        }

        Ok(normalize_order(data_points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_response() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "123.45" },
                { "date": "2023-01-02", "value": "124.56" }
            ]
        });

        let points = FredFetcher::parse_observations("DFF", &json_data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 123.45);
        assert_eq!(points[1].value, 124.56);
    }

    #[test]
    fn test_parse_missing_value_kept_as_nan() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "100.0" },
                { "date": "2023-01-02", "value": "." }
            ]
        });

        let points = FredFetcher::parse_observations("DFF", &json_data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 100.0);
        assert!(points[1].is_missing());
    }

    #[test]
    fn test_parse_sorts_unordered_dates() {
        let json_data = json!({
            "observations": [
                { "date": "2023-03-01", "value": "3" },
                { "date": "2023-01-01", "value": "1" }
            ]
        });

        let points = FredFetcher::parse_observations("BAA", &json_data).unwrap();
        assert_eq!(points[0].value, 1.0);
        assert_eq!(points[1].value, 3.0);
    }

    #[test]
    fn test_parse_invalid_format() {
        let json_data = json!({ "error": "bad request" });
        let result = FredFetcher::parse_observations("DFF", &json_data);
        assert!(matches!(result, Err(RetrievalFailure::Malformed { .. })));
    }

    #[test]
    fn test_parse_bad_date() {
        let json_data = json!({
            "observations": [ { "date": "01/02/2023", "value": "1.0" } ]
        });
        assert!(FredFetcher::parse_observations("DFF", &json_data).is_err());
    }
}
