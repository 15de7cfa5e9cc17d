use super::{check_inputs, CalculatedIndicator};
use crate::core::timeseries::{combine, forward_fill};
use crate::error::ComputationFailure;
use crate::models::DataPoint;
use async_trait::async_trait;

/// Ratio of two instrument price series, e.g. copper over gold futures.
pub struct PriceRatio {
    pub numerator: String,
    pub denominator: String,
}

impl PriceRatio {
    pub fn new(numerator: &str, denominator: &str) -> Self {
        Self {
            numerator: numerator.to_string(),
            denominator: denominator.to_string(),
        }
    }
}

#[async_trait]
impl CalculatedIndicator for PriceRatio {
    fn name(&self) -> &str {
        "Price Ratio"
    }

    fn required_inputs(&self) -> Vec<&str> {
        vec![self.numerator.as_str(), self.denominator.as_str()]
    }

    async fn calculate(
        &self,
        inputs: Vec<Vec<DataPoint>>,
    ) -> Result<Vec<DataPoint>, ComputationFailure> {
        check_inputs("ratio", &inputs, 2)?;

        // Dates present on only one side become gaps and are filled from the prior ratio
        let mut ratio = combine(&inputs[0], &inputs[1], |num, den| {
            if den == 0.0 { f64::NAN } else { num / den }
        });
        forward_fill(&mut ratio);

        Ok(ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn ts(offset: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::days(offset)
    }

    #[tokio::test]
    async fn test_copper_gold_ratio() {
        let calculator = PriceRatio::new("HG=F", "GC=F");

        // Copper $4, Gold $2000
        let copper = vec![DataPoint::new(ts(0), 4.0)];
        let gold = vec![DataPoint::new(ts(0), 2000.0)];

        let result = calculator.calculate(vec![copper, gold]).await.unwrap();
        assert_eq!(result.len(), 1);
        assert!((result[0].value - 0.002).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_misaligned_dates_forward_filled() {
        let calculator = PriceRatio::new("CL=F", "GC=F");

        let oil = vec![DataPoint::new(ts(0), 80.0), DataPoint::new(ts(2), 90.0)];
        let gold = vec![
            DataPoint::new(ts(0), 2000.0),
            DataPoint::new(ts(1), 2100.0),
            DataPoint::new(ts(2), 1800.0),
        ];

        let result = calculator.calculate(vec![oil, gold]).await.unwrap();
        assert_eq!(result.len(), 3);
        assert!((result[0].value - 0.04).abs() < 1e-12);
        // day 1 has no oil quote: carries day 0's ratio
        assert!((result[1].value - 0.04).abs() < 1e-12);
        assert!((result[2].value - 0.05).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_zero_division_safety() {
        let calculator = PriceRatio::new("HG=F", "GC=F");

        let copper = vec![DataPoint::new(ts(0), 4.0), DataPoint::new(ts(1), 5.0)];
        let gold = vec![DataPoint::new(ts(0), 2000.0), DataPoint::new(ts(1), 0.0)];

        let result = calculator.calculate(vec![copper, gold]).await.unwrap();
        assert_eq!(result.len(), 2);
        assert!(result[1].value.is_finite());
        assert_eq!(result[1].value, result[0].value);
    }

    #[tokio::test]
    async fn test_requires_two_inputs() {
        let calculator = PriceRatio::new("HG=F", "GC=F");
        let result = calculator.calculate(vec![vec![DataPoint::new(ts(0), 1.0)]]).await;
        assert!(matches!(
            result,
            Err(ComputationFailure::InputCount { expected: 2, actual: 1, .. })
        ));
    }
}
