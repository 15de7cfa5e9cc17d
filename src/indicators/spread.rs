use super::{check_inputs, CalculatedIndicator};
use crate::core::timeseries::{combine, forward_fill};
use crate::error::ComputationFailure;
use crate::models::DataPoint;
use async_trait::async_trait;

/// Difference of two yield series (A - B), e.g. BAA corporate minus 10Y treasury.
pub struct YieldSpread {
    pub minuend: String,
    pub subtrahend: String,
}

impl YieldSpread {
    pub fn new(minuend: &str, subtrahend: &str) -> Self {
        Self {
            minuend: minuend.to_string(),
            subtrahend: subtrahend.to_string(),
        }
    }
}

#[async_trait]
impl CalculatedIndicator for YieldSpread {
    fn name(&self) -> &str {
        "Yield Spread"
    }

    fn required_inputs(&self) -> Vec<&str> {
        vec![self.minuend.as_str(), self.subtrahend.as_str()]
    }

    async fn calculate(
        &self,
        inputs: Vec<Vec<DataPoint>>,
    ) -> Result<Vec<DataPoint>, ComputationFailure> {
        check_inputs("spread", &inputs, 2)?;

        let mut spread = combine(&inputs[0], &inputs[1], |a, b| a - b);
        forward_fill(&mut spread);

        Ok(spread)
    }
}
