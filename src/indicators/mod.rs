use crate::error::ComputationFailure;
use crate::models::DataPoint;
use async_trait::async_trait;

pub mod ratio;
pub mod spread;
pub mod registry;

/// A metric derived from two or more fetched series.
#[async_trait]
pub trait CalculatedIndicator: Send + Sync {
    /// Returns the display name
    fn name(&self) -> &str;

    /// Symbols of the inputs, in the order `calculate` expects them
    fn required_inputs(&self) -> Vec<&str>;

    /// Calculate the indicator from its inputs.
    async fn calculate(
        &self,
        inputs: Vec<Vec<DataPoint>>,
    ) -> Result<Vec<DataPoint>, ComputationFailure>;
}

fn check_inputs(
    operation: &'static str,
    inputs: &[Vec<DataPoint>],
    expected: usize,
) -> Result<(), ComputationFailure> {
    if inputs.len() != expected {
        return Err(ComputationFailure::InputCount {
            operation,
            expected,
            actual: inputs.len(),
        });
    }
    if inputs.iter().any(|s| s.is_empty()) {
        return Err(ComputationFailure::EmptyInput { operation });
    }
    Ok(())
}
