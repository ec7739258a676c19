//! Record weighting: collapse a simulation result into aggregate revenue

use crate::engine::SimulationResult;
use crate::error::AggregationError;

/// Currency units per reported unit (revenue is reported in billions)
pub const BILLION: f64 = 1e9;

/// Weighted sum of liabilities, in billions
///
/// `Σ L[i] * W[i] / 1e9`, summed in record order. An empty population
/// aggregates to zero.
pub fn aggregate_revenue(result: &SimulationResult) -> Result<f64, AggregationError> {
    aggregate(&result.liabilities, &result.weights)
}

/// Same as [`aggregate_revenue`] on raw vectors
pub fn aggregate(liabilities: &[f64], weights: &[f64]) -> Result<f64, AggregationError> {
    if liabilities.len() != weights.len() {
        return Err(AggregationError::ShapeMismatch {
            liabilities: liabilities.len(),
            weights: weights.len(),
        });
    }

    let mut total = 0.0;
    for (index, (&liability, &weight)) in liabilities.iter().zip(weights).enumerate() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(AggregationError::InvalidWeight { index, weight });
        }
        if !liability.is_finite() {
            return Err(AggregationError::InvalidLiability { index, liability });
        }
        total += liability * weight;
    }

    Ok(total / BILLION)
}
