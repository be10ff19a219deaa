use thiserror::Error;

/// Errors raised by the aggregation step.
///
/// Individual scorers never fail; they default missing inputs instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("risk weights must sum to a positive number, got {sum}")]
    InvalidWeights { sum: f64 },

    #[error("risk weight for {dimension} must be a non-negative number, got {weight}")]
    NegativeWeight { dimension: &'static str, weight: f64 },
}
