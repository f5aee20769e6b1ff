// In crates/core-types/src/error.rs

use thiserror::Error;

/// Failures that can occur anywhere between the raw price input and the final decision.
///
/// Every variant is recoverable: the pipeline boundary turns each of them into a
/// safe `HOLD` decision instead of letting it escape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Need at least {required} historical prices, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Decision provider error: {0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, Error>;
