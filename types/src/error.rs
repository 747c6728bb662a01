//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for values that fail validation before reaching the engine.
#[derive(Debug, Error)]
pub enum CivitasError {
    #[error("invalid account id: {0:?}")]
    InvalidAccount(String),

    #[error("invalid governance parameters: {0}")]
    InvalidParams(String),
}
