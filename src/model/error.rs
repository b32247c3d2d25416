//! Error types for order construction and ingestion.

use thiserror::Error;

/// Errors that can occur while building an [`Order`](super::Order).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The order has no usable name.
    #[error("Order name must not be empty")]
    EmptyName,

    /// Shelf life must be at least one second.
    #[error("Invalid shelf life for order {0}: must be greater than zero")]
    InvalidShelfLife(String),

    /// Decay rate must be a finite, non-negative number.
    #[error("Invalid decay rate for order {order}: {rate}")]
    InvalidDecayRate { order: String, rate: f64 },

    /// The orders file could not be parsed.
    #[error("Malformed order data: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for OrderError {
    fn from(e: serde_json::Error) -> Self {
        OrderError::Malformed(e.to_string())
    }
}
