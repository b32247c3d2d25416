//! Startup and teardown: configuration loading, tracing setup, and the
//! [`KitchenSystem`] that wires the kitchen to its two schedulers.

pub mod config;
pub mod error;
pub mod kitchen_system;
pub mod tracing;

pub use config::*;
pub use error::*;
pub use kitchen_system::*;
