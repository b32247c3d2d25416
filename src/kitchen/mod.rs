//! The concurrent storage engine: shelves, the kitchen that coordinates them, and
//! the pluggable time and value strategies they depend on.
//!
//! # Main Components
//!
//! - [`Shelf`] - capacity-limited, expiration-ordered order storage with lazy cleanup
//! - [`Kitchen`] - shelf selection and globally expiration-ordered pickup
//! - [`Evaluator`] / [`DecayEvaluator`] - value and expiration policy
//! - [`Clock`] / [`SystemClock`] - injected time source

pub mod clock;
pub mod core;
pub mod error;
pub mod evaluator;
pub mod shelf;

pub use clock::*;
pub use self::core::*;
pub use error::*;
pub use evaluator::*;
pub use shelf::*;
