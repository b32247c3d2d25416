//! Pure data structures for orders moving through the kitchen.

pub mod error;
pub mod order;

pub use error::*;
pub use order::*;
