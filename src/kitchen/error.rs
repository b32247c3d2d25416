//! Error types for the kitchen and its shelves.

use thiserror::Error;

/// Errors that can occur while building or mutating the kitchen.
///
/// None of these are raised on the normal order flow: a wasted order or an empty
/// pickup is an ordinary outcome, not an error.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum KitchenError {
    /// A shelf was configured with zero capacity.
    #[error("Shelf {0} must have a capacity greater than zero")]
    ZeroCapacity(String),

    /// A shelf was configured without any accepted temperature.
    #[error("Shelf {0} does not accept any temperature")]
    NoAcceptedTemperatures(String),

    /// A shelf's decay modifier is negative or not finite.
    #[error("Shelf {shelf} has an invalid decay modifier: {modifier}")]
    InvalidDecayModifier { shelf: String, modifier: f64 },

    /// Two shelves share a name.
    #[error("Duplicate shelf name: {0}")]
    DuplicateShelf(String),

    /// Two shelves share a placement coefficient, so placement order is ambiguous.
    #[error("Shelves {first} and {second} share placement coefficient {coefficient}")]
    AmbiguousPreference {
        first: String,
        second: String,
        coefficient: i32,
    },

    /// The order already sits on a shelf.
    #[error("Order {0} has already been placed")]
    AlreadyPlaced(String),

    /// The order is not held by this shelf.
    #[error("Order {order} is not on shelf {shelf}")]
    NotOnShelf { order: String, shelf: String },

    /// The order has already been taken by a courier.
    #[error("Order {0} has already been picked up")]
    AlreadyPickedUp(String),

    /// The order spoiled before it could be taken.
    #[error("Order {0} has expired")]
    Expired(String),
}
