//! # Value Evaluation
//!
//! An [`Evaluator`] decides how fast an order loses value on a given shelf and,
//! consequently, when it expires. Shelves receive one at construction and never look
//! at the formula themselves; the storage invariants hold for any evaluator whose
//! value is non-increasing in age.

use super::shelf::Shelf;
use crate::model::Order;

/// Computes the value and expiration of an order on a shelf.
///
/// Implementations must keep the two methods consistent: for a placement at time `t`
/// and an age `a`, `value(shelf, order, a) > 0` exactly when
/// `t + a < expiration(shelf, order, t)`.
pub trait Evaluator: Send + Sync {
    /// Value of `order` after it has been on `shelf` for `order_age` seconds.
    fn value(&self, shelf: &Shelf, order: &Order, order_age: u64) -> f64;

    /// Absolute time (epoch seconds) at which `order` is worthless if placed on `shelf`
    /// at `now`.
    fn expiration(&self, shelf: &Shelf, order: &Order, now: u64) -> u64;
}

/// Linear decay, accelerated by the shelf's decay modifier.
///
/// `value = shelf_life - age - decay_rate * age * modifier`
///
/// An overflow shelf typically uses a modifier of `2.0`, so orders parked there lose
/// value twice as fast from decay.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecayEvaluator;

impl DecayEvaluator {
    fn loss_per_second(shelf: &Shelf, order: &Order) -> f64 {
        1.0 + order.decay_rate * shelf.decay_modifier()
    }
}

impl Evaluator for DecayEvaluator {
    fn value(&self, shelf: &Shelf, order: &Order, order_age: u64) -> f64 {
        order.shelf_life as f64 - order_age as f64 * Self::loss_per_second(shelf, order)
    }

    fn expiration(&self, shelf: &Shelf, order: &Order, now: u64) -> u64 {
        let lifetime = (order.shelf_life as f64 / Self::loss_per_second(shelf, order)).ceil();
        now.saturating_add(lifetime as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kitchen::{ShelfConfig, SystemClock};
    use crate::model::Temperature;
    use std::sync::Arc;

    fn shelf(modifier: f64) -> Shelf {
        let config = ShelfConfig::new("hot", [Temperature::Hot], 10, 1).with_decay_modifier(modifier);
        Shelf::new(config, Arc::new(SystemClock), Arc::new(DecayEvaluator)).unwrap()
    }

    #[test]
    fn test_value_decays_to_zero_at_expiration() {
        let order = Order::new("soup", Temperature::Hot, 20, 0.63, 0).unwrap();
        let shelf = shelf(1.0);
        let evaluator = DecayEvaluator;

        let expiration = evaluator.expiration(&shelf, &order, 100);
        let lifetime = expiration - 100;
        assert_eq!(lifetime, 13);
        assert!(evaluator.value(&shelf, &order, lifetime - 1) > 0.0);
        assert!(evaluator.value(&shelf, &order, lifetime) <= 0.0);
        assert_eq!(evaluator.value(&shelf, &order, 0), 20.0);
    }

    #[test]
    fn test_overflow_modifier_shortens_life() {
        let order = Order::new("soup", Temperature::Hot, 20, 1.0, 0).unwrap();
        let evaluator = DecayEvaluator;

        assert_eq!(evaluator.expiration(&shelf(1.0), &order, 0), 10);
        assert_eq!(evaluator.expiration(&shelf(2.0), &order, 0), 7);
        assert!(evaluator.value(&shelf(2.0), &order, 5) < evaluator.value(&shelf(1.0), &order, 5));
    }

    #[test]
    fn test_zero_decay_expires_at_shelf_life() {
        let order = Order::new("ice", Temperature::Frozen, 30, 0.0, 0).unwrap();
        assert_eq!(DecayEvaluator.expiration(&shelf(2.0), &order, 5), 35);
        assert_eq!(DecayEvaluator.value(&shelf(2.0), &order, 30), 0.0);
    }
}
