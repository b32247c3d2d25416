//! # Shelf Storage
//!
//! A [`Shelf`] holds orders of the temperatures it accepts, up to its capacity, in a
//! min-heap keyed by expiration.
//!
//! ## Lazy Cleanup
//!
//! Nothing is deleted from the middle of the heap. Picking an order up only stamps
//! it and bumps a pending counter. Every capacity- or count-sensitive call first runs
//! a purge that pops from the top of the heap while the top is either picked up or
//! expired. Because the heap is ordered by expiration, an unexpired, unclaimed top
//! proves nothing below it is expired either. Both [`Shelf::add`] and
//! [`Shelf::remove`] therefore stay amortized `O(log n)`.
//!
//! ## Concurrency
//!
//! All mutable state sits behind one mutex and every public method takes it exactly
//! once, so each call is atomic. The expiration callback runs after the lock is
//! released; it may freely call back into this shelf or its siblings.

use super::clock::Clock;
use super::error::KitchenError;
use super::evaluator::Evaluator;
use crate::display::{OrderValue, ShelfSnapshot};
use crate::model::{Order, PickedUp, Processed, Temperature};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Invoked once per order that expired on a shelf without being picked up.
pub type ExpirationCallback = Arc<dyn Fn(&Shelf, &Order) + Send + Sync>;

/// Construction-time description of a shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfConfig {
    pub name: String,
    pub accepts: HashSet<Temperature>,
    pub capacity: usize,
    /// Placement preference; the kitchen tries shelves in ascending order.
    pub coefficient: i32,
    /// Extra decay applied by [`DecayEvaluator`](super::DecayEvaluator).
    #[serde(default = "default_decay_modifier")]
    pub decay_modifier: f64,
}

fn default_decay_modifier() -> f64 {
    1.0
}

impl ShelfConfig {
    pub fn new(
        name: impl Into<String>,
        accepts: impl IntoIterator<Item = Temperature>,
        capacity: usize,
        coefficient: i32,
    ) -> Self {
        Self {
            name: name.into(),
            accepts: accepts.into_iter().collect(),
            capacity,
            coefficient,
            decay_modifier: default_decay_modifier(),
        }
    }

    pub fn with_decay_modifier(mut self, decay_modifier: f64) -> Self {
        self.decay_modifier = decay_modifier;
        self
    }

    /// The standard four-shelf layout: one shelf per temperature plus an overflow
    /// shelf that takes anything but doubles decay.
    pub fn default_layout() -> Vec<ShelfConfig> {
        vec![
            ShelfConfig::new("hot", [Temperature::Hot], 15, 1),
            ShelfConfig::new("cold", [Temperature::Cold], 15, 2),
            ShelfConfig::new("frozen", [Temperature::Frozen], 15, 3),
            ShelfConfig::new("overflow", Temperature::ALL, 20, 4).with_decay_modifier(2.0),
        ]
    }
}

/// Heap entry; ordered by expiration only.
struct Slot {
    expiration: u64,
    order: Arc<Order>,
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.expiration == other.expiration
    }
}

impl Eq for Slot {}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.expiration.cmp(&other.expiration)
    }
}

#[derive(Default)]
struct ShelfState {
    orders: BinaryHeap<Reverse<Slot>>,
    /// Orders marked picked up but still physically in `orders`.
    picked_up: usize,
}

impl ShelfState {
    fn live_count(&self) -> usize {
        self.orders.len() - self.picked_up
    }

    /// Pops picked-up and expired orders off the top of the heap. Returns the
    /// expired ones so the caller can notify after unlocking.
    fn purge(&mut self, now: u64) -> Vec<Arc<Order>> {
        let mut expired = Vec::new();
        while let Some(Reverse(top)) = self.orders.peek() {
            if top.order.is_picked_up() {
                self.orders.pop();
                self.picked_up -= 1;
            } else if top.expiration <= now {
                if let Some(Reverse(slot)) = self.orders.pop() {
                    expired.push(slot.order);
                }
            } else {
                break;
            }
        }
        expired
    }
}

static NEXT_SHELF_ID: AtomicU64 = AtomicU64::new(1);

/// A capacity-limited, temperature-filtered shelf.
pub struct Shelf {
    id: u64,
    name: String,
    coefficient: i32,
    accepts: HashSet<Temperature>,
    capacity: usize,
    decay_modifier: f64,
    clock: Arc<dyn Clock>,
    evaluator: Arc<dyn Evaluator>,
    state: Mutex<ShelfState>,
    on_expired: OnceLock<ExpirationCallback>,
}

impl Shelf {
    /// Builds a shelf from its configuration.
    ///
    /// # Errors
    /// Rejects zero capacity, an empty set of accepted temperatures and a negative
    /// or non-finite decay modifier.
    pub fn new(
        config: ShelfConfig,
        clock: Arc<dyn Clock>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Result<Self, KitchenError> {
        if config.capacity == 0 {
            return Err(KitchenError::ZeroCapacity(config.name));
        }
        if config.accepts.is_empty() {
            return Err(KitchenError::NoAcceptedTemperatures(config.name));
        }
        if !config.decay_modifier.is_finite() || config.decay_modifier < 0.0 {
            return Err(KitchenError::InvalidDecayModifier {
                shelf: config.name,
                modifier: config.decay_modifier,
            });
        }
        Ok(Self {
            id: NEXT_SHELF_ID.fetch_add(1, AtomicOrdering::Relaxed),
            name: config.name,
            coefficient: config.coefficient,
            accepts: config.accepts,
            capacity: config.capacity,
            decay_modifier: config.decay_modifier,
            clock,
            evaluator,
            state: Mutex::new(ShelfState::default()),
            on_expired: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity stamped into [`Processed::shelf_id`]; unique per shelf instance.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn coefficient(&self) -> i32 {
        self.coefficient
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn decay_modifier(&self) -> f64 {
        self.decay_modifier
    }

    pub fn accepts(&self, temperature: Temperature) -> bool {
        self.accepts.contains(&temperature)
    }

    /// Registers the expiration callback. Only the first registration takes effect;
    /// returns `false` if one was already set.
    pub fn set_expiration_callback(&self, callback: ExpirationCallback) -> bool {
        self.on_expired.set(callback).is_ok()
    }

    /// Returns `true` iff this shelf accepts the order's temperature and has a free
    /// slot right now.
    pub fn check_order(&self, order: &Order) -> bool {
        self.with_purged(|state, _| {
            self.accepts(order.temperature) && state.live_count() < self.capacity
        })
    }

    /// Places `order` on the shelf, stamping its expiration and placement time.
    ///
    /// The caller is responsible for having checked capacity with
    /// [`check_order`](Self::check_order) under the same kitchen-wide lock.
    pub fn add(&self, order: Arc<Order>) -> Result<u64, KitchenError> {
        let now = self.clock.now();
        let expiration = self.evaluator.expiration(self, &order, now);
        order
            .mark_processed(Processed {
                shelf: self.name.clone(),
                shelf_id: self.id,
                expiration,
                placed_at: now,
            })
            .map_err(|_| KitchenError::AlreadyPlaced(order.name.clone()))?;

        debug!(shelf = %self.name, order = %order.name, expiration, "Added");
        self.state.lock().orders.push(Reverse(Slot { expiration, order }));
        Ok(expiration)
    }

    /// Marks `order` as picked up and returns its value at this moment.
    ///
    /// The heap entry stays in place until a later purge reaches it. The pending
    /// counter only moves for an order that is live on this shelf, so it never
    /// exceeds the number of entries physically present.
    pub fn remove(&self, order: &Order) -> Result<f64, KitchenError> {
        self.with_purged(|state, now| {
            let processed = match order.processed() {
                Some(processed) if processed.shelf_id == self.id => processed,
                _ => {
                    return Err(KitchenError::NotOnShelf {
                        order: order.name.clone(),
                        shelf: self.name.clone(),
                    })
                }
            };
            if order.is_picked_up() {
                return Err(KitchenError::AlreadyPickedUp(order.name.clone()));
            }
            if now >= processed.expiration {
                return Err(KitchenError::Expired(order.name.clone()));
            }

            let age = now.saturating_sub(processed.placed_at);
            let value = self.evaluator.value(self, order, age);
            order
                .mark_picked_up(PickedUp { value })
                .map_err(|_| KitchenError::AlreadyPickedUp(order.name.clone()))?;
            state.picked_up += 1;
            Ok(value)
        })
    }

    /// Number of live orders on the shelf.
    pub fn count(&self) -> usize {
        self.with_purged(|state, _| state.live_count())
    }

    /// Current value of `order` divided by its shelf life. Does not purge.
    pub fn normalized_value(&self, order: &Order) -> f64 {
        let now = self.clock.now();
        self.normalized_value_at(order, now)
    }

    /// Live orders with their normalized values, soonest-expiring first.
    pub fn live_orders(&self) -> Vec<OrderValue> {
        self.snapshot().orders
    }

    /// Count and live orders taken under a single lock acquisition.
    pub fn snapshot(&self) -> ShelfSnapshot {
        self.with_purged(|state, now| {
            let mut slots: Vec<&Slot> = state
                .orders
                .iter()
                .map(|Reverse(slot)| slot)
                .filter(|slot| slot.order.can_be_picked_up_at(now))
                .collect();
            slots.sort();
            ShelfSnapshot {
                name: self.name.clone(),
                count: state.live_count(),
                capacity: self.capacity,
                orders: slots
                    .into_iter()
                    .map(|slot| OrderValue {
                        name: slot.order.name.clone(),
                        value: self.normalized_value_at(&slot.order, now),
                    })
                    .collect(),
            }
        })
    }

    fn normalized_value_at(&self, order: &Order, now: u64) -> f64 {
        let age = order
            .processed()
            .map(|p| now.saturating_sub(p.placed_at))
            .unwrap_or(0);
        self.evaluator.value(self, order, age) / order.shelf_life as f64
    }

    /// Locks, purges, runs `f`, unlocks, then reports expirations.
    fn with_purged<R>(&self, f: impl FnOnce(&mut ShelfState, u64) -> R) -> R {
        let now = self.clock.now();
        let (result, expired) = {
            let mut state = self.state.lock();
            let expired = state.purge(now);
            (f(&mut *state, now), expired)
        };
        for order in expired {
            debug!(shelf = %self.name, order = %order.name, "Expired");
            if let Some(callback) = self.on_expired.get() {
                callback(self, &order);
            }
        }
        result
    }
}

impl std::fmt::Debug for Shelf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shelf")
            .field("name", &self.name)
            .field("coefficient", &self.coefficient)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{FixedExpiration, ManualClock};
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn hot(name: &str) -> Arc<Order> {
        Arc::new(Order::new(name, Temperature::Hot, 20, 0.5, 0).unwrap())
    }

    fn hot_shelf(capacity: usize, clock: Arc<ManualClock>, evaluator: FixedExpiration) -> Shelf {
        let config = ShelfConfig::new("hot", [Temperature::Hot], capacity, 1);
        Shelf::new(config, clock, Arc::new(evaluator)).unwrap()
    }

    #[test]
    fn test_add_remove_should_match_the_count() {
        let clock = Arc::new(ManualClock::new(0));
        let shelf = hot_shelf(5, clock, FixedExpiration::at(1));
        let orders: Vec<_> = (1..=6).map(|i| hot(&format!("order {i}"))).collect();

        shelf.add(orders[0].clone()).unwrap();
        shelf.add(orders[1].clone()).unwrap();
        shelf.add(orders[2].clone()).unwrap();
        assert_eq!(shelf.count(), 3);

        shelf.remove(&orders[0]).unwrap();
        assert_eq!(shelf.count(), 2);
        shelf.add(orders[3].clone()).unwrap();
        assert_eq!(shelf.count(), 3);
        shelf.remove(&orders[1]).unwrap();
        assert_eq!(shelf.count(), 2);
        shelf.add(orders[4].clone()).unwrap();
        assert_eq!(shelf.count(), 3);
        shelf.add(orders[5].clone()).unwrap();
        assert_eq!(shelf.count(), 4);
    }

    #[test]
    fn test_count_tracks_add_and_remove() {
        let clock = Arc::new(ManualClock::new(0));
        let shelf = hot_shelf(5, clock, FixedExpiration::at(100));
        let (o1, o2, o3) = (hot("order 1"), hot("order 2"), hot("order 3"));

        shelf.add(o1.clone()).unwrap();
        shelf.add(o2).unwrap();
        assert_eq!(shelf.count(), 2);
        shelf.remove(&o1).unwrap();
        assert_eq!(shelf.count(), 1);
        shelf.add(o3).unwrap();
        assert_eq!(shelf.count(), 2);
    }

    #[test]
    fn test_expired_order_should_be_removed() {
        let clock = Arc::new(ManualClock::new(0));
        let shelf = hot_shelf(5, clock.clone(), FixedExpiration::at(1));

        shelf.add(hot("order 1")).unwrap();
        assert_eq!(shelf.count(), 1);

        clock.set(u64::MAX);
        assert_eq!(shelf.count(), 0);

        clock.set(0);
        shelf.add(hot("order 2")).unwrap();
        shelf.add(hot("order 3")).unwrap();
        assert_eq!(shelf.count(), 2);
    }

    #[test]
    fn test_instant_expiry_frees_slot_without_remove() {
        let clock = Arc::new(ManualClock::new(10));
        let shelf = hot_shelf(1, clock, FixedExpiration::immediately());
        let order = hot("order 1");

        assert!(shelf.check_order(&order));
        shelf.add(order).unwrap();
        assert!(shelf.check_order(&hot("order 2")));
        assert_eq!(shelf.count(), 0);
    }

    #[test]
    fn test_check_order_respects_temperature_and_capacity() {
        let clock = Arc::new(ManualClock::new(0));
        let shelf = hot_shelf(1, clock, FixedExpiration::at(100));
        let cold = Order::new("salad", Temperature::Cold, 20, 0.5, 0).unwrap();

        assert!(!shelf.check_order(&cold));
        assert!(shelf.check_order(&hot("soup")));
        shelf.add(hot("soup")).unwrap();
        assert!(!shelf.check_order(&hot("stew")));
    }

    #[test]
    fn test_expiration_callback_fires_in_expiration_order() {
        let clock = Arc::new(ManualClock::new(0));
        let shelf = hot_shelf(5, clock.clone(), FixedExpiration::after_placement(0));
        let spoiled = Arc::new(Mutex::new(Vec::new()));
        let sink = spoiled.clone();
        assert!(shelf.set_expiration_callback(Arc::new(move |_: &Shelf, order: &Order| {
            sink.lock().push(order.name.clone());
        })));

        // Expirations equal the placement time plus shelf life, so later placements
        // expire later.
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            clock.set(i as u64);
            shelf.add(hot(name)).unwrap();
        }

        clock.set(21);
        assert_eq!(shelf.count(), 1);
        assert_eq!(*spoiled.lock(), vec!["a".to_string(), "b".to_string()]);
        assert!(!shelf.set_expiration_callback(Arc::new(|_: &Shelf, _: &Order| {})));
    }

    #[test]
    fn test_picked_up_orders_are_not_reported_as_expired() {
        let clock = Arc::new(ManualClock::new(0));
        let shelf = hot_shelf(5, clock.clone(), FixedExpiration::at(5));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        shelf.set_expiration_callback(Arc::new(move |_: &Shelf, _: &Order| {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
        }));

        let order = hot("order 1");
        shelf.add(order.clone()).unwrap();
        shelf.remove(&order).unwrap();
        clock.set(10);
        assert_eq!(shelf.count(), 0);
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let clock = Arc::new(ManualClock::new(0));
        let shelf = hot_shelf(5, clock.clone(), FixedExpiration::at(5));
        let (o1, o2) = (hot("order 1"), hot("order 2"));
        shelf.add(o1.clone()).unwrap();
        shelf.add(o2.clone()).unwrap();

        shelf.remove(&o1).unwrap();
        assert_eq!(shelf.remove(&o1), Err(KitchenError::AlreadyPickedUp("order 1".into())));
        assert_eq!(shelf.count(), 1);

        clock.set(5);
        assert_eq!(shelf.remove(&o2), Err(KitchenError::Expired("order 2".into())));
        assert_eq!(shelf.count(), 0);

        let stranger = hot("order 3");
        assert!(matches!(shelf.remove(&stranger), Err(KitchenError::NotOnShelf { .. })));
        assert_eq!(shelf.count(), 0);
    }

    #[test]
    fn test_same_named_shelves_do_not_share_orders() {
        let clock = Arc::new(ManualClock::new(0));
        let first = hot_shelf(5, clock.clone(), FixedExpiration::at(10));
        let second = hot_shelf(5, clock.clone(), FixedExpiration::at(10));
        assert_ne!(first.id(), second.id());

        let order = hot("order 1");
        first.add(order.clone()).unwrap();

        assert!(matches!(second.remove(&order), Err(KitchenError::NotOnShelf { .. })));
        assert!(!order.is_picked_up());
        assert_eq!(second.count(), 0);
        assert_eq!(first.count(), 1);

        clock.advance(3);
        assert_eq!(first.remove(&order), Ok(17.0));
        assert_eq!(first.count(), 0);
        assert_eq!(second.count(), 0);
    }

    #[test]
    fn test_add_twice_is_rejected() {
        let clock = Arc::new(ManualClock::new(0));
        let shelf = hot_shelf(5, clock, FixedExpiration::at(5));
        let order = hot("order 1");
        shelf.add(order.clone()).unwrap();
        assert_eq!(shelf.add(order), Err(KitchenError::AlreadyPlaced("order 1".into())));
        assert_eq!(shelf.count(), 1);
    }

    #[test]
    fn test_remove_records_value_at_pickup() {
        let clock = Arc::new(ManualClock::new(100));
        let shelf = hot_shelf(5, clock.clone(), FixedExpiration::at(200));
        let order = hot("order 1");
        shelf.add(order.clone()).unwrap();

        clock.set(104);
        let value = shelf.remove(&order).unwrap();
        assert_eq!(value, 16.0);
        assert_eq!(order.picked_up().map(|p| p.value), Some(16.0));
    }

    #[test]
    fn test_snapshot_lists_live_orders_with_normalized_values() {
        let clock = Arc::new(ManualClock::new(0));
        let shelf = hot_shelf(5, clock.clone(), FixedExpiration::after_placement(0));
        let (o1, o2, o3) = (hot("order 1"), hot("order 2"), hot("order 3"));
        shelf.add(o1.clone()).unwrap();
        clock.set(2);
        shelf.add(o2).unwrap();
        clock.set(3);
        shelf.add(o3).unwrap();
        shelf.remove(&o1).unwrap();

        clock.set(12);
        let snapshot = shelf.snapshot();
        assert_eq!(snapshot.name, "hot");
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.capacity, 5);
        let names: Vec<_> = snapshot.orders.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["order 2", "order 3"]);
        assert_eq!(snapshot.orders[0].value, 0.5);
        assert_eq!(shelf.live_orders().len(), 2);
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(0));
        let evaluator: Arc<dyn Evaluator> = Arc::new(FixedExpiration::at(1));

        let zero = ShelfConfig::new("hot", [Temperature::Hot], 0, 1);
        assert_eq!(
            Shelf::new(zero, clock.clone(), evaluator.clone()).unwrap_err(),
            KitchenError::ZeroCapacity("hot".into())
        );

        let none = ShelfConfig::new("void", [], 3, 1);
        assert_eq!(
            Shelf::new(none, clock.clone(), evaluator.clone()).unwrap_err(),
            KitchenError::NoAcceptedTemperatures("void".into())
        );

        let negative = ShelfConfig::new("hot", [Temperature::Hot], 3, 1).with_decay_modifier(-1.0);
        assert!(matches!(
            Shelf::new(negative, clock, evaluator),
            Err(KitchenError::InvalidDecayModifier { .. })
        ));
    }

    #[test]
    fn test_concurrent_adds_and_removes_never_exceed_capacity() {
        let clock = Arc::new(ManualClock::new(0));
        let shelf = Arc::new(hot_shelf(8, clock, FixedExpiration::at(1_000)));
        let gate = Arc::new(Mutex::new(()));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shelf = shelf.clone();
                let gate = gate.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let order = hot(&format!("t{t}-{i}"));
                        let placed = {
                            let _guard = gate.lock();
                            if shelf.check_order(&order) {
                                shelf.add(order.clone()).unwrap();
                                true
                            } else {
                                false
                            }
                        };
                        assert!(shelf.count() <= 8);
                        if placed && i % 2 == 0 {
                            shelf.remove(&order).unwrap();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(shelf.count() <= 8);
    }
}
