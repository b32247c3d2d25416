//! # Test Doubles
//!
//! Deterministic stand-ins for the kitchen's collaborators, so tests can drive time,
//! decay and randomness by hand.
//!
//! ```rust,ignore
//! let clock = Arc::new(ManualClock::new(0));
//! let display = Arc::new(RecordingDisplay::default());
//! let kitchen = Kitchen::from_configs(configs, clock.clone(), Arc::new(FixedExpiration::at(10)), display.clone())?;
//!
//! kitchen.process_order(order);
//! clock.advance(11);
//! assert_eq!(kitchen.snapshot().total_count(), 0);
//! ```

use crate::dispatch::EventCountGenerator;
use crate::display::{KitchenDisplay, KitchenEvent, KitchenSnapshot};
use crate::kitchen::{Clock, Evaluator, Shelf};
use crate::model::Order;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self { now: AtomicU64::new(now) }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
enum ExpirationRule {
    At(u64),
    OnPlacement,
    AfterPlacement(u64),
}

/// An evaluator with a scripted expiration and undecayed value
/// (`shelf_life - age`).
#[derive(Debug, Clone, Copy)]
pub struct FixedExpiration {
    rule: ExpirationRule,
}

impl FixedExpiration {
    /// Every order expires at the absolute time `expiration`.
    pub fn at(expiration: u64) -> Self {
        Self { rule: ExpirationRule::At(expiration) }
    }

    /// Orders expire the moment they are placed.
    pub fn immediately() -> Self {
        Self { rule: ExpirationRule::OnPlacement }
    }

    /// Orders expire `extra` seconds after their shelf life runs out.
    pub fn after_placement(extra: u64) -> Self {
        Self { rule: ExpirationRule::AfterPlacement(extra) }
    }
}

impl Evaluator for FixedExpiration {
    fn value(&self, _shelf: &Shelf, order: &Order, order_age: u64) -> f64 {
        order.shelf_life as f64 - order_age as f64
    }

    fn expiration(&self, _shelf: &Shelf, order: &Order, now: u64) -> u64 {
        match self.rule {
            ExpirationRule::At(expiration) => expiration,
            ExpirationRule::OnPlacement => now,
            ExpirationRule::AfterPlacement(extra) => now + order.shelf_life + extra,
        }
    }
}

/// Collects every event it is shown.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    events: Mutex<Vec<(KitchenEvent, KitchenSnapshot)>>,
}

impl RecordingDisplay {
    pub fn events(&self) -> Vec<KitchenEvent> {
        self.events.lock().iter().map(|(event, _)| event.clone()).collect()
    }

    /// The snapshot that accompanied the most recent event.
    pub fn last_snapshot(&self) -> Option<KitchenSnapshot> {
        self.events.lock().last().map(|(_, snapshot)| snapshot.clone())
    }
}

impl KitchenDisplay for RecordingDisplay {
    fn display(&self, event: &KitchenEvent, snapshot: &KitchenSnapshot) {
        self.events.lock().push((event.clone(), snapshot.clone()));
    }
}

/// A generator that replays scripted counts, then repeats the last one.
#[derive(Debug)]
pub struct FixedCount {
    counts: Mutex<VecDeque<u32>>,
    last: AtomicU32,
}

impl FixedCount {
    pub fn new(count: u32) -> Self {
        Self::sequence([count])
    }

    pub fn sequence(counts: impl IntoIterator<Item = u32>) -> Self {
        Self {
            counts: Mutex::new(counts.into_iter().collect()),
            last: AtomicU32::new(0),
        }
    }
}

impl EventCountGenerator for FixedCount {
    fn events_count(&self, _mean: f64) -> u32 {
        match self.counts.lock().pop_front() {
            Some(count) => {
                self.last.store(count, Ordering::SeqCst);
                count
            }
            None => self.last.load(Ordering::SeqCst),
        }
    }
}
