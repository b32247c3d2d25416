//! # Kitchen Coordinator
//!
//! The [`Kitchen`] owns every shelf and a global min-heap of placed orders keyed by
//! expiration. Placement picks the first shelf (by ascending coefficient) with room
//! for the order. Pickup hands out the order closest to spoiling across all shelves.
//!
//! ## Locking
//!
//! - A kitchen-wide mutex serializes the scan-and-place and the check-and-remove
//!   critical sections. Without it two placements could both see the last free slot
//!   of a shelf, or a pickup could race a placement on the same order.
//! - Each shelf has its own mutex, always taken *after* the kitchen-wide one.
//! - The pickup heap has a leaf mutex held only for a single push or pop.
//!
//! No lock is ever held across an `.await`.

use super::clock::Clock;
use super::error::KitchenError;
use super::evaluator::Evaluator;
use super::shelf::{Shelf, ShelfConfig};
use crate::display::{KitchenDisplay, KitchenEvent, KitchenSnapshot};
use crate::model::Order;
use parking_lot::Mutex;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info};

/// Outcome of [`Kitchen::process_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The order now sits on the named shelf.
    Placed { shelf: String },
    /// No shelf could take the order; it is gone.
    Wasted,
}

/// Entry of the global pickup heap.
struct Pending {
    expiration: u64,
    shelf: usize,
    order: Arc<Order>,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.expiration == other.expiration
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.expiration.cmp(&other.expiration)
    }
}

/// The shared order-fulfillment engine.
///
/// Built once at startup and shared as `Arc<Kitchen>` between the arrival and pickup
/// loops.
pub struct Kitchen {
    shelves: Arc<[Arc<Shelf>]>,
    pickup_queue: Mutex<BinaryHeap<Reverse<Pending>>>,
    available: Notify,
    lock: Mutex<()>,
    clock: Arc<dyn Clock>,
    display: Arc<dyn KitchenDisplay>,
}

impl Kitchen {
    /// Assembles a kitchen from ready-made shelves.
    ///
    /// Shelves are sorted by coefficient and each gets a spoiled-order callback that
    /// reports to `display`.
    ///
    /// # Errors
    /// [`KitchenError::DuplicateShelf`] or [`KitchenError::AmbiguousPreference`] when
    /// names or coefficients collide.
    pub fn new(
        shelves: Vec<Shelf>,
        clock: Arc<dyn Clock>,
        display: Arc<dyn KitchenDisplay>,
    ) -> Result<Self, KitchenError> {
        let mut shelves = shelves;
        shelves.sort_by_key(Shelf::coefficient);
        for pair in shelves.windows(2) {
            if pair[0].coefficient() == pair[1].coefficient() {
                return Err(KitchenError::AmbiguousPreference {
                    first: pair[0].name().to_string(),
                    second: pair[1].name().to_string(),
                    coefficient: pair[0].coefficient(),
                });
            }
        }
        for (i, shelf) in shelves.iter().enumerate() {
            if shelves[..i].iter().any(|other| other.name() == shelf.name()) {
                return Err(KitchenError::DuplicateShelf(shelf.name().to_string()));
            }
        }

        let shelves: Arc<[Arc<Shelf>]> = shelves.into_iter().map(Arc::new).collect();
        let weak: Weak<[Arc<Shelf>]> = Arc::downgrade(&shelves);
        for shelf in shelves.iter() {
            let weak = weak.clone();
            let display = display.clone();
            shelf.set_expiration_callback(Arc::new(move |shelf: &Shelf, order: &Order| {
                info!(order = %order.name, shelf = %shelf.name(), "Spoiled");
                let snapshot = weak
                    .upgrade()
                    .map(|shelves| snapshot_of(&shelves))
                    .unwrap_or_default();
                let event = KitchenEvent::Spoiled {
                    order: order.name.clone(),
                    shelf: shelf.name().to_string(),
                };
                display.display(&event, &snapshot);
            }));
        }

        Ok(Self {
            shelves,
            pickup_queue: Mutex::new(BinaryHeap::new()),
            available: Notify::new(),
            lock: Mutex::new(()),
            clock,
            display,
        })
    }

    /// Builds the shelves from configuration, all sharing `clock` and `evaluator`.
    pub fn from_configs(
        configs: Vec<ShelfConfig>,
        clock: Arc<dyn Clock>,
        evaluator: Arc<dyn Evaluator>,
        display: Arc<dyn KitchenDisplay>,
    ) -> Result<Self, KitchenError> {
        let shelves = configs
            .into_iter()
            .map(|config| Shelf::new(config, clock.clone(), evaluator.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(shelves, clock, display)
    }

    /// Shelves in placement order.
    pub fn shelves(&self) -> &[Arc<Shelf>] {
        &self.shelves
    }

    pub fn shelf(&self, name: &str) -> Option<&Arc<Shelf>> {
        self.shelves.iter().find(|s| s.name() == name)
    }

    /// Number of entries waiting in the pickup heap, stale ones included.
    pub fn pending_pickups(&self) -> usize {
        self.pickup_queue.lock().len()
    }

    /// Places `order` on the first shelf with room for it, or wastes it.
    pub fn process_order(&self, order: Order) -> Placement {
        let order = Arc::new(order);
        let _guard = self.lock.lock();

        let Some((index, shelf)) = self
            .shelves
            .iter()
            .enumerate()
            .find(|(_, shelf)| shelf.check_order(&order))
        else {
            info!(order = %order.name, temperature = %order.temperature, "Wasted");
            self.report(KitchenEvent::Wasted { order: order.name.clone() });
            return Placement::Wasted;
        };

        let expiration = match shelf.add(order.clone()) {
            Ok(expiration) => expiration,
            Err(e) => {
                info!(order = %order.name, error = %e, "Wasted");
                self.report(KitchenEvent::Wasted { order: order.name.clone() });
                return Placement::Wasted;
            }
        };
        self.pickup_queue.lock().push(Reverse(Pending {
            expiration,
            shelf: index,
            order: order.clone(),
        }));
        self.available.notify_one();

        info!(order = %order.name, shelf = %shelf.name(), expiration, "Processed");
        self.report(KitchenEvent::Processed {
            order: order.name.clone(),
            shelf: shelf.name().to_string(),
        });
        Placement::Placed { shelf: shelf.name().to_string() }
    }

    /// Takes the order closest to expiring, waiting up to `timeout` for one.
    ///
    /// Entries that turn out stale (spoiled or already taken) are dropped after
    /// letting their shelf purge, and the next candidate is tried. Returns `None`
    /// once the deadline passes with nothing to hand out. A timeout too large to
    /// represent as a deadline waits indefinitely.
    pub async fn pick_up_order(&self, timeout: Duration) -> Option<Arc<Order>> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let candidate = self.next_candidate(deadline).await?;
            if self.try_pick_up(&candidate) {
                return Some(candidate.order);
            }
        }
    }

    /// Point-in-time view of every shelf.
    pub fn snapshot(&self) -> KitchenSnapshot {
        snapshot_of(&self.shelves)
    }

    async fn next_candidate(&self, deadline: Option<Instant>) -> Option<Pending> {
        loop {
            if let Some(pending) = self.pop_pending() {
                return Some(pending);
            }
            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, self.available.notified()).await.is_err() {
                        return None;
                    }
                }
                None => self.available.notified().await,
            }
        }
    }

    fn pop_pending(&self) -> Option<Pending> {
        let mut queue = self.pickup_queue.lock();
        let next = queue.pop().map(|Reverse(pending)| pending);
        if next.is_some() && !queue.is_empty() {
            // Pass the wake-up on so a second waiting courier sees the rest.
            self.available.notify_one();
        }
        next
    }

    fn try_pick_up(&self, candidate: &Pending) -> bool {
        let _guard = self.lock.lock();
        let shelf = &self.shelves[candidate.shelf];
        let order = &candidate.order;

        if order.can_be_picked_up_at(self.clock.now()) {
            match shelf.remove(order) {
                Ok(value) => {
                    info!(order = %order.name, shelf = %shelf.name(), value, "Picked up");
                    self.report(KitchenEvent::PickedUp {
                        order: order.name.clone(),
                        shelf: shelf.name().to_string(),
                        value,
                    });
                    return true;
                }
                Err(e) => debug!(order = %order.name, error = %e, "Stale pickup"),
            }
        } else {
            debug!(order = %order.name, shelf = %shelf.name(), "Stale pickup");
            // Last order of a shelf would otherwise linger until the next placement.
            shelf.count();
        }
        false
    }

    fn report(&self, event: KitchenEvent) {
        let snapshot = self.snapshot();
        self.display.display(&event, &snapshot);
    }
}

fn snapshot_of(shelves: &[Arc<Shelf>]) -> KitchenSnapshot {
    KitchenSnapshot {
        shelves: shelves.iter().map(|shelf| shelf.snapshot()).collect(),
    }
}

impl std::fmt::Debug for Kitchen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kitchen")
            .field("shelves", &self.shelves)
            .field("pending_pickups", &self.pending_pickups())
            .finish_non_exhaustive()
    }
}
