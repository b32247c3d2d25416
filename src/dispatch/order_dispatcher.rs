use super::generator::EventCountGenerator;
use super::scheduler::Dispatch;
use crate::kitchen::{Clock, Kitchen, Placement};
use crate::model::{Order, OrderRecord};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Anything that accepts freshly created orders.
#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn submit(&self, order: Order) -> Placement;
}

#[async_trait]
impl OrderSink for Kitchen {
    async fn submit(&self, order: Order) -> Placement {
        self.process_order(order)
    }
}

/// Feeds orders from a finite source into the kitchen at a Poisson rate.
///
/// Each tick submits `events_count(rate × interval)` orders, or fewer if the source
/// runs dry. Records that fail validation are logged and skipped. The unit is
/// exhausted once every record has been consumed.
pub struct OrderDispatcher {
    sink: Arc<dyn OrderSink>,
    generator: Arc<dyn EventCountGenerator>,
    clock: Arc<dyn Clock>,
    orders: VecDeque<OrderRecord>,
    rate: f64,
    interval: Duration,
}

impl OrderDispatcher {
    /// `rate` is in orders per second.
    pub fn new(
        sink: Arc<dyn OrderSink>,
        generator: Arc<dyn EventCountGenerator>,
        clock: Arc<dyn Clock>,
        orders: impl IntoIterator<Item = OrderRecord>,
        rate: f64,
        interval: Duration,
    ) -> Self {
        Self {
            sink,
            generator,
            clock,
            orders: orders.into_iter().collect(),
            rate,
            interval,
        }
    }

    /// Records not yet submitted.
    pub fn remaining(&self) -> usize {
        self.orders.len()
    }
}

#[async_trait]
impl Dispatch for OrderDispatcher {
    #[instrument(skip(self))]
    async fn dispatch(&mut self) -> bool {
        let count = self.generator.events_count(self.rate * self.interval.as_secs_f64());
        debug!(count, remaining = self.orders.len(), "Order arrivals");

        for _ in 0..count {
            let Some(record) = self.orders.pop_front() else {
                break;
            };
            match record.into_order(self.clock.now()) {
                Ok(order) => {
                    self.sink.submit(order).await;
                }
                Err(e) => warn!(error = %e, "Skipping invalid order"),
            }
        }
        !self.orders.is_empty()
    }

    fn next_delay(&mut self) -> Duration {
        self.interval
    }
}
