use super::generator::EventCountGenerator;
use super::scheduler::Dispatch;
use crate::kitchen::Kitchen;
use crate::model::Order;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Anything couriers can collect orders from.
#[async_trait]
pub trait PickupSource: Send + Sync {
    /// The next order to deliver, or `None` if nothing shows up within `timeout`.
    async fn pick_up(&self, timeout: Duration) -> Option<Arc<Order>>;
}

#[async_trait]
impl PickupSource for Kitchen {
    async fn pick_up(&self, timeout: Duration) -> Option<Arc<Order>> {
        self.pick_up_order(timeout).await
    }
}

/// Sends a Poisson-distributed number of couriers each tick.
///
/// Every courier waits up to `timeout` for an order. The first courier that comes
/// back empty-handed ends the run: the kitchen has drained.
pub struct CourierDispatcher {
    source: Arc<dyn PickupSource>,
    generator: Arc<dyn EventCountGenerator>,
    rate: f64,
    timeout: Duration,
    interval: Duration,
}

impl CourierDispatcher {
    /// `rate` is in couriers per second.
    pub fn new(
        source: Arc<dyn PickupSource>,
        generator: Arc<dyn EventCountGenerator>,
        rate: f64,
        timeout: Duration,
        interval: Duration,
    ) -> Self {
        Self { source, generator, rate, timeout, interval }
    }
}

#[async_trait]
impl Dispatch for CourierDispatcher {
    #[instrument(skip(self))]
    async fn dispatch(&mut self) -> bool {
        let couriers = self.generator.events_count(self.rate * self.interval.as_secs_f64());
        debug!(couriers, "Courier arrivals");

        for _ in 0..couriers {
            match self.source.pick_up(self.timeout).await {
                Some(order) => debug!(order = %order.name, "Delivered"),
                None => {
                    info!(timeout = ?self.timeout, "No orders left to pick up");
                    return false;
                }
            }
        }
        true
    }

    fn next_delay(&mut self) -> Duration {
        self.interval
    }
}
