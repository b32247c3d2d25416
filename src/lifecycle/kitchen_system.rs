use super::config::SimulationConfig;
use super::error::ConfigError;
use crate::dispatch::{
    CourierDispatcher, EventCountGenerator, OrderDispatcher, PoissonGenerator, RecurringScheduler,
};
use crate::display::KitchenDisplay;
use crate::kitchen::{Clock, DecayEvaluator, Kitchen, SystemClock};
use crate::model::OrderRecord;
use std::sync::Arc;
use tracing::{error, info};

/// The running simulation: one kitchen fed by an arrival loop and drained by a
/// courier loop.
///
/// `KitchenSystem` is responsible for:
/// - **Wiring**: building the shelves from [`SimulationConfig`] and sharing one
///   [`Kitchen`] between both dispatchers
/// - **Lifecycle**: starting both schedulers, waiting for them, stopping them
///
/// # Example
///
/// ```ignore
/// let config = SimulationConfig::from_toml_file("kitchen.toml")?;
/// let orders = config.load_orders()?;
/// let system = KitchenSystem::new(&config, orders, Arc::new(ConsoleDisplay::default()))?;
///
/// system.start();
/// system.wait_until_completed().await;
/// system.shutdown().await?;
/// ```
pub struct KitchenSystem {
    /// The shared kitchen, for inspection while the loops run.
    pub kitchen: Arc<Kitchen>,
    arrivals: RecurringScheduler<OrderDispatcher>,
    pickups: RecurringScheduler<CourierDispatcher>,
}

impl KitchenSystem {
    /// Builds a system on the wall clock with [`DecayEvaluator`] shelves and Poisson
    /// event counts.
    pub fn new(
        config: &SimulationConfig,
        orders: Vec<OrderRecord>,
        display: Arc<dyn KitchenDisplay>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let generator: Arc<dyn EventCountGenerator> = match config.seed {
            Some(seed) => Arc::new(PoissonGenerator::seeded(seed)),
            None => Arc::new(PoissonGenerator::new()),
        };
        let kitchen = Kitchen::from_configs(
            config.shelves.clone(),
            clock.clone(),
            Arc::new(DecayEvaluator),
            display,
        )?;
        Ok(Self::with_parts(config, orders, Arc::new(kitchen), clock, generator))
    }

    /// Wires an already built kitchen. Used by tests to inject a manual clock and
    /// scripted event counts.
    pub fn with_parts(
        config: &SimulationConfig,
        orders: Vec<OrderRecord>,
        kitchen: Arc<Kitchen>,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn EventCountGenerator>,
    ) -> Self {
        let arrivals = OrderDispatcher::new(
            kitchen.clone(),
            generator.clone(),
            clock,
            orders,
            config.arrival_rate,
            config.tick(),
        );
        let pickups = CourierDispatcher::new(
            kitchen.clone(),
            generator,
            config.pickup_rate,
            config.pickup_timeout(),
            config.tick(),
        );

        Self {
            kitchen,
            arrivals: RecurringScheduler::new("arrivals", arrivals),
            pickups: RecurringScheduler::new("pickups", pickups),
        }
    }

    /// Starts both loops. Must be called from within a Tokio runtime.
    pub fn start(&self) {
        info!(shelves = self.kitchen.shelves().len(), "Starting kitchen");
        self.arrivals.start();
        self.pickups.start();
    }

    /// Resolves once all orders have arrived and couriers found nothing left.
    pub async fn wait_until_completed(&self) {
        self.arrivals.wait_until_completed().await;
        info!("All orders submitted");
        self.pickups.wait_until_completed().await;
        info!(remaining = self.kitchen.snapshot().total_count(), "Couriers done");
    }

    /// Stops both loops and waits for their tasks to exit.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if both tasks ended cleanly
    /// - `Err(String)` if either task panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down kitchen...");
        self.arrivals.stop();
        self.pickups.stop();

        for result in [self.arrivals.join().await, self.pickups.join().await] {
            if let Err(e) = result {
                error!(error = %e, "Scheduler task failed");
                return Err(e);
            }
        }

        info!("Kitchen shutdown complete.");
        Ok(())
    }
}

impl std::fmt::Debug for KitchenSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KitchenSystem")
            .field("kitchen", &self.kitchen)
            .field("arrivals_running", &self.arrivals.is_running())
            .field("pickups_running", &self.pickups.is_running())
            .finish()
    }
}
