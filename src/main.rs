//! # kitchen-sim
//!
//! Runs one simulation: loads settings and orders, starts the arrival and courier loops,
//! and prints every kitchen event until the couriers find the kitchen empty.

use clap::{Parser, ValueEnum};
use kitchen_sim::display::{ConsoleDisplay, JsonDisplay, KitchenDisplay, TracingDisplay};
use kitchen_sim::lifecycle::tracing::setup_tracing;
use kitchen_sim::lifecycle::{KitchenSystem, SimulationConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Instrument};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DisplayMode {
    /// Events plus the contents of every shelf.
    Full,
    /// Events with shelf counts only.
    Summary,
    /// Events as log records.
    Log,
    /// One JSON object per event, snapshot included.
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "kitchen-sim", version, about = "Simulates a delivery kitchen")]
struct Args {
    /// TOML settings file; built-in defaults otherwise.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON orders file, overriding the one in the settings.
    #[arg(short, long)]
    orders: Option<PathBuf>,

    /// Mean orders per second.
    #[arg(long)]
    arrival_rate: Option<f64>,

    /// Mean couriers per second.
    #[arg(long)]
    pickup_rate: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = DisplayMode::Full)]
    display: DisplayMode,
}

impl Args {
    fn into_config(self) -> Result<(SimulationConfig, DisplayMode), String> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_toml_file(path).map_err(|e| e.to_string())?,
            None => SimulationConfig::default(),
        };
        if let Some(orders) = self.orders {
            config.orders_path = orders;
        }
        if let Some(rate) = self.arrival_rate {
            config.arrival_rate = rate;
        }
        if let Some(rate) = self.pickup_rate {
            config.pickup_rate = rate;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate().map_err(|e| e.to_string())?;
        Ok((config, self.display))
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let (config, mode) = Args::parse().into_config()?;
    let orders = config.load_orders().map_err(|e| e.to_string())?;
    info!(orders = orders.len(), path = %config.orders_path.display(), "Loaded orders");

    let display: Arc<dyn KitchenDisplay> = match mode {
        DisplayMode::Full => Arc::new(ConsoleDisplay::new(true)),
        DisplayMode::Summary => Arc::new(ConsoleDisplay::new(false)),
        DisplayMode::Log => Arc::new(TracingDisplay),
        DisplayMode::Json => Arc::new(JsonDisplay),
    };
    let system = KitchenSystem::new(&config, orders, display).map_err(|e| e.to_string())?;

    let span = tracing::info_span!("simulation");
    async {
        system.start();
        system.wait_until_completed().await;
    }
    .instrument(span)
    .await;

    system.shutdown().await
}
