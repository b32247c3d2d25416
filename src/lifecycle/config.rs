use super::error::ConfigError;
use crate::kitchen::ShelfConfig;
use crate::model::OrderRecord;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for one simulation run.
///
/// Every field has a default, so a TOML file only needs the values it changes:
///
/// ```toml
/// orders_path = "demos/orders.json"
/// arrival_rate = 2.0
///
/// [[shelves]]
/// name = "hot"
/// accepts = ["hot"]
/// capacity = 10
/// coefficient = 1
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// JSON array of order records.
    pub orders_path: PathBuf,
    /// Mean order arrivals per second.
    pub arrival_rate: f64,
    /// Mean courier arrivals per second.
    pub pickup_rate: f64,
    /// How long a courier waits for an order before giving up.
    pub pickup_timeout_secs: u64,
    /// Period of both dispatch loops.
    pub tick_millis: u64,
    /// Fixes the random event counts, for reproducible runs.
    pub seed: Option<u64>,
    pub shelves: Vec<ShelfConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            orders_path: PathBuf::from("orders.json"),
            arrival_rate: 3.25,
            pickup_rate: 3.25,
            pickup_timeout_secs: 5,
            tick_millis: 1000,
            seed: None,
            shelves: ShelfConfig::default_layout(),
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path.as_ref())?)
    }

    /// Rejects rates and intervals the dispatch loops cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, rate) in [("arrival_rate", self.arrival_rate), ("pickup_rate", self.pickup_rate)] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{rate} is not a non-negative rate"),
                });
            }
        }
        if self.tick_millis == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_millis",
                reason: "must be at least 1".into(),
            });
        }
        if self.shelves.is_empty() {
            return Err(ConfigError::Invalid {
                field: "shelves",
                reason: "at least one shelf is required".into(),
            });
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub fn pickup_timeout(&self) -> Duration {
        Duration::from_secs(self.pickup_timeout_secs)
    }

    /// Reads and parses the file at [`orders_path`](Self::orders_path).
    pub fn load_orders(&self) -> Result<Vec<OrderRecord>, ConfigError> {
        let text = read(&self.orders_path)?;
        OrderRecord::parse_list(&text).map_err(|source| ConfigError::Orders {
            path: self.orders_path.clone(),
            source,
        })
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
