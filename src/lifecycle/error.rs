use crate::kitchen::KitchenError;
use crate::model::OrderError;
use std::path::PathBuf;
use thiserror::Error;

/// Startup failures: unreadable files, bad settings, or an unbuildable kitchen.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid orders file {path}: {source}")]
    Orders {
        path: PathBuf,
        #[source]
        source: OrderError,
    },

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Kitchen(#[from] KitchenError),
}
