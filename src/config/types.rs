use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings applied to every store built with [`Store::with_config`](crate::store::Store::with_config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Name attached to the store's log events (default: "store").
    #[serde(default = "default_store_name")]
    pub name: String,
    /// How many re-entrant dispatches a single outer dispatch may drain
    /// before it is aborted (default: 64).
    #[serde(default = "default_max_nested_dispatches")]
    pub max_nested_dispatches: usize,
}

/// Tracing output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Write logs to this file instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Colored output for the stderr layer (default: true).
    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

fn default_store_name() -> String {
    "store".to_string()
}

fn default_max_nested_dispatches() -> usize {
    64
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_ansi() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_store_name(),
            max_nested_dispatches: default_max_nested_dispatches(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
            ansi: default_ansi(),
        }
    }
}

impl StoreConfig {
    /// Default settings with a custom store name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
