//! Interpreter configuration
//!
//! Loaded from an optional TOML file and `BDI_`-prefixed environment
//! variables (a `.env` file is read first). Environment variables win.
//!
//! ```toml
//! default_rule_order = "linear"
//! rng_seed = 42
//! log_filter = "bdi_core=debug"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::program::RuleOrder;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "bdi.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Order used by modules that declare none and have no calling module
    pub default_rule_order: RuleOrder,

    /// Seed for random rule orders and the default learner
    pub rng_seed: Option<u64>,

    /// Filter for the tracing subscriber when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_rule_order: RuleOrder::Linear,
            rng_seed: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load using `BDI_CONFIG_PATH` or the default file, if present
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let path = std::env::var("BDI_CONFIG_PATH").ok();
        Self::load_from(path.as_deref())
    }

    /// Load from `path` (required when given) layered under the environment
    pub fn load_from(path: Option<&str>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::new(path, config::FileFormat::Toml).required(true),
            None => config::File::new(DEFAULT_CONFIG_FILE, config::FileFormat::Toml).required(false),
        };

        config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("BDI").try_parsing(true))
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("Invalid configuration")
    }
}
