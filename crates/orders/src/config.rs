//! Order factory configuration
//!
//! Loaded from JSON. Identifiers are kept as plain strings until
//! [`OrderFactoryConfig::validate`] parses them.

use std::path::Path;

use kestrel_core::{StrategyId, TraderId};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFactoryConfig {
    /// Trader identity, `NAME-TAG`
    #[serde(default = "default_trader_id")]
    pub trader_id: String,

    /// Strategy identity, `NAME-TAG`
    #[serde(default = "default_strategy_id")]
    pub strategy_id: String,

    /// Client order IDs continue counting from here
    #[serde(default)]
    pub initial_order_count: u64,

    /// Order list IDs continue counting from here
    #[serde(default)]
    pub initial_list_count: u64,

    /// Use random UUIDs instead of the dated, counted format
    #[serde(default)]
    pub use_uuid_client_order_ids: bool,
}

fn default_trader_id() -> String {
    "TRADER-001".to_string()
}

fn default_strategy_id() -> String {
    "S-001".to_string()
}

impl Default for OrderFactoryConfig {
    fn default() -> Self {
        Self {
            trader_id: default_trader_id(),
            strategy_id: default_strategy_id(),
            initial_order_count: 0,
            initial_list_count: 0,
            use_uuid_client_order_ids: false,
        }
    }
}

impl OrderFactoryConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse the configured identifiers
    pub fn validate(&self) -> Result<(TraderId, StrategyId), ConfigError> {
        let trader_id = TraderId::new(self.trader_id.as_str())
            .map_err(|e| ConfigError::Invalid(format!("trader_id: {e}")))?;
        let strategy_id = StrategyId::new(self.strategy_id.as_str())
            .map_err(|e| ConfigError::Invalid(format!("strategy_id: {e}")))?;
        Ok((trader_id, strategy_id))
    }
}
