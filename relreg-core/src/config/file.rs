//! TOML file configuration structures.
//!
//! These structs directly map to the `relreg-config.toml` file format.

use relreg_sdk::{Address, Wei};
use serde::{Deserialize, Serialize};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub relay: RelayConfig,
    pub manager: ManagerConfig,
    #[serde(default)]
    pub gas: GasConfig,
}

/// What the relay announces on the hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Address of the relay hub contract to register with.
    pub hub_address: Address,
    /// Public URL announced in the registration record.
    pub url: String,
    #[serde(default)]
    pub base_relay_fee: Wei,
    #[serde(default)]
    pub pct_relay_fee: u64,
}

/// Solvency requirements for the manager account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    pub min_balance: Wei,
    pub min_stake: Wei,
}

/// Gas accounting used when sweeping funds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasConfig {
    /// Multiplier applied to the hub withdrawal gas estimate.
    #[serde(default = "default_estimate_gas_factor")]
    pub estimate_gas_factor: f64,
    /// Gas used by a plain value transfer.
    #[serde(default = "default_min_tx_gas_cost")]
    pub min_tx_gas_cost: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            estimate_gas_factor: default_estimate_gas_factor(),
            min_tx_gas_cost: default_min_tx_gas_cost(),
        }
    }
}

fn default_estimate_gas_factor() -> f64 {
    1.2
}

fn default_min_tx_gas_cost() -> u64 {
    21_000
}
