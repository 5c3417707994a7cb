//! Configuration for the relay registrar.
//!
//! [`RegistrarConfig`] is the validated runtime form. It is usually held inside a
//! [`ConfigStore`] so fee, url and threshold changes apply on the next cycle
//! without restarting the relay.

mod config_store;
pub mod file;

pub use config_store::{ConfigStore, ConfigWatcher};

use file::FileConfig;
use relreg_sdk::{Address, RelayServerRegistryInfo, Wei};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Validated registrar configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrarConfig {
    pub relay_hub_address: Address,
    pub base_relay_fee: Wei,
    pub pct_relay_fee: u64,
    pub url: String,
    pub manager_min_balance: Wei,
    pub manager_min_stake: Wei,
    pub estimate_gas_factor: f64,
    pub min_tx_gas_cost: u64,
}

impl RegistrarConfig {
    /// Read, parse and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file_config: FileConfig = toml::from_str(content)?;
        file_config.try_into()
    }

    /// The registration record this relay should have on the hub.
    pub fn registry_info(&self) -> RelayServerRegistryInfo {
        RelayServerRegistryInfo {
            base_relay_fee: self.base_relay_fee,
            pct_relay_fee: self.pct_relay_fee,
            url: self.url.clone(),
        }
    }
}

impl TryFrom<FileConfig> for RegistrarConfig {
    type Error = ConfigError;

    fn try_from(file: FileConfig) -> Result<Self, Self::Error> {
        if let Err(e) = url::Url::parse(&file.relay.url) {
            return Err(ConfigError::Validation(format!(
                "invalid relay url {}: {e}",
                file.relay.url
            )));
        }
        let factor = file.gas.estimate_gas_factor;
        if !factor.is_finite() || factor < 1.0 {
            return Err(ConfigError::Validation(format!(
                "estimate_gas_factor must be a finite number >= 1.0, got {factor}"
            )));
        }
        if file.gas.min_tx_gas_cost == 0 {
            return Err(ConfigError::Validation(
                "min_tx_gas_cost must be positive".to_string(),
            ));
        }
        Ok(Self {
            relay_hub_address: file.relay.hub_address,
            base_relay_fee: file.relay.base_relay_fee,
            pct_relay_fee: file.relay.pct_relay_fee,
            url: file.relay.url,
            manager_min_balance: file.manager.min_balance,
            manager_min_stake: file.manager.min_stake,
            estimate_gas_factor: factor,
            min_tx_gas_cost: file.gas.min_tx_gas_cost,
        })
    }
}
