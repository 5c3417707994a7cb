//! Registry records and transaction tags.

use super::{Address, Wei};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The stake manager's record for a relay manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeInfo {
    pub stake: Wei,
    #[serde(with = "super::quantity")]
    pub unstake_delay: u64,
    /// Zero while the stake is locked; set once the owner starts unlocking.
    #[serde(with = "super::quantity")]
    pub withdraw_block: u64,
    pub owner: Address,
}

impl StakeInfo {
    pub fn is_locked(&self) -> bool {
        self.withdraw_block == 0
    }
}

/// What a relay announces to the hub when it registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayServerRegistryInfo {
    pub base_relay_fee: Wei,
    pub pct_relay_fee: u64,
    pub url: String,
}

/// Tag attached to every submitted transaction so the transaction store can
/// answer "is an action of this kind still unconfirmed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerAction {
    RegisterServer,
    AddWorker,
    DepositWithdrawal,
    ValueTransfer,
}

impl fmt::Display for ServerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ServerAction::RegisterServer => "REGISTER_SERVER",
            ServerAction::AddWorker => "ADD_WORKER",
            ServerAction::DepositWithdrawal => "DEPOSIT_WITHDRAWAL",
            ServerAction::ValueTransfer => "VALUE_TRANSFER",
        };
        f.write_str(tag)
    }
}
