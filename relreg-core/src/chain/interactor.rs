use super::ChainError;
use async_trait::async_trait;
use compact_str::CompactString;
use relreg_sdk::{Address, ChainEvent, EventKind, RelayServerRegistryInfo, StakeInfo, Wei};

/// An encoded contract call, opaque to the registrar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Contract method name, used for logging and gas-estimation labels.
    pub method: CompactString,
    /// ABI-encoded call data.
    pub data: Vec<u8>,
}

/// Result of estimating a hub balance withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawEstimate {
    pub gas_limit: u64,
    /// `gas_limit` priced at the gas price passed to the estimate.
    pub gas_cost: Wei,
    pub call: ContractCall,
}

/// Read access to the stake manager and relay hub contracts, plus builders for
/// the calls the registrar submits.
#[async_trait]
pub trait ContractInteractor: Send + Sync {
    /// Stake manager events indexed by `relay_manager`, from `from_block` to the chain head,
    /// in ledger order.
    async fn past_stake_manager_events(
        &self,
        relay_manager: &Address,
        kinds: &[EventKind],
        from_block: u64,
    ) -> Result<Vec<ChainEvent>, ChainError>;

    /// Relay hub events indexed by `relay_manager`, from `from_block` to the chain head.
    async fn past_hub_events(
        &self,
        relay_manager: &Address,
        kinds: &[EventKind],
        from_block: u64,
    ) -> Result<Vec<ChainEvent>, ChainError>;

    async fn balance(&self, account: &Address) -> Result<Wei, ChainError>;

    async fn gas_price(&self) -> Result<Wei, ChainError>;

    async fn stake_info(&self, relay_manager: &Address) -> Result<StakeInfo, ChainError>;

    /// Balance `account` holds inside the relay hub.
    async fn hub_balance_of(&self, account: &Address) -> Result<Wei, ChainError>;

    async fn register_relay_call(
        &self,
        info: &RelayServerRegistryInfo,
    ) -> Result<ContractCall, ChainError>;

    async fn add_relay_workers_call(&self, workers: &[Address]) -> Result<ContractCall, ChainError>;

    /// Build and estimate a withdrawal of `amount` from `from`'s hub balance to `destination`.
    async fn withdraw_hub_balance_estimate(
        &self,
        amount: Wei,
        destination: &Address,
        from: &Address,
        gas_price: Wei,
    ) -> Result<WithdrawEstimate, ChainError>;
}
