//! Sending remaining funds to the owner once the relay is out of service.

use super::{RegistrarError, RegistrationManager};
use crate::chain::SendTransactionDetails;
use crate::config::RegistrarConfig;
use crate::events::RegistrarNotification;
use relreg_sdk::{Address, ServerAction, TxHash, Wei};
use tracing::{error, info};

/// Result of a single sweep leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    Sent(TxHash),
    /// The balance does not cover the transaction's own cost.
    Skipped { balance: Wei, cost: Wei },
}

impl SweepOutcome {
    pub fn into_hash(self) -> Option<TxHash> {
        match self {
            SweepOutcome::Sent(hash) => Some(hash),
            SweepOutcome::Skipped { .. } => None,
        }
    }
}

/// What a full sweep did.
#[derive(Debug, Default)]
pub(crate) struct SweepReport {
    pub transaction_hashes: Vec<TxHash>,
    /// At least one leg was skipped because no stake was observed yet.
    pub owner_unknown: bool,
}

/// Sweep legs, in the order they are attempted.
#[derive(Debug, Clone, Copy)]
enum SweepLeg {
    HubBalance,
    Worker,
    Manager,
}

impl RegistrationManager {
    /// Withdraw the manager's hub balance and sweep the worker's balance to the
    /// owner, plus the manager's own balance when `withdraw_manager` is set.
    ///
    /// The manager account may be shared with other relay processes, so its
    /// balance is only swept on stake withdrawal, never on de-authorization.
    /// Publishes [`RegistrarNotification::Unstaked`] once all legs ran, however
    /// many of them actually sent something.
    pub async fn withdraw_all_funds(
        &self,
        withdraw_manager: bool,
        current_block: u64,
        config: &RegistrarConfig,
    ) -> Result<Vec<TxHash>, RegistrarError> {
        self.ensure_initialized()?;
        let report = self.sweep_funds(withdraw_manager, current_block, config).await?;
        if report.owner_unknown {
            return Err(RegistrarError::OwnerUnknown);
        }
        Ok(report.transaction_hashes)
    }

    /// Run every sweep leg. A leg that needs the owner before any stake was
    /// observed is skipped and flagged; collaborator failures abort the sweep.
    pub(crate) async fn sweep_funds(
        &self,
        withdraw_manager: bool,
        current_block: u64,
        config: &RegistrarConfig,
    ) -> Result<SweepReport, RegistrarError> {
        let mut report = SweepReport::default();

        let mut legs = vec![SweepLeg::HubBalance, SweepLeg::Worker];
        if withdraw_manager {
            legs.push(SweepLeg::Manager);
        }

        for leg in legs {
            let result = match leg {
                SweepLeg::HubBalance => {
                    self.send_manager_hub_balance_to_owner(current_block, config)
                        .await
                }
                SweepLeg::Worker => {
                    self.send_worker_balance_to_owner(current_block, config)
                        .await
                }
                SweepLeg::Manager => {
                    self.send_manager_balance_to_owner(current_block, config)
                        .await
                }
            };
            match result {
                Ok(outcome) => report.transaction_hashes.extend(outcome.into_hash()),
                Err(RegistrarError::OwnerUnknown) => {
                    error!(?leg, "Cannot sweep funds, owner address not initialized");
                    report.owner_unknown = true;
                }
                Err(e) => return Err(e),
            }
        }

        self.services.notifier.publish(RegistrarNotification::Unstaked);
        Ok(report)
    }

    async fn send_manager_hub_balance_to_owner(
        &self,
        current_block: u64,
        config: &RegistrarConfig,
    ) -> Result<SweepOutcome, RegistrarError> {
        let owner = self.owner_or_err()?.clone();
        let interactor = &self.services.interactor;

        let gas_price = interactor.gas_price().await?;
        let hub_balance = interactor.hub_balance_of(&self.manager_address).await?;
        let estimate = interactor
            .withdraw_hub_balance_estimate(hub_balance, &owner, &self.manager_address, gas_price)
            .await?;

        if hub_balance < estimate.gas_cost {
            error!(
                balance = %hub_balance,
                cost = %estimate.gas_cost,
                "Manager hub balance too low"
            );
            return Ok(SweepOutcome::Skipped {
                balance: hub_balance,
                cost: estimate.gas_cost,
            });
        }

        info!(balance = %hub_balance, %owner, "Sending manager hub balance to owner");
        let details = SendTransactionDetails {
            signer: self.manager_address.clone(),
            destination: config.relay_hub_address.clone(),
            gas_limit: scale_gas_limit(estimate.gas_limit, config.estimate_gas_factor),
            gas_price: None,
            value: None,
            call: Some(estimate.call),
            server_action: ServerAction::DepositWithdrawal,
            creation_block: current_block,
        };
        let hash = self.services.tx_manager.send_transaction(details).await?;
        Ok(SweepOutcome::Sent(hash))
    }

    async fn send_worker_balance_to_owner(
        &self,
        current_block: u64,
        config: &RegistrarConfig,
    ) -> Result<SweepOutcome, RegistrarError> {
        let outcome = self
            .send_balance_to_owner(&self.worker_address, current_block, config)
            .await?;
        if let SweepOutcome::Skipped { balance, cost } = &outcome {
            info!(%balance, %cost, "Worker balance too low");
        }
        Ok(outcome)
    }

    async fn send_manager_balance_to_owner(
        &self,
        current_block: u64,
        config: &RegistrarConfig,
    ) -> Result<SweepOutcome, RegistrarError> {
        let outcome = self
            .send_balance_to_owner(&self.manager_address, current_block, config)
            .await?;
        if let SweepOutcome::Skipped { balance, cost } = &outcome {
            error!(%balance, %cost, "Manager balance too low");
        }
        Ok(outcome)
    }

    /// Send `account`'s balance minus the transfer cost to the owner.
    async fn send_balance_to_owner(
        &self,
        account: &Address,
        current_block: u64,
        config: &RegistrarConfig,
    ) -> Result<SweepOutcome, RegistrarError> {
        let interactor = &self.services.interactor;
        let gas_price = interactor.gas_price().await?;
        let gas_limit = config.min_tx_gas_cost;
        let cost = Wei::gas_cost(gas_limit, gas_price);
        let balance = interactor.balance(account).await?;

        let Some(value) = balance.checked_sub(cost) else {
            return Ok(SweepOutcome::Skipped { balance, cost });
        };
        let owner = self.owner_or_err()?.clone();

        info!(%account, %balance, %value, %owner, "Sending balance to owner");
        let details = SendTransactionDetails {
            signer: account.clone(),
            destination: owner,
            gas_limit,
            gas_price: Some(gas_price),
            value: Some(value),
            call: None,
            server_action: ServerAction::ValueTransfer,
            creation_block: current_block,
        };
        let hash = self.services.tx_manager.send_transaction(details).await?;
        Ok(SweepOutcome::Sent(hash))
    }

    fn owner_or_err(&self) -> Result<&Address, RegistrarError> {
        self.state.owner().ok_or(RegistrarError::OwnerUnknown)
    }
}

/// Apply the configured safety factor to a gas estimate.
fn scale_gas_limit(gas_limit: u64, factor: f64) -> u64 {
    (gas_limit as f64 * factor).round() as u64
}
