//! Applies scanned events to the derived registration state.

use super::sweep::SweepReport;
use super::{RegistrarError, RegistrationManager, as_registration, as_workers_added};
use crate::config::RegistrarConfig;
use relreg_sdk::{ChainEvent, RegistryEvent, TxHash};
use tracing::{debug, info, warn};

impl RegistrationManager {
    /// Reconcile one scanned range.
    ///
    /// Stake manager events are applied first, in the order received, then hub
    /// events. De-authorizations whose removal block has been reached are released
    /// last and trigger a sweep that leaves the manager's own balance alone.
    /// Returns the sweep transactions submitted along the way.
    ///
    /// A sweep that cannot find the owner is logged and the cycle goes on. A
    /// collaborator failure ends the cycle; due de-authorizations that were not
    /// swept stay queued for the next one.
    pub async fn reconcile(
        &mut self,
        manager_events: &[ChainEvent],
        hub_events: &[ChainEvent],
        current_block: u64,
    ) -> Result<Vec<TxHash>, RegistrarError> {
        self.ensure_initialized()?;
        let config = self.config.snapshot().await;
        self.reconcile_with(manager_events, hub_events, current_block, &config)
            .await
    }

    pub(crate) async fn reconcile_with(
        &mut self,
        manager_events: &[ChainEvent],
        hub_events: &[ChainEvent],
        current_block: u64,
        config: &RegistrarConfig,
    ) -> Result<Vec<TxHash>, RegistrarError> {
        let mut transaction_hashes = Vec::new();

        for event in manager_events {
            match &event.event {
                RegistryEvent::HubAuthorized(authorized) => {
                    if authorized.relay_hub != config.relay_hub_address {
                        debug!(hub = %authorized.relay_hub, "Ignoring HubAuthorized for another hub");
                        continue;
                    }
                    if self.state.set_hub_authorized(true) {
                        self.print_not_registered(config);
                    }
                }
                RegistryEvent::StakeAdded(_) | RegistryEvent::StakeUnlocked(_) => {
                    self.refresh_stake_with(config).await?;
                }
                RegistryEvent::HubUnauthorized(unauthorized) => {
                    if unauthorized.relay_hub != config.relay_hub_address {
                        debug!(hub = %unauthorized.relay_hub, "Ignoring HubUnauthorized for another hub");
                        continue;
                    }
                    if self.state.set_hub_authorized(false) {
                        self.print_not_registered(config);
                    }
                    info!(
                        block = event.block_number(),
                        removal_block = unauthorized.removal_block,
                        "Hub de-authorization announced, deferring until removal block"
                    );
                    self.state.delayed.push(event.with_event(unauthorized.clone()));
                }
                RegistryEvent::StakeWithdrawn(withdrawn) => {
                    self.refresh_stake_with(config).await?;
                    warn!(
                        block = event.block_number(),
                        tx_hash = %event.transaction_hash,
                        amount = %withdrawn.amount,
                        "Handling StakeWithdrawn event"
                    );
                    let report = self.sweep_funds(true, current_block, config).await?;
                    collect_sweep(report, &mut transaction_hashes);
                }
                RegistryEvent::RelayServerRegistered(_) | RegistryEvent::RelayWorkersAdded(_) => {
                    debug!(event = %event.event.kind(), "Hub event in stake manager stream ignored");
                }
            }
        }

        for event in hub_events {
            self.apply_hub_event(event);
        }

        let mut due = self.state.delayed.extract_due(current_block).into_iter();
        while let Some(entry) = due.next() {
            info!(
                due_block = entry.due_block,
                current_block,
                tx_hash = %entry.event.transaction_hash,
                "Hub de-authorization is now effective"
            );
            match self.sweep_funds(false, current_block, config).await {
                Ok(report) => collect_sweep(report, &mut transaction_hashes),
                Err(e) => {
                    self.state.delayed.push(entry.event);
                    for rest in due.by_ref() {
                        self.state.delayed.push(rest.event);
                    }
                    return Err(e);
                }
            }
        }

        Ok(transaction_hashes)
    }

    /// Track the latest registration and worker-addition records of this manager.
    fn apply_hub_event(&mut self, event: &ChainEvent) {
        if *event.event.relay_manager() != self.manager_address {
            debug!(
                relay_manager = %event.event.relay_manager(),
                "Ignoring hub event for another relay manager"
            );
            return;
        }
        if let Some(registration) = as_registration(event) {
            if self.state.record_registration(registration) {
                debug!(block = event.block_number(), "Updated latest registration record");
            }
        } else if let Some(addition) = as_workers_added(event) {
            if self.state.record_workers_added(addition) {
                debug!(block = event.block_number(), "Updated latest worker-addition record");
            }
        }
    }
}

fn collect_sweep(report: SweepReport, transaction_hashes: &mut Vec<TxHash>) {
    if report.owner_unknown {
        warn!("Funds left unswept, owner address not initialized");
    }
    transaction_hashes.extend(report.transaction_hashes);
}
