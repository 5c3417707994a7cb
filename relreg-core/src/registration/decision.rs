//! Deciding whether to (re)announce the relay on the hub.

use super::{RegistrarError, RegistrationManager};
use crate::chain::SendTransactionDetails;
use crate::config::RegistrarConfig;
use relreg_sdk::{ServerAction, TxHash};
use tracing::debug;

impl RegistrationManager {
    /// Register the relay if its on-chain record is wrong and no registration is
    /// in flight, or unconditionally when `force_registration` is set.
    pub async fn reconcile_registration(
        &mut self,
        current_block: u64,
        force_registration: bool,
    ) -> Result<Vec<TxHash>, RegistrarError> {
        self.ensure_initialized()?;
        let config = self.config.snapshot().await;
        self.registration_cycle(current_block, force_registration, &config)
            .await
    }

    pub(crate) async fn registration_cycle(
        &self,
        current_block: u64,
        force_registration: bool,
        config: &RegistrarConfig,
    ) -> Result<Vec<TxHash>, RegistrarError> {
        let registration_correct = self.is_registration_correct(config);
        let registration_pending = self
            .services
            .tx_store
            .is_action_pending(ServerAction::RegisterServer)
            .await?;

        if !(registration_pending || registration_correct) || force_registration {
            return self.attempt_registration(current_block, config).await;
        }
        Ok(Vec::new())
    }

    /// Submit a worker addition (if the worker is not on record and none is in
    /// flight) followed by a registration with the configured fee and url.
    ///
    /// Does nothing unless the hub is authorized, the stake is locked and both
    /// thresholds are satisfied; the next cycle re-evaluates. Fails until the
    /// worker-addition history is loaded, since the worker could already be on record.
    pub async fn attempt_registration(
        &self,
        current_block: u64,
        config: &RegistrarConfig,
    ) -> Result<Vec<TxHash>, RegistrarError> {
        self.ensure_initialized()?;
        if !self.state.prerequisites_met() {
            debug!(
                hub_authorized = self.state.is_hub_authorized(),
                stake_locked = self.state.is_stake_locked(),
                stake_satisfied = self.state.stake_required().is_satisfied(),
                balance_satisfied = self.state.balance_required().is_satisfied(),
                "Registration prerequisites not met"
            );
            return Ok(Vec::new());
        }

        let mut transaction_hashes = Vec::new();

        if !self.state.is_worker_added(&self.worker_address)
            && !self
                .services
                .tx_store
                .is_action_pending(ServerAction::AddWorker)
                .await?
        {
            transaction_hashes.push(self.add_relay_worker(current_block, config).await?);
        }

        let call = self
            .services
            .interactor
            .register_relay_call(&config.registry_info())
            .await?;
        let gas_limit = self
            .services
            .tx_manager
            .estimate_gas("RegisterRelay", &call, &self.manager_address)
            .await?;
        let details = SendTransactionDetails {
            signer: self.manager_address.clone(),
            destination: config.relay_hub_address.clone(),
            gas_limit,
            gas_price: None,
            value: None,
            call: Some(call),
            server_action: ServerAction::RegisterServer,
            creation_block: current_block,
        };
        transaction_hashes.push(self.services.tx_manager.send_transaction(details).await?);

        debug!(
            manager = %self.manager_address,
            hub = %config.relay_hub_address,
            url = %config.url,
            "Relay registered on hub"
        );
        Ok(transaction_hashes)
    }

    async fn add_relay_worker(
        &self,
        current_block: u64,
        config: &RegistrarConfig,
    ) -> Result<TxHash, RegistrarError> {
        let call = self
            .services
            .interactor
            .add_relay_workers_call(std::slice::from_ref(&self.worker_address))
            .await?;
        let gas_limit = self
            .services
            .tx_manager
            .estimate_gas("AddRelayWorkers", &call, &self.manager_address)
            .await?;
        let details = SendTransactionDetails {
            signer: self.manager_address.clone(),
            destination: config.relay_hub_address.clone(),
            gas_limit,
            gas_price: None,
            value: None,
            call: Some(call),
            server_action: ServerAction::AddWorker,
            creation_block: current_block,
        };
        Ok(self.services.tx_manager.send_transaction(details).await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{
        HUB, Harness, MANAGER, WORKER, hub_authorized, registered, stake_added, workers_added,
    };
    use relreg_sdk::ServerAction;

    /// Harness whose manager passes every registration prerequisite.
    async fn ready_harness() -> (Harness, super::RegistrationManager) {
        let harness = Harness::new();
        harness.chain.set_stake(1_000, 0);
        harness.chain.set_balance(MANAGER, 1_000_000);
        let mut manager = harness.initialized_manager().await;
        manager.refresh_balance().await.unwrap();
        manager
            .reconcile(&[stake_added(2), hub_authorized(2, HUB)], &[], 2)
            .await
            .unwrap();
        (harness, manager)
    }

    #[tokio::test]
    async fn test_unregistered_relay_adds_worker_then_registers() {
        let (harness, mut manager) = ready_harness().await;

        let hashes = manager.reconcile_registration(3, false).await.unwrap();

        assert_eq!(hashes.len(), 2);
        let actions: Vec<_> = harness
            .tx_manager
            .sent()
            .iter()
            .map(|tx| tx.server_action)
            .collect();
        assert_eq!(actions, vec![ServerAction::AddWorker, ServerAction::RegisterServer]);
        assert!(harness.tx_manager.sent().iter().all(|tx| tx.creation_block == 3));
    }

    #[tokio::test]
    async fn test_gates_closed_issue_nothing() {
        let harness = Harness::new();
        let manager = harness.initialized_manager().await;
        let config = harness.config.snapshot().await;

        let hashes = manager.attempt_registration(3, &config).await.unwrap();

        assert!(hashes.is_empty());
        assert!(harness.tx_manager.sent().is_empty());
    }

    #[tokio::test]
    async fn test_single_failing_gate_blocks_registration() {
        let (harness, mut manager) = ready_harness().await;
        harness.chain.set_balance(MANAGER, 1);
        manager.refresh_balance().await.unwrap();

        let hashes = manager.reconcile_registration(3, true).await.unwrap();

        assert!(hashes.is_empty());
        assert!(harness.tx_manager.sent().is_empty());
    }

    #[tokio::test]
    async fn test_known_worker_never_added_twice() {
        let (harness, mut manager) = ready_harness().await;
        manager
            .reconcile(&[], &[workers_added(2, &[WORKER])], 2)
            .await
            .unwrap();
        let config = harness.config.snapshot().await;

        for block in 3..6 {
            manager.attempt_registration(block, &config).await.unwrap();
        }

        let sent = harness.tx_manager.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|tx| tx.server_action == ServerAction::RegisterServer));
    }

    #[tokio::test]
    async fn test_pending_worker_addition_not_reissued() {
        let (harness, mut manager) = ready_harness().await;
        harness.tx_store.set_pending(ServerAction::AddWorker);

        manager.reconcile_registration(3, false).await.unwrap();

        let sent = harness.tx_manager.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].server_action, ServerAction::RegisterServer);
    }

    #[tokio::test]
    async fn test_correct_registration_is_left_alone() {
        let (harness, mut manager) = ready_harness().await;
        manager
            .reconcile(
                &[],
                &[
                    workers_added(2, &[WORKER]),
                    registered(2, "https://relay.example.com"),
                ],
                2,
            )
            .await
            .unwrap();

        assert!(manager.reconcile_registration(3, false).await.unwrap().is_empty());
        assert!(harness.tx_manager.sent().is_empty());

        let hashes = manager.reconcile_registration(4, true).await.unwrap();
        assert_eq!(hashes.len(), 1);
        assert_eq!(
            harness.tx_manager.sent()[0].server_action,
            ServerAction::RegisterServer
        );
    }

    #[tokio::test]
    async fn test_pending_registration_is_not_duplicated() {
        let (harness, mut manager) = ready_harness().await;
        harness.tx_store.set_pending(ServerAction::RegisterServer);

        assert!(manager.reconcile_registration(3, false).await.unwrap().is_empty());
        assert!(harness.tx_manager.sent().is_empty());
    }

    #[tokio::test]
    async fn test_config_change_triggers_reannouncement() {
        let (harness, mut manager) = ready_harness().await;
        manager
            .reconcile(
                &[],
                &[
                    workers_added(2, &[WORKER]),
                    registered(2, "https://relay.example.com"),
                ],
                2,
            )
            .await
            .unwrap();

        let mut config = harness.config.snapshot().await;
        config.pct_relay_fee = 25;
        harness.config.update(config).await;

        let hashes = manager.reconcile_registration(3, false).await.unwrap();
        assert_eq!(hashes.len(), 1);
        let registered_info = harness.chain.last_register_call().unwrap();
        assert_eq!(registered_info.pct_relay_fee, 25);
    }

    #[tokio::test]
    async fn test_attempt_before_init_issues_nothing() {
        let harness = Harness::new();
        harness.chain.push_hub_events([workers_added(1, &[WORKER])]);
        let manager = harness.manager();
        let config = harness.config.snapshot().await;

        let err = manager.attempt_registration(3, &config).await.unwrap_err();

        assert!(matches!(err, super::RegistrarError::UninitializedState));
        assert!(harness.tx_manager.sent().is_empty());
    }
}
