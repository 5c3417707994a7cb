//! Relay registration and solvency reconciliation.
//!
//! The [`RegistrationManager`] derives "am I correctly registered and solvent"
//! from stake manager and relay hub events, and decides which corrective
//! transactions to submit:
//!
//! - `reconciler`: applies scanned events to the derived state and releases
//!   de-authorizations once their removal block is reached
//! - `decision`: (re)issues worker-addition and registration transactions
//! - `sweep`: sends remaining funds to the owner after de-authorization or
//!   stake withdrawal
//! - `status`: renders unmet prerequisites for the log
//!
//! One cycle runs at a time; the manager takes `&mut self` for every cycle and
//! the [`RegistrationRunner`](crate::processors::RegistrationRunner) serializes
//! host ticks.

mod decision;
pub mod delayed;
mod reconciler;
pub mod state;
mod status;
mod sweep;
pub mod threshold;

pub use delayed::{DelayedEvent, DelayedEvents};
pub use state::{RegistrationState, registration_matches};
pub use sweep::SweepOutcome;
pub use threshold::ThresholdGate;

use crate::chain::{ChainError, ContractInteractor, TransactionManager, TxStore};
use crate::config::{ConfigStore, ConfigWatcher, RegistrarConfig};
use crate::events::NotificationSink;
use relreg_sdk::objects::{RelayServerRegistered, RelayWorkersAdded};
use relreg_sdk::objects::events::latest;
use relreg_sdk::{Address, ChainEvent, EventKind, RegistryEvent, TxHash, Wei};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can end a reconciliation cycle.
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// A cycle ran before the registration history was loaded. Proceeding could
    /// re-register a relay that is already registered.
    #[error("registration manager not initialized")]
    UninitializedState,

    /// A sweep needed the owner address before any stake was observed.
    #[error("owner address not initialized, no stake has been observed")]
    OwnerUnknown,

    /// A collaborator failed; the next cycle is the retry.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// The collaborators a [`RegistrationManager`] consumes.
#[derive(Clone)]
pub struct RegistrarServices {
    pub interactor: Arc<dyn ContractInteractor>,
    pub tx_manager: Arc<dyn TransactionManager>,
    pub tx_store: Arc<dyn TxStore>,
    pub notifier: Arc<dyn NotificationSink>,
}

pub struct RegistrationManager {
    manager_address: Address,
    worker_address: Address,
    config: ConfigStore<RegistrarConfig>,
    services: RegistrarServices,
    state: RegistrationState,
    initialized: bool,
}

impl RegistrationManager {
    /// Create a manager for the given manager/worker key pair.
    ///
    /// Threshold requirements are taken from the config on [`init`](Self::init)
    /// and re-synced at the start of every cycle.
    pub fn new(
        manager_address: Address,
        worker_address: Address,
        config: ConfigStore<RegistrarConfig>,
        services: RegistrarServices,
    ) -> Self {
        Self {
            manager_address,
            worker_address,
            config,
            services,
            state: RegistrationState::new(Wei::ZERO, Wei::ZERO),
            initialized: false,
        }
    }

    pub fn manager_address(&self) -> &Address {
        &self.manager_address
    }

    pub fn worker_address(&self) -> &Address {
        &self.worker_address
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_hub_authorized(&self) -> bool {
        self.state.is_hub_authorized()
    }

    pub fn is_stake_locked(&self) -> bool {
        self.state.is_stake_locked()
    }

    pub fn owner_address(&self) -> Option<&Address> {
        self.state.owner()
    }

    /// Load the latest registration and worker-addition records from the full
    /// hub history. Records already known are kept.
    pub async fn init(&mut self) -> Result<(), RegistrarError> {
        let config = self.config.snapshot().await;
        self.sync_requirements(&config);

        if self.state.last_workers_added().is_none() {
            if let Some(event) = self.query_latest_workers_added().await? {
                self.state.record_workers_added(event);
            }
        }
        if self.state.last_registered().is_none() {
            if let Some(event) = self.query_latest_registration().await? {
                self.state.record_registration(event);
            }
        }

        self.initialized = true;
        info!(
            manager = %self.manager_address,
            worker = %self.worker_address,
            registered = self.state.last_registered().is_some(),
            workers_added = self.state.last_workers_added().is_some(),
            "Registration manager initialized"
        );
        Ok(())
    }

    /// Run one full cycle for a scanned block range.
    ///
    /// Fetches stake manager events since `last_scanned_block`, reconciles them
    /// together with `hub_events`, then runs the registration decision. Returns
    /// every transaction submitted, in submission order.
    pub async fn handle_past_events(
        &mut self,
        hub_events: &[ChainEvent],
        last_scanned_block: u64,
        current_block: u64,
        force_registration: bool,
    ) -> Result<Vec<TxHash>, RegistrarError> {
        self.ensure_initialized()?;
        let config = self.config.snapshot().await;
        self.sync_requirements(&config);

        let from_block = last_scanned_block.saturating_add(1);
        let manager_events = self
            .services
            .interactor
            .past_stake_manager_events(
                &self.manager_address,
                &EventKind::MANAGER_SCOPED,
                from_block,
            )
            .await?;
        status::log_events(&manager_events, from_block);

        let mut transaction_hashes = self
            .reconcile_with(&manager_events, hub_events, current_block, &config)
            .await?;
        transaction_hashes.extend(
            self.registration_cycle(current_block, force_registration, &config)
                .await?,
        );
        Ok(transaction_hashes)
    }

    /// Registered, staked, locked and authorized, as of the last refresh.
    pub async fn is_registered(&self) -> bool {
        let config = self.config.read().await;
        self.state.stake_required().is_satisfied()
            && self.state.is_stake_locked()
            && self.state.is_hub_authorized()
            && self.is_registration_correct(&config)
    }

    /// Feed the manager's current balance into the balance gate.
    pub async fn refresh_balance(&mut self) -> Result<(), RegistrarError> {
        let balance = self
            .services
            .interactor
            .balance(&self.manager_address)
            .await?;
        if self.state.balance_required.refresh(balance) {
            let config = self.config.snapshot().await;
            self.print_not_registered(&config);
        }
        Ok(())
    }

    /// Apply the current config right away instead of at the next cycle:
    /// re-sync the threshold requirements and re-render the status report.
    pub async fn reload_config(&mut self) {
        let config = self.config.snapshot().await;
        info!(
            version = self.config.version(),
            url = %config.url,
            pct_relay_fee = config.pct_relay_fee,
            "Registrar config reloaded"
        );
        self.sync_requirements(&config);
        if self.initialized {
            self.print_not_registered(&config);
        }
    }

    /// Watch for config reloads; see [`reload_config`](Self::reload_config).
    pub fn subscribe_config(&self) -> ConfigWatcher {
        self.config.subscribe()
    }

    /// Re-read the stake record and update lock flag, stake gate and owner.
    pub async fn refresh_stake(&mut self) -> Result<(), RegistrarError> {
        let config = self.config.snapshot().await;
        self.refresh_stake_with(&config).await
    }

    pub(crate) async fn refresh_stake_with(
        &mut self,
        config: &RegistrarConfig,
    ) -> Result<(), RegistrarError> {
        let info = self
            .services
            .interactor
            .stake_info(&self.manager_address)
            .await?;
        if self.state.apply_stake_info(&info) {
            self.print_not_registered(config);
        }
        Ok(())
    }

    pub(crate) fn ensure_initialized(&self) -> Result<(), RegistrarError> {
        if self.initialized {
            Ok(())
        } else {
            Err(RegistrarError::UninitializedState)
        }
    }

    pub(crate) fn is_registration_correct(&self, config: &RegistrarConfig) -> bool {
        registration_matches(
            self.state.last_registered(),
            &config.registry_info(),
            &self.manager_address,
        )
    }

    fn sync_requirements(&mut self, config: &RegistrarConfig) {
        let mut changed = self
            .state
            .balance_required
            .set_required(config.manager_min_balance);
        changed |= self
            .state
            .stake_required
            .set_required(config.manager_min_stake);
        if changed {
            self.print_not_registered(config);
        }
    }

    async fn query_latest_registration(
        &self,
    ) -> Result<Option<ChainEvent<RelayServerRegistered>>, RegistrarError> {
        let events = self
            .services
            .interactor
            .past_hub_events(
                &self.manager_address,
                &[EventKind::RelayServerRegistered],
                1,
            )
            .await?;
        let registrations: Vec<_> = events.iter().filter_map(as_registration).collect();
        debug!(count = registrations.len(), "Loaded past registrations");
        Ok(latest(&registrations).cloned())
    }

    async fn query_latest_workers_added(
        &self,
    ) -> Result<Option<ChainEvent<RelayWorkersAdded>>, RegistrarError> {
        let events = self
            .services
            .interactor
            .past_hub_events(&self.manager_address, &[EventKind::RelayWorkersAdded], 1)
            .await?;
        let additions: Vec<_> = events.iter().filter_map(as_workers_added).collect();
        debug!(count = additions.len(), "Loaded past worker additions");
        Ok(latest(&additions).cloned())
    }
}

fn as_registration(event: &ChainEvent) -> Option<ChainEvent<RelayServerRegistered>> {
    match &event.event {
        RegistryEvent::RelayServerRegistered(registered) => Some(event.with_event(registered.clone())),
        _ => None,
    }
}

fn as_workers_added(event: &ChainEvent) -> Option<ChainEvent<RelayWorkersAdded>> {
    match &event.event {
        RegistryEvent::RelayWorkersAdded(added) => Some(event.with_event(added.clone())),
        _ => None,
    }
}
