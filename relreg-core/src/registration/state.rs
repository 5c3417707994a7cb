//! Derived registration state and its transition functions.
//!
//! Every transition returns whether something status-relevant changed; the
//! manager turns that into a status report. Nothing here performs I/O.

use super::delayed::DelayedEvents;
use super::threshold::ThresholdGate;
use relreg_sdk::objects::{RelayServerRegistered, RelayWorkersAdded};
use relreg_sdk::{Address, ChainEvent, RelayServerRegistryInfo, StakeInfo, Wei};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RegistrationState {
    hub_authorized: bool,
    stake_locked: bool,
    owner: Option<Address>,
    last_registered: Option<ChainEvent<RelayServerRegistered>>,
    last_workers_added: Option<ChainEvent<RelayWorkersAdded>>,
    pub(crate) delayed: DelayedEvents,
    pub(crate) balance_required: ThresholdGate,
    pub(crate) stake_required: ThresholdGate,
}

impl RegistrationState {
    pub fn new(min_balance: Wei, min_stake: Wei) -> Self {
        Self {
            hub_authorized: false,
            stake_locked: false,
            owner: None,
            last_registered: None,
            last_workers_added: None,
            delayed: DelayedEvents::new(),
            balance_required: ThresholdGate::new("Balance", min_balance),
            stake_required: ThresholdGate::new("Stake", min_stake),
        }
    }

    pub fn is_hub_authorized(&self) -> bool {
        self.hub_authorized
    }

    pub fn is_stake_locked(&self) -> bool {
        self.stake_locked
    }

    pub fn owner(&self) -> Option<&Address> {
        self.owner.as_ref()
    }

    pub fn last_registered(&self) -> Option<&ChainEvent<RelayServerRegistered>> {
        self.last_registered.as_ref()
    }

    pub fn last_workers_added(&self) -> Option<&ChainEvent<RelayWorkersAdded>> {
        self.last_workers_added.as_ref()
    }

    pub fn balance_required(&self) -> &ThresholdGate {
        &self.balance_required
    }

    pub fn stake_required(&self) -> &ThresholdGate {
        &self.stake_required
    }

    pub fn delayed(&self) -> &DelayedEvents {
        &self.delayed
    }

    /// Returns `true` if the flag changed.
    pub fn set_hub_authorized(&mut self, authorized: bool) -> bool {
        if self.hub_authorized == authorized {
            return false;
        }
        self.hub_authorized = authorized;
        info!(
            "Current RelayHub is {} authorized",
            if authorized { "now" } else { "no longer" }
        );
        true
    }

    /// Returns `true` if the flag changed.
    pub fn set_stake_locked(&mut self, locked: bool) -> bool {
        if self.stake_locked == locked {
            return false;
        }
        self.stake_locked = locked;
        info!(
            "Manager stake is {} locked",
            if locked { "now" } else { "no longer" }
        );
        true
    }

    /// Apply a stake snapshot from the stake manager.
    ///
    /// A zero stake is ignored: an unstaked manager has no owner and nothing to
    /// update. The first non-zero snapshot latches the owner for the lifetime of
    /// the process. Returns `true` if anything status-relevant changed.
    pub fn apply_stake_info(&mut self, info: &StakeInfo) -> bool {
        if info.stake.is_zero() {
            return false;
        }
        let mut changed = self.set_stake_locked(info.is_locked());
        changed |= self.stake_required.refresh(info.stake);

        match &self.owner {
            None => {
                info!(owner = %info.owner, "Got staked for the first time");
                self.owner = Some(info.owner.clone());
                changed = true;
            }
            Some(owner) if *owner != info.owner => {
                // The owner is never re-synced; sweeps keep targeting the first one.
                warn!(
                    latched_owner = %owner,
                    reported_owner = %info.owner,
                    "Stake reports a different owner than the one latched at first stake"
                );
            }
            Some(_) => {}
        }
        changed
    }

    /// Replace the registration record if `event` is later. Returns `true` if replaced.
    pub fn record_registration(&mut self, event: ChainEvent<RelayServerRegistered>) -> bool {
        let replace = self
            .last_registered
            .as_ref()
            .is_none_or(|current| current.is_followed_by(&event));
        if replace {
            self.last_registered = Some(event);
        }
        replace
    }

    /// Replace the worker-addition record if `event` is later. Returns `true` if replaced.
    pub fn record_workers_added(&mut self, event: ChainEvent<RelayWorkersAdded>) -> bool {
        let replace = self
            .last_workers_added
            .as_ref()
            .is_none_or(|current| current.is_followed_by(&event));
        if replace {
            self.last_workers_added = Some(event);
        }
        replace
    }

    /// Whether the latest worker-addition record lists `worker`.
    pub fn is_worker_added(&self, worker: &Address) -> bool {
        self.last_workers_added
            .as_ref()
            .is_some_and(|record| record.event.new_relay_workers.contains(worker))
    }

    pub fn prerequisites_met(&self) -> bool {
        self.hub_authorized
            && self.stake_locked
            && self.stake_required.is_satisfied()
            && self.balance_required.is_satisfied()
    }
}

/// Whether the on-chain registration record matches what this relay should announce.
pub fn registration_matches(
    record: Option<&ChainEvent<RelayServerRegistered>>,
    desired: &RelayServerRegistryInfo,
    manager: &Address,
) -> bool {
    record.is_some_and(|record| {
        let registered = &record.event;
        registered.relay_manager == *manager
            && registered.base_relay_fee == desired.base_relay_fee
            && registered.pct_relay_fee == desired.pct_relay_fee
            && registered.relay_url == desired.url
    })
}
