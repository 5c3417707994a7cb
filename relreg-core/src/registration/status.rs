//! Human-readable status of the registration prerequisites.

use super::RegistrationManager;
use crate::config::RegistrarConfig;
use itertools::Itertools;
use relreg_sdk::ChainEvent;
use tracing::{debug, info};

impl RegistrationManager {
    /// Multi-line report of every registration prerequisite, or `None` when the
    /// on-chain registration already matches the config.
    pub fn status_report(&self, config: &RegistrarConfig) -> Option<String> {
        if self.is_registration_correct(config) {
            return None;
        }
        let owner = self
            .state
            .owner()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        let lines = [
            "Not registered yet. Prerequisites:".to_string(),
            self.state.balance_required().description(),
            self.state.stake_required().description(),
            format!("Hub authorized | {}", self.state.is_hub_authorized()),
            format!("Stake locked   | {}", self.state.is_stake_locked()),
            format!("Manager        | {}", self.manager_address),
            format!("Worker         | {}", self.worker_address),
            format!("Owner          | {owner}"),
        ];
        Some(lines.join("\n"))
    }

    pub(crate) fn print_not_registered(&self, config: &RegistrarConfig) {
        if let Some(report) = self.status_report(config) {
            info!("{report}");
        }
    }
}

/// Log the stake manager events fetched for one cycle.
pub(crate) fn log_events(events: &[ChainEvent], from_block: u64) {
    if events.is_empty() {
        return;
    }
    for event in events {
        debug!(
            event = %event.event.kind(),
            block = event.block_number(),
            tx_hash = %event.transaction_hash,
            "Stake manager event"
        );
    }
    info!(
        from_block,
        count = events.len(),
        kinds = %events.iter().map(|e| e.event.kind()).join(", "),
        "Handling stake manager events"
    );
}
