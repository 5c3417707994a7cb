//! RegistrationRunner processor.
//!
//! The RegistrationRunner is responsible for:
//! - Receiving `ScanTick` events from the host's block scanner
//! - Running one reconciliation cycle per tick on the `RegistrationManager`
//! - Emitting a `CycleReport` after every cycle, failed or not
//! - Applying config reloads between cycles
//!
//! Cycles never overlap: the manager sits behind a mutex and the run loop
//! awaits each cycle before taking the next tick.

use crate::config::ConfigWatcher;
use crate::events::{CycleReport, CycleReportSender, ScanTick, ScanTickReceiver};
use crate::registration::{RegistrarError, RegistrationManager};
use kanau::processor::Processor;
use relreg_sdk::TxHash;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info};

pub struct RegistrationRunner {
    manager: Mutex<RegistrationManager>,
    config_watcher: ConfigWatcher,
    tick_rx: ScanTickReceiver,
    report_tx: CycleReportSender,
    shutdown_rx: watch::Receiver<bool>,
}

impl RegistrationRunner {
    pub fn new(
        manager: RegistrationManager,
        tick_rx: ScanTickReceiver,
        report_tx: CycleReportSender,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let config_watcher = manager.subscribe_config();
        Self {
            manager: Mutex::new(manager),
            config_watcher,
            tick_rx,
            report_tx,
            shutdown_rx,
        }
    }

    /// Run until shutdown is signaled or the tick channel closes.
    pub async fn run(mut self) {
        let manager_address = self.manager.lock().await.manager_address().clone();
        info!(manager = %manager_address, "RegistrationRunner started");

        loop {
            tokio::select! {
                biased;

                // A dropped sender counts as shutdown
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!(manager = %manager_address, "RegistrationRunner shutting down");
                        break;
                    }
                }

                // Reloads land between cycles, never inside one
                Ok(()) = self.config_watcher.changed() => {
                    self.manager.lock().await.reload_config().await;
                }

                tick = self.tick_rx.recv() => {
                    let Some(tick) = tick else {
                        info!(manager = %manager_address, "ScanTick channel closed");
                        break;
                    };
                    self.run_cycle(tick).await;
                }
            }
        }

        info!(manager = %manager_address, "RegistrationRunner shutdown complete");
    }

    async fn run_cycle(&self, tick: ScanTick) {
        let current_block = tick.current_block;
        let report = match self.process(tick).await {
            Ok(transaction_hashes) => {
                debug!(
                    current_block,
                    transactions = transaction_hashes.len(),
                    "Reconciliation cycle completed"
                );
                CycleReport {
                    current_block,
                    transaction_hashes,
                    error: None,
                }
            }
            Err(e) => {
                error!(current_block, error = %e, "Reconciliation cycle failed");
                CycleReport {
                    current_block,
                    transaction_hashes: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };

        if let Err(e) = self.report_tx.send(report).await {
            error!(current_block, error = %e, "Failed to send CycleReport");
        }
    }
}

impl Processor<ScanTick> for RegistrationRunner {
    type Output = Vec<TxHash>;
    type Error = RegistrarError;

    /// Run one cycle for `tick`. The manager is initialized on the first tick;
    /// a failed initialization is retried on the next one.
    async fn process(&self, tick: ScanTick) -> Result<Vec<TxHash>, RegistrarError> {
        let mut manager = self.manager.lock().await;
        if !manager.is_initialized() {
            manager.init().await?;
        }
        manager.refresh_balance().await?;
        manager
            .handle_past_events(
                &tick.hub_events,
                tick.last_scanned_block,
                tick.current_block,
                tick.force_registration,
            )
            .await
    }
}
