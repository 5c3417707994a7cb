//! Event channel factories and the notification sink.

use super::types::{CycleReport, RegistrarNotification, ScanTick};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

/// Default buffer size for event channels.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for ScanTick events.
pub type ScanTickSender = mpsc::Sender<ScanTick>;
/// Receiver handle for ScanTick events.
pub type ScanTickReceiver = mpsc::Receiver<ScanTick>;

/// Sender handle for CycleReport events.
pub type CycleReportSender = mpsc::Sender<CycleReport>;
/// Receiver handle for CycleReport events.
pub type CycleReportReceiver = mpsc::Receiver<CycleReport>;

/// Create a new ScanTick channel.
///
/// The host's block scanner keeps the sender; the `RegistrationRunner` owns the receiver.
pub fn scan_tick_channel() -> (ScanTickSender, ScanTickReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new CycleReport channel.
pub fn cycle_report_channel() -> (CycleReportSender, CycleReportReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Publishes registrar notifications to the rest of the process.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: RegistrarNotification);
}

/// [`NotificationSink`] backed by a broadcast channel, so any number of
/// subsystems can subscribe.
#[derive(Clone)]
pub struct BroadcastNotificationSink {
    tx: broadcast::Sender<RegistrarNotification>,
}

impl BroadcastNotificationSink {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(DEFAULT_CHANNEL_BUFFER);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistrarNotification> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotificationSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for BroadcastNotificationSink {
    fn publish(&self, notification: RegistrarNotification) {
        // Nobody listening is fine.
        if self.tx.send(notification).is_err() {
            debug!(%notification, "No subscribers for registrar notification");
        }
    }
}
