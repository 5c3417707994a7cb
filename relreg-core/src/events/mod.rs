//! Event system for the registrar.
//!
//! # Event Flow
//!
//! 1. The host's block scanner emits `ScanTick` -> `RegistrationRunner`
//! 2. `RegistrationRunner` runs one reconciliation cycle and emits `CycleReport`
//! 3. Fund sweeps publish `RegistrarNotification::Unstaked` through a `NotificationSink`

pub mod channels;
pub mod types;

pub use channels::{
    BroadcastNotificationSink, CycleReportReceiver, CycleReportSender, DEFAULT_CHANNEL_BUFFER,
    NotificationSink, ScanTickReceiver, ScanTickSender, cycle_report_channel, scan_tick_channel,
};

pub use types::{CycleReport, RegistrarNotification, ScanTick};
