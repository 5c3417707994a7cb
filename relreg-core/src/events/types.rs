//! Event type definitions for the registrar pipeline.

use relreg_sdk::{ChainEvent, TxHash};

/// One scan of the ledger, produced by the host's block scanner.
///
/// The host scans relay hub events itself (it needs them for other purposes);
/// stake manager events are fetched by the registrar for the same range.
#[derive(Debug, Clone)]
pub struct ScanTick {
    /// Relay hub events emitted since `last_scanned_block`.
    pub hub_events: Vec<ChainEvent>,
    pub last_scanned_block: u64,
    pub current_block: u64,
    /// Re-announce the registration even if the on-chain record is correct.
    pub force_registration: bool,
}

/// Outcome of one reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub current_block: u64,
    /// Transactions submitted during the cycle, in submission order.
    pub transaction_hashes: Vec<TxHash>,
    /// Set when the cycle failed; the next tick is the retry.
    pub error: Option<String>,
}

/// Process-wide notifications published by the registrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrarNotification {
    /// Withdrawal processing ran after de-authorization or stake withdrawal.
    /// Subsystems should stop accepting new relay requests.
    Unstaked,
}

impl std::fmt::Display for RegistrarNotification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrarNotification::Unstaked => write!(f, "unstaked"),
        }
    }
}
