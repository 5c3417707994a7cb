//! Event processors driven by the host.
//!
//! - `RegistrationRunner`: Receives `ScanTick`, runs a reconciliation cycle, emits `CycleReport`

pub mod registration_runner;

pub use registration_runner::RegistrationRunner;
