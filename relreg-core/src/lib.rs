#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

//! Relay registration and solvency reconciliation.
//!
//! A relay server drives a [`RegistrationManager`](registration::RegistrationManager)
//! with every scanned block range. The manager keeps the relay's hub registration
//! in line with its config and sweeps funds back to the owner once the relay is
//! de-authorized or unstaked.

pub mod chain;
pub mod config;
pub mod events;
pub mod processors;
pub mod registration;

#[cfg(test)]
mod test_utils;
