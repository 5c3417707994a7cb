#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]

//! Shared objects for the relay registrar.
//!
//! Everything here is plain data: identities, amounts, the closed vocabulary of
//! registry events and the envelope a chain client decodes them into.

pub mod objects;

pub use objects::{
    Address, AddressParseError, AmountParseError, ChainEvent, EventKind, EventPosition,
    RegistryEvent, RelayServerRegistryInfo, ServerAction, StakeInfo, TxHash, Wei,
};
