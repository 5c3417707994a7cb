//! Registry events.
//!
//! The stake manager emits the manager-scoped events (authorization and stake
//! lifecycle); the relay hub emits the registration events. A chain client decodes
//! logs into [`ChainEvent`], whose JSON shape follows the usual decoded-log layout:
//!
//! ```json
//! {
//!   "event": "HubUnauthorized",
//!   "blockNumber": 120,
//!   "transactionIndex": 0,
//!   "logIndex": 3,
//!   "transactionHash": "0x...",
//!   "returnValues": { "relayManager": "0x...", "relayHub": "0x...", "removalBlock": "126" }
//! }
//! ```

use super::{Address, TxHash, Wei};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Where an event sits in the ledger. Later events compare greater.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPosition {
    #[serde(with = "super::quantity")]
    pub block_number: u64,
    #[serde(default, with = "super::quantity")]
    pub transaction_index: u64,
    #[serde(default, with = "super::quantity")]
    pub log_index: u64,
}

impl EventPosition {
    pub const fn new(block_number: u64, transaction_index: u64, log_index: u64) -> Self {
        Self {
            block_number,
            transaction_index,
            log_index,
        }
    }
}

/// Name of a registry event, used to select log topics when querying history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    HubAuthorized,
    HubUnauthorized,
    StakeAdded,
    StakeUnlocked,
    StakeWithdrawn,
    RelayServerRegistered,
    RelayWorkersAdded,
}

impl EventKind {
    /// Events emitted by the stake manager and indexed by relay manager.
    pub const MANAGER_SCOPED: [EventKind; 5] = [
        EventKind::HubAuthorized,
        EventKind::StakeAdded,
        EventKind::HubUnauthorized,
        EventKind::StakeUnlocked,
        EventKind::StakeWithdrawn,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            EventKind::HubAuthorized => "HubAuthorized",
            EventKind::HubUnauthorized => "HubUnauthorized",
            EventKind::StakeAdded => "StakeAdded",
            EventKind::StakeUnlocked => "StakeUnlocked",
            EventKind::StakeWithdrawn => "StakeWithdrawn",
            EventKind::RelayServerRegistered => "RelayServerRegistered",
            EventKind::RelayWorkersAdded => "RelayWorkersAdded",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubAuthorized {
    pub relay_manager: Address,
    pub relay_hub: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubUnauthorized {
    pub relay_manager: Address,
    pub relay_hub: Address,
    /// Block at which the de-authorization takes effect.
    #[serde(with = "super::quantity")]
    pub removal_block: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeAdded {
    pub relay_manager: Address,
    pub owner: Address,
    pub stake: Wei,
    #[serde(default, with = "super::quantity")]
    pub unstake_delay: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeUnlocked {
    pub relay_manager: Address,
    pub owner: Address,
    #[serde(with = "super::quantity")]
    pub withdraw_block: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeWithdrawn {
    pub relay_manager: Address,
    pub owner: Address,
    pub amount: Wei,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayServerRegistered {
    pub relay_manager: Address,
    pub base_relay_fee: Wei,
    #[serde(with = "super::quantity")]
    pub pct_relay_fee: u64,
    pub relay_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayWorkersAdded {
    pub relay_manager: Address,
    pub new_relay_workers: SmallVec<[Address; 2]>,
    #[serde(default, with = "super::quantity")]
    pub workers_count: u64,
}

/// The closed vocabulary of events the registrar reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "returnValues")]
pub enum RegistryEvent {
    HubAuthorized(HubAuthorized),
    HubUnauthorized(HubUnauthorized),
    StakeAdded(StakeAdded),
    StakeUnlocked(StakeUnlocked),
    StakeWithdrawn(StakeWithdrawn),
    RelayServerRegistered(RelayServerRegistered),
    RelayWorkersAdded(RelayWorkersAdded),
}

impl RegistryEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RegistryEvent::HubAuthorized(_) => EventKind::HubAuthorized,
            RegistryEvent::HubUnauthorized(_) => EventKind::HubUnauthorized,
            RegistryEvent::StakeAdded(_) => EventKind::StakeAdded,
            RegistryEvent::StakeUnlocked(_) => EventKind::StakeUnlocked,
            RegistryEvent::StakeWithdrawn(_) => EventKind::StakeWithdrawn,
            RegistryEvent::RelayServerRegistered(_) => EventKind::RelayServerRegistered,
            RegistryEvent::RelayWorkersAdded(_) => EventKind::RelayWorkersAdded,
        }
    }

    /// The relay manager the event is indexed by.
    pub fn relay_manager(&self) -> &Address {
        match self {
            RegistryEvent::HubAuthorized(e) => &e.relay_manager,
            RegistryEvent::HubUnauthorized(e) => &e.relay_manager,
            RegistryEvent::StakeAdded(e) => &e.relay_manager,
            RegistryEvent::StakeUnlocked(e) => &e.relay_manager,
            RegistryEvent::StakeWithdrawn(e) => &e.relay_manager,
            RegistryEvent::RelayServerRegistered(e) => &e.relay_manager,
            RegistryEvent::RelayWorkersAdded(e) => &e.relay_manager,
        }
    }
}

/// A decoded ledger log together with its position and originating transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEvent<E = RegistryEvent> {
    #[serde(flatten)]
    pub position: EventPosition,
    pub transaction_hash: TxHash,
    #[serde(flatten)]
    pub event: E,
}

impl<E> ChainEvent<E> {
    pub fn new(position: EventPosition, transaction_hash: TxHash, event: E) -> Self {
        Self {
            position,
            transaction_hash,
            event,
        }
    }

    pub fn block_number(&self) -> u64 {
        self.position.block_number
    }

    /// Whether `other` sits strictly later in the ledger than `self`.
    pub fn is_followed_by<F>(&self, other: &ChainEvent<F>) -> bool {
        other.position > self.position
    }

    /// Re-wrap the envelope around a different payload, keeping position and hash.
    pub fn with_event<F>(&self, event: F) -> ChainEvent<F> {
        ChainEvent {
            position: self.position,
            transaction_hash: self.transaction_hash.clone(),
            event,
        }
    }
}

/// Pick the latest event by ledger position.
pub fn latest<'a, E>(events: impl IntoIterator<Item = &'a ChainEvent<E>>) -> Option<&'a ChainEvent<E>>
where
    E: 'a,
{
    events.into_iter().max_by_key(|e| e.position)
}
