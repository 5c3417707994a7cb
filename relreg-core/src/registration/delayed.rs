//! Events whose effect is deferred until a future block.

use relreg_sdk::ChainEvent;
use relreg_sdk::objects::HubUnauthorized;

/// A de-authorization that only becomes economically effective at `due_block`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayedEvent {
    pub due_block: u64,
    pub event: ChainEvent<HubUnauthorized>,
}

/// Pending delayed events, kept sorted by due block (ties in arrival order).
#[derive(Debug, Clone, Default)]
pub struct DelayedEvents {
    pending: Vec<DelayedEvent>,
}

impl DelayedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ChainEvent<HubUnauthorized>) {
        let due_block = event.event.removal_block;
        let at = self.pending.partition_point(|e| e.due_block <= due_block);
        self.pending.insert(at, DelayedEvent { due_block, event });
    }

    /// Remove and return every event due at or before `current_block`.
    pub fn extract_due(&mut self, current_block: u64) -> Vec<DelayedEvent> {
        let due = self.pending.partition_point(|e| e.due_block <= current_block);
        self.pending.drain(..due).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DelayedEvent> {
        self.pending.iter()
    }
}
