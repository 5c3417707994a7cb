//! Interfaces to the ledger-facing collaborators.
//!
//! The registrar never talks to a node, signs or tracks transactions itself. It
//! consumes these traits, which the host implements over its RPC client, its
//! transaction manager and its transaction store.

mod interactor;
mod tx_manager;
mod tx_store;

pub use interactor::{ContractCall, ContractInteractor, WithdrawEstimate};
pub use tx_manager::{SendTransactionDetails, TransactionManager};
pub use tx_store::TxStore;

use thiserror::Error;

/// Failures reported by a collaborator. The registrar propagates them as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A ledger query (events, balances, stake, gas price) failed.
    #[error("chain query failed: {0}")]
    Query(String),

    /// Building, estimating or submitting a transaction failed.
    #[error("transaction submission failed: {0}")]
    Submission(String),

    /// The pending transaction store could not be read.
    #[error("transaction store error: {0}")]
    TxStore(String),
}
