use super::ChainError;
use async_trait::async_trait;
use relreg_sdk::ServerAction;

/// Persistent store of submitted transactions.
#[async_trait]
pub trait TxStore: Send + Sync {
    /// Whether a transaction tagged `action` was submitted and is not yet confirmed.
    async fn is_action_pending(&self, action: ServerAction) -> Result<bool, ChainError>;
}
