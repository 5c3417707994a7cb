use super::{ChainError, ContractCall};
use async_trait::async_trait;
use relreg_sdk::{Address, ServerAction, TxHash, Wei};

/// Everything the transaction manager needs to sign and broadcast one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTransactionDetails {
    pub signer: Address,
    pub destination: Address,
    pub gas_limit: u64,
    /// Explicit gas price; `None` lets the transaction manager price it.
    pub gas_price: Option<Wei>,
    /// Value transferred with the transaction.
    pub value: Option<Wei>,
    pub call: Option<ContractCall>,
    pub server_action: ServerAction,
    pub creation_block: u64,
}

/// Signs, broadcasts and tracks transactions. Retrying stuck transactions is its
/// concern, not the registrar's.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn estimate_gas(
        &self,
        label: &str,
        call: &ContractCall,
        from: &Address,
    ) -> Result<u64, ChainError>;

    async fn send_transaction(&self, details: SendTransactionDetails) -> Result<TxHash, ChainError>;
}
