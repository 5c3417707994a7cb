pub mod address;
pub mod amount;
pub mod events;
pub mod quantity;
pub mod registry;

pub use address::{Address, AddressParseError, TxHash};
pub use amount::{AmountParseError, Wei};
pub use events::{
    ChainEvent, EventKind, EventPosition, HubAuthorized, HubUnauthorized, RegistryEvent,
    RelayServerRegistered, RelayWorkersAdded, StakeAdded, StakeUnlocked, StakeWithdrawn,
};
pub use registry::{RelayServerRegistryInfo, ServerAction, StakeInfo};
