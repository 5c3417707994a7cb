//! Scripted collaborators and event builders shared by the unit tests.

use crate::chain::{
    ChainError, ContractCall, ContractInteractor, SendTransactionDetails, TransactionManager,
    TxStore, WithdrawEstimate,
};
use crate::config::{ConfigStore, RegistrarConfig};
use crate::events::{NotificationSink, RegistrarNotification};
use crate::registration::{RegistrarServices, RegistrationManager};
use async_trait::async_trait;
use relreg_sdk::objects::{
    HubAuthorized, HubUnauthorized, RelayServerRegistered, RelayWorkersAdded, StakeAdded,
    StakeUnlocked, StakeWithdrawn,
};
use relreg_sdk::{
    Address, ChainEvent, EventKind, EventPosition, RegistryEvent, RelayServerRegistryInfo,
    ServerAction, StakeInfo, TxHash, Wei,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const MANAGER: u8 = 1;
pub const WORKER: u8 = 2;
pub const OWNER: u8 = 9;
pub const HUB: u8 = 0xaa;
pub const WITHDRAW_GAS_LIMIT: u64 = 50_000;
pub const ESTIMATED_GAS: u64 = 120_000;

pub fn addr(n: u8) -> Address {
    Address::parse(&format!("0x{n:040x}")).unwrap()
}

fn chain_event<E>(block: u64, event: E) -> ChainEvent<E> {
    ChainEvent::new(
        EventPosition::new(block, 0, 0),
        TxHash::new(format!("0x{block:064x}")),
        event,
    )
}

pub fn registered_event(block: u64, manager: u8, url: &str) -> ChainEvent<RelayServerRegistered> {
    chain_event(
        block,
        RelayServerRegistered {
            relay_manager: addr(manager),
            base_relay_fee: Wei::ZERO,
            pct_relay_fee: 10,
            relay_url: url.to_string(),
        },
    )
}

pub fn workers_added_event(block: u64, manager: u8, workers: &[u8]) -> ChainEvent<RelayWorkersAdded> {
    chain_event(
        block,
        RelayWorkersAdded {
            relay_manager: addr(manager),
            new_relay_workers: workers.iter().copied().map(addr).collect(),
            workers_count: workers.len() as u64,
        },
    )
}

pub fn registered(block: u64, url: &str) -> ChainEvent {
    let event = registered_event(block, MANAGER, url);
    event.with_event(RegistryEvent::RelayServerRegistered(event.event.clone()))
}

pub fn workers_added(block: u64, workers: &[u8]) -> ChainEvent {
    let event = workers_added_event(block, MANAGER, workers);
    event.with_event(RegistryEvent::RelayWorkersAdded(event.event.clone()))
}

pub fn hub_authorized(block: u64, hub: u8) -> ChainEvent {
    chain_event(
        block,
        RegistryEvent::HubAuthorized(HubAuthorized {
            relay_manager: addr(MANAGER),
            relay_hub: addr(hub),
        }),
    )
}

pub fn hub_unauthorized(block: u64, hub: u8, removal_block: u64) -> ChainEvent {
    chain_event(
        block,
        RegistryEvent::HubUnauthorized(HubUnauthorized {
            relay_manager: addr(MANAGER),
            relay_hub: addr(hub),
            removal_block,
        }),
    )
}

pub fn stake_added(block: u64) -> ChainEvent {
    chain_event(
        block,
        RegistryEvent::StakeAdded(StakeAdded {
            relay_manager: addr(MANAGER),
            owner: addr(OWNER),
            stake: Wei::new(1_000),
            unstake_delay: 10,
        }),
    )
}

pub fn stake_unlocked(block: u64, withdraw_block: u64) -> ChainEvent {
    chain_event(
        block,
        RegistryEvent::StakeUnlocked(StakeUnlocked {
            relay_manager: addr(MANAGER),
            owner: addr(OWNER),
            withdraw_block,
        }),
    )
}

pub fn stake_withdrawn(block: u64) -> ChainEvent {
    chain_event(
        block,
        RegistryEvent::StakeWithdrawn(StakeWithdrawn {
            relay_manager: addr(MANAGER),
            owner: addr(OWNER),
            amount: Wei::new(1_000),
        }),
    )
}

#[derive(Default)]
struct FakeChainState {
    hub_events: Vec<ChainEvent>,
    manager_events: Vec<ChainEvent>,
    stake: Option<StakeInfo>,
    balances: HashMap<Address, Wei>,
    hub_balances: HashMap<Address, Wei>,
    gas_price: Option<Wei>,
    fail_stake_queries: bool,
    fail_gas_price_queries: bool,
    stake_queries: usize,
    balance_queries: usize,
    register_calls: Vec<RelayServerRegistryInfo>,
}

/// Ledger double. Events are served from scripted lists; balances default to zero,
/// gas price to 1 and the stake record to an empty one.
#[derive(Default)]
pub struct FakeChain {
    state: Mutex<FakeChainState>,
}

impl FakeChain {
    pub fn push_hub_events(&self, events: impl IntoIterator<Item = ChainEvent>) {
        self.state.lock().unwrap().hub_events.extend(events);
    }

    pub fn push_manager_events(&self, events: impl IntoIterator<Item = ChainEvent>) {
        self.state.lock().unwrap().manager_events.extend(events);
    }

    pub fn set_stake(&self, amount: u128, withdraw_block: u64) {
        self.state.lock().unwrap().stake = Some(StakeInfo {
            stake: Wei::new(amount),
            unstake_delay: 10,
            withdraw_block,
            owner: addr(OWNER),
        });
    }

    pub fn set_balance(&self, account: u8, amount: u128) {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(addr(account), Wei::new(amount));
    }

    pub fn set_hub_balance(&self, account: u8, amount: u128) {
        self.state
            .lock()
            .unwrap()
            .hub_balances
            .insert(addr(account), Wei::new(amount));
    }

    pub fn set_gas_price(&self, price: u128) {
        self.state.lock().unwrap().gas_price = Some(Wei::new(price));
    }

    pub fn fail_stake_queries(&self) {
        self.state.lock().unwrap().fail_stake_queries = true;
    }

    pub fn fail_gas_price_queries(&self, fail: bool) {
        self.state.lock().unwrap().fail_gas_price_queries = fail;
    }

    pub fn stake_queries(&self) -> usize {
        self.state.lock().unwrap().stake_queries
    }

    pub fn balance_queries(&self) -> usize {
        self.state.lock().unwrap().balance_queries
    }

    pub fn last_register_call(&self) -> Option<RelayServerRegistryInfo> {
        self.state.lock().unwrap().register_calls.last().cloned()
    }

    fn current_gas_price(&self) -> Result<Wei, ChainError> {
        let state = self.state.lock().unwrap();
        if state.fail_gas_price_queries {
            return Err(ChainError::Query("gas price unavailable".to_string()));
        }
        Ok(state.gas_price.unwrap_or(Wei::new(1)))
    }
}

fn select_events(
    events: &[ChainEvent],
    relay_manager: &Address,
    kinds: &[EventKind],
    from_block: u64,
) -> Vec<ChainEvent> {
    events
        .iter()
        .filter(|e| e.block_number() >= from_block)
        .filter(|e| e.event.relay_manager() == relay_manager)
        .filter(|e| kinds.contains(&e.event.kind()))
        .cloned()
        .collect()
}

#[async_trait]
impl ContractInteractor for FakeChain {
    async fn past_stake_manager_events(
        &self,
        relay_manager: &Address,
        kinds: &[EventKind],
        from_block: u64,
    ) -> Result<Vec<ChainEvent>, ChainError> {
        let state = self.state.lock().unwrap();
        Ok(select_events(&state.manager_events, relay_manager, kinds, from_block))
    }

    async fn past_hub_events(
        &self,
        relay_manager: &Address,
        kinds: &[EventKind],
        from_block: u64,
    ) -> Result<Vec<ChainEvent>, ChainError> {
        let state = self.state.lock().unwrap();
        Ok(select_events(&state.hub_events, relay_manager, kinds, from_block))
    }

    async fn balance(&self, account: &Address) -> Result<Wei, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.balance_queries += 1;
        Ok(state.balances.get(account).copied().unwrap_or_default())
    }

    async fn gas_price(&self) -> Result<Wei, ChainError> {
        self.current_gas_price()
    }

    async fn stake_info(&self, _relay_manager: &Address) -> Result<StakeInfo, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.stake_queries += 1;
        if state.fail_stake_queries {
            return Err(ChainError::Query("stake manager unreachable".to_string()));
        }
        Ok(state.stake.clone().unwrap_or_else(|| StakeInfo {
            stake: Wei::ZERO,
            unstake_delay: 0,
            withdraw_block: 0,
            owner: addr(0),
        }))
    }

    async fn hub_balance_of(&self, account: &Address) -> Result<Wei, ChainError> {
        let state = self.state.lock().unwrap();
        Ok(state.hub_balances.get(account).copied().unwrap_or_default())
    }

    async fn register_relay_call(
        &self,
        info: &RelayServerRegistryInfo,
    ) -> Result<ContractCall, ChainError> {
        self.state.lock().unwrap().register_calls.push(info.clone());
        Ok(ContractCall {
            method: "registerRelayServer".into(),
            data: info.url.as_bytes().to_vec(),
        })
    }

    async fn add_relay_workers_call(&self, workers: &[Address]) -> Result<ContractCall, ChainError> {
        Ok(ContractCall {
            method: "addRelayWorkers".into(),
            data: workers.iter().flat_map(|w| w.as_str().bytes()).collect(),
        })
    }

    async fn withdraw_hub_balance_estimate(
        &self,
        amount: Wei,
        destination: &Address,
        _from: &Address,
        gas_price: Wei,
    ) -> Result<WithdrawEstimate, ChainError> {
        Ok(WithdrawEstimate {
            gas_limit: WITHDRAW_GAS_LIMIT,
            gas_cost: Wei::gas_cost(WITHDRAW_GAS_LIMIT, gas_price),
            call: ContractCall {
                method: "withdraw".into(),
                data: format!("{amount}:{destination}").into_bytes(),
            },
        })
    }
}

/// Records every submission and hands out sequential hashes.
#[derive(Default)]
pub struct FakeTxManager {
    sent: Mutex<Vec<SendTransactionDetails>>,
}

impl FakeTxManager {
    pub fn sent(&self) -> Vec<SendTransactionDetails> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionManager for FakeTxManager {
    async fn estimate_gas(
        &self,
        _label: &str,
        _call: &ContractCall,
        _from: &Address,
    ) -> Result<u64, ChainError> {
        Ok(ESTIMATED_GAS)
    }

    async fn send_transaction(&self, details: SendTransactionDetails) -> Result<TxHash, ChainError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(details);
        Ok(TxHash::new(format!("0xtx{}", sent.len())))
    }
}

#[derive(Default)]
pub struct FakeTxStore {
    pending: Mutex<HashSet<ServerAction>>,
    queries: Mutex<Vec<ServerAction>>,
}

impl FakeTxStore {
    pub fn set_pending(&self, action: ServerAction) {
        self.pending.lock().unwrap().insert(action);
    }

    /// Every action looked up so far, in order.
    pub fn queries(&self) -> Vec<ServerAction> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl TxStore for FakeTxStore {
    async fn is_action_pending(&self, action: ServerAction) -> Result<bool, ChainError> {
        self.queries.lock().unwrap().push(action);
        Ok(self.pending.lock().unwrap().contains(&action))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    received: Mutex<Vec<RegistrarNotification>>,
}

impl RecordingSink {
    pub fn received(&self) -> Vec<RegistrarNotification> {
        self.received.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, notification: RegistrarNotification) {
        self.received.lock().unwrap().push(notification);
    }
}

pub fn test_config() -> RegistrarConfig {
    RegistrarConfig {
        relay_hub_address: addr(HUB),
        base_relay_fee: Wei::ZERO,
        pct_relay_fee: 10,
        url: "https://relay.example.com".to_string(),
        manager_min_balance: Wei::new(1_000),
        manager_min_stake: Wei::new(1_000),
        estimate_gas_factor: 1.2,
        min_tx_gas_cost: 21_000,
    }
}

/// Fakes plus a config store, wired into managers on demand.
pub struct Harness {
    pub chain: Arc<FakeChain>,
    pub tx_manager: Arc<FakeTxManager>,
    pub tx_store: Arc<FakeTxStore>,
    pub sink: Arc<RecordingSink>,
    pub config: ConfigStore<RegistrarConfig>,
}

impl Harness {
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("relreg_core=debug")
            .try_init();
        Self {
            chain: Arc::new(FakeChain::default()),
            tx_manager: Arc::new(FakeTxManager::default()),
            tx_store: Arc::new(FakeTxStore::default()),
            sink: Arc::new(RecordingSink::default()),
            config: ConfigStore::new(test_config()),
        }
    }

    pub fn manager(&self) -> RegistrationManager {
        let services = RegistrarServices {
            interactor: self.chain.clone(),
            tx_manager: self.tx_manager.clone(),
            tx_store: self.tx_store.clone(),
            notifier: self.sink.clone(),
        };
        RegistrationManager::new(addr(MANAGER), addr(WORKER), self.config.clone(), services)
    }

    pub async fn initialized_manager(&self) -> RegistrationManager {
        let mut manager = self.manager();
        manager.init().await.unwrap();
        manager
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
