//! In-memory stand-ins for the node and the container runtime.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    pin::Pin,
    rc::Rc,
};

use alloy::{
    primitives::{Address, B256, TxHash, U256, address},
    rpc::types::TransactionRequest,
};
use anyhow::{Context as _, Result, anyhow, bail};
use gunash_node::{ContainerRuntime, ContainerSpec, ProcessExitError};
use gunash_node_interaction::{Connector, ControlPlane, UnlockTimeout};
use tokio::sync::Barrier;

use crate::constants::{REQUIRED_ACCOUNTS, TARGET_BALANCE, WELL_KNOWN_KEYS};

/// A node that knows the well-known keys, keeps balances in memory, and records every call made to
/// it. Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct FakeNode {
    state: Rc<RefCell<FakeNodeState>>,
}

#[derive(Debug, Default)]
struct FakeNodeState {
    accounts: Vec<Address>,
    balances: HashMap<Address, U256>,
    raw_key_imports: Vec<String>,
    secret_imports: Vec<(String, String)>,
    accounts_created: usize,
    accounts_queries: usize,
    unlocks: Vec<(Address, UnlockTimeout)>,
    transactions: Vec<TransactionRequest>,
    calls: HashMap<&'static str, usize>,
    failure: Option<(&'static str, usize)>,
    gates: HashMap<&'static str, Rc<Barrier>>,
    closed: bool,
}

impl FakeNode {
    /// The funded account that dev nodes come with.
    pub const DEV_ACCOUNT: Address = address!("0x00000000000000000000000000000000000000de");

    pub fn with_dev_account() -> Self {
        Self::default().with_balance(Self::DEV_ACCOUNT, TARGET_BALANCE * U256::from(1000))
    }

    /// Adds the account to the node with the given balance.
    pub fn with_balance(self, address: Address, balance: U256) -> Self {
        {
            let mut state = self.state.borrow_mut();
            if !state.accounts.contains(&address) {
                state.accounts.push(address);
            }
            state.balances.insert(address, balance);
        }
        self
    }

    /// Makes the `nth` call to `method`, counting from one, fail.
    pub fn failing_on(self, method: &'static str, nth: usize) -> Self {
        self.state.borrow_mut().failure = Some((method, nth));
        self
    }

    /// Holds every call to `method` until `in_flight` of them are outstanding at the same time.
    /// Calls that are made one after the other never complete.
    pub fn gated(self, method: &'static str, in_flight: usize) -> Self {
        self.state
            .borrow_mut()
            .gates
            .insert(method, Rc::new(Barrier::new(in_flight)));
        self
    }

    pub fn raw_key_imports(&self) -> Vec<String> {
        self.state.borrow().raw_key_imports.clone()
    }

    pub fn secret_imports(&self) -> Vec<(String, String)> {
        self.state.borrow().secret_imports.clone()
    }

    pub fn accounts_created(&self) -> usize {
        self.state.borrow().accounts_created
    }

    pub fn accounts_queries(&self) -> usize {
        self.state.borrow().accounts_queries
    }

    pub fn unlocks(&self) -> Vec<(Address, UnlockTimeout)> {
        self.state.borrow().unlocks.clone()
    }

    pub fn transactions(&self) -> Vec<TransactionRequest> {
        self.state.borrow().transactions.clone()
    }

    pub fn balance_of(&self, address: Address) -> U256 {
        self.state
            .borrow()
            .balances
            .get(&address)
            .copied()
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    async fn call(&self, method: &'static str) -> Result<()> {
        let gate = {
            let mut state = self.state.borrow_mut();
            let count = {
                let count = state.calls.entry(method).or_default();
                *count += 1;
                *count
            };
            if state.failure == Some((method, count)) {
                bail!("{method} failed");
            }
            state.gates.get(method).cloned()
        };
        if let Some(gate) = gate {
            gate.wait().await;
        }
        Ok(())
    }

    /// The node derives the same address from a key whether it was given with a prefix or not.
    fn import(&self, key: &str) -> Result<Address> {
        let key = key.strip_prefix("0x").unwrap_or(key);
        let key = key.parse::<B256>().context("Invalid secret key")?;
        let index = WELL_KNOWN_KEYS
            .iter()
            .position(|known| *known == key)
            .ok_or_else(|| anyhow!("Unknown secret key {key}"))?;
        let address = REQUIRED_ACCOUNTS[index];

        let mut state = self.state.borrow_mut();
        if !state.accounts.contains(&address) {
            state.accounts.push(address);
        }
        Ok(address)
    }
}

impl ControlPlane for FakeNode {
    fn accounts(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Address>>> + '_>> {
        Box::pin(async move {
            self.call("eth_accounts").await?;
            let mut state = self.state.borrow_mut();
            state.accounts_queries += 1;
            Ok(state.accounts.clone())
        })
    }

    fn balance(&self, address: Address) -> Pin<Box<dyn Future<Output = Result<U256>> + '_>> {
        Box::pin(async move {
            self.call("eth_getBalance").await?;
            Ok(self.balance_of(address))
        })
    }

    fn send_transaction(
        &self,
        transaction: TransactionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TxHash>> + '_>> {
        Box::pin(async move {
            self.call("eth_sendTransaction").await?;
            let from = transaction.from.context("Transaction has no sender")?;
            let to = transaction
                .to
                .and_then(|kind| kind.to().copied())
                .context("Transaction has no recipient")?;
            let value = transaction.value.unwrap_or_default();

            let mut state = self.state.borrow_mut();
            let sender_balance = state.balances.entry(from).or_default();
            *sender_balance = sender_balance.saturating_sub(value);
            let recipient_balance = state.balances.entry(to).or_default();
            *recipient_balance = recipient_balance.saturating_add(value);
            state.transactions.push(transaction);

            Ok(TxHash::with_last_byte(state.transactions.len() as u8))
        })
    }

    fn import_raw_key(
        &self,
        key: String,
        _: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Address>> + '_>> {
        Box::pin(async move {
            self.call("personal_importRawKey").await?;
            self.state.borrow_mut().raw_key_imports.push(key.clone());
            self.import(&key)
        })
    }

    fn new_account_from_secret(
        &self,
        method: &'static str,
        secret: String,
        _: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Address>> + '_>> {
        Box::pin(async move {
            self.call(method).await?;
            self.state
                .borrow_mut()
                .secret_imports
                .push((method.to_owned(), secret.clone()));
            self.import(&secret)
        })
    }

    fn new_account(&self, _: &str) -> Pin<Box<dyn Future<Output = Result<Address>> + '_>> {
        Box::pin(async move {
            self.call("personal_newAccount").await?;
            let mut state = self.state.borrow_mut();
            state.accounts_created += 1;
            let address = Address::with_last_byte(0xa0 + state.accounts_created as u8);
            state.accounts.push(address);
            Ok(address)
        })
    }

    fn unlock_account(
        &self,
        address: Address,
        _: &str,
        timeout: UnlockTimeout,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + '_>> {
        Box::pin(async move {
            self.call("personal_unlockAccount").await?;
            self.state.borrow_mut().unlocks.push((address, timeout));
            Ok(true)
        })
    }

    fn close(self) -> Pin<Box<dyn Future<Output = ()>>> {
        self.state.borrow_mut().closed = true;
        Box::pin(std::future::ready(()))
    }
}

/// Hands out connections to a [`FakeNode`] after refusing the first `failures` attempts.
#[derive(Debug)]
pub struct FakeConnector {
    node: FakeNode,
    failures: usize,
    attempts: Cell<usize>,
}

impl FakeConnector {
    pub fn new(node: FakeNode, failures: usize) -> Self {
        Self {
            node,
            failures,
            attempts: Cell::new(0),
        }
    }
}

impl Connector for FakeConnector {
    type Connection = FakeNode;

    fn connect(&self) -> Pin<Box<dyn Future<Output = Result<Self::Connection>> + '_>> {
        Box::pin(async move {
            let attempt = self.attempts.get();
            self.attempts.set(attempt + 1);
            if attempt < self.failures {
                bail!("Connection refused");
            }
            Ok(self.node.clone())
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeCall {
    Pull(String),
    Run(ContainerSpec),
    Stop(String),
}

/// A [`ContainerRuntime`] that only records what it was asked to do.
#[derive(Clone, Debug, Default)]
pub struct RecordingRuntime {
    calls: Rc<RefCell<Vec<RuntimeCall>>>,
    fail_runs: Rc<Cell<bool>>,
}

impl RecordingRuntime {
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.borrow().clone()
    }

    /// Makes every container run exit with a non-zero code.
    pub fn fail_runs(&self) {
        self.fail_runs.set(true);
    }
}

impl ContainerRuntime for RecordingRuntime {
    fn pull_image(&self, image: &str) -> Pin<Box<dyn Future<Output = Result<()>> + '_>> {
        self.calls.borrow_mut().push(RuntimeCall::Pull(image.to_owned()));
        Box::pin(async { Ok(()) })
    }

    fn run_detached(&self, spec: &ContainerSpec) -> Pin<Box<dyn Future<Output = Result<()>> + '_>> {
        self.calls.borrow_mut().push(RuntimeCall::Run(spec.clone()));
        let fail = self.fail_runs.get();
        Box::pin(async move {
            if fail {
                return Err(ProcessExitError {
                    process_name: "docker run".to_owned(),
                    code: Some(125),
                }
                .into());
            }
            Ok(())
        })
    }

    fn stop(&self, name: &str) -> Pin<Box<dyn Future<Output = Result<()>> + '_>> {
        self.calls.borrow_mut().push(RuntimeCall::Stop(name.to_owned()));
        Box::pin(async { Ok(()) })
    }
}
