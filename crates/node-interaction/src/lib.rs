//! This crate implements all interactions with the control plane of a running node.

use std::pin::Pin;

use alloy::{
    primitives::{Address, TxHash, U256},
    rpc::types::TransactionRequest,
};
use anyhow::Result;
use serde::{Serialize, Serializer};

mod connection;
mod provider;
mod ws;

pub use connection::*;
pub use provider::*;
pub use ws::*;

/// An interface for the account related control plane of Ethereum compatible nodes.
///
/// Every method is a single round-trip to the node and nothing is cached between calls.
pub trait ControlPlane {
    /// Returns the addresses of the accounts that the node manages.
    fn accounts(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Address>>> + '_>>;

    /// Returns the balance of the provided [`Address`] back.
    fn balance(&self, address: Address) -> Pin<Box<dyn Future<Output = Result<U256>> + '_>>;

    /// Submits the [`TransactionRequest`] for the node to sign and returns its hash as soon as the
    /// node has accepted it. This does not wait for the transaction to be mined.
    fn send_transaction(
        &self,
        transaction: TransactionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TxHash>> + '_>>;

    /// Imports a raw private key through `personal_importRawKey`.
    fn import_raw_key(
        &self,
        key: String,
        passphrase: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Address>> + '_>>;

    /// Imports a secret through a node specific `*_newAccountFromSecret` method.
    fn new_account_from_secret(
        &self,
        method: &'static str,
        secret: String,
        passphrase: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Address>> + '_>>;

    /// Creates a new blank account through `personal_newAccount`.
    fn new_account(&self, passphrase: &str) -> Pin<Box<dyn Future<Output = Result<Address>> + '_>>;

    /// Unlocks the account through `personal_unlockAccount`.
    fn unlock_account(
        &self,
        address: Address,
        passphrase: &str,
        timeout: UnlockTimeout,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + '_>>;

    /// Closes the connection to the node, resolving once it's closed. The control plane can't be
    /// used afterwards.
    fn close(self) -> Pin<Box<dyn Future<Output = ()>>>
    where
        Self: Sized,
    {
        Box::pin(std::future::ready(()))
    }
}

/// Opens connections to the control plane of a node.
pub trait Connector {
    type Connection: ControlPlane;

    /// Makes a single attempt at opening a connection.
    fn connect(&self) -> Pin<Box<dyn Future<Output = Result<Self::Connection>> + '_>>;
}

/// The encoding of the "unlock indefinitely" duration passed to `personal_unlockAccount`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnlockTimeout {
    /// A zero duration encoded as the hex quantity `"0x0"`.
    HexZero,
    /// A zero duration encoded as the integer `0`.
    IntegerZero,
}

impl Serialize for UnlockTimeout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::HexZero => serializer.serialize_str("0x0"),
            Self::IntegerZero => serializer.serialize_u64(0),
        }
    }
}
