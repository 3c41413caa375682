use std::{pin::Pin, sync::Arc, time::Duration};

use alloy::{
    network::Ethereum,
    primitives::{Address, TxHash, U256},
    providers::{Provider, RootProvider},
    rpc::{client::ClientBuilder, types::TransactionRequest},
};
use anyhow::{Context as _, Result};
use tokio::sync::Notify;
use tracing::{Instrument, info, info_span, warn};

use crate::{Connector, ControlPlane, NormalClosureWs, UnlockTimeout};

/// How long closing waits for the WebSocket close handshake to finish.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// A [`ControlPlane`] over a single WebSocket connection to the node.
///
/// The connection is owned by this value and it's closed with a normal closure by
/// [`WsControlPlane::close`]. Dropping the value instead still closes it, but nothing waits for
/// that to finish.
#[derive(Debug)]
pub struct WsControlPlane {
    endpoint: String,
    provider: RootProvider<Ethereum>,
    closed: Arc<Notify>,
}

impl WsControlPlane {
    /// Makes a single attempt at opening the connection.
    pub async fn connect(endpoint: &str) -> Result<Self> {
        let transport = NormalClosureWs::new(endpoint);
        let closed = transport.closed();
        let client = ClientBuilder::default()
            .pubsub(transport)
            .await
            .with_context(|| format!("Failed to open a WebSocket connection to {endpoint}"))?;

        Ok(Self {
            endpoint: endpoint.to_owned(),
            provider: RootProvider::new(client),
            closed,
        })
    }
}

impl ControlPlane for WsControlPlane {
    fn accounts(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Address>>> + '_>> {
        Box::pin(async move {
            self.provider
                .get_accounts()
                .await
                .context("Failed to get the accounts of the node")
        })
    }

    fn balance(&self, address: Address) -> Pin<Box<dyn Future<Output = Result<U256>> + '_>> {
        Box::pin(async move {
            self.provider
                .get_balance(address)
                .await
                .with_context(|| format!("Failed to get the balance of {address}"))
        })
    }

    fn send_transaction(
        &self,
        transaction: TransactionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TxHash>> + '_>> {
        Box::pin(async move {
            let pending_transaction = self
                .provider
                .send_transaction(transaction)
                .await
                .context("Failed to submit the transaction to the node")?;
            Ok(*pending_transaction.tx_hash())
        })
    }

    fn import_raw_key(
        &self,
        key: String,
        passphrase: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Address>> + '_>> {
        let passphrase = passphrase.to_owned();
        Box::pin(async move {
            self.provider
                .raw_request::<_, Address>("personal_importRawKey".into(), (key, passphrase))
                .await
                .context("Failed to import the raw key")
        })
    }

    fn new_account_from_secret(
        &self,
        method: &'static str,
        secret: String,
        passphrase: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Address>> + '_>> {
        let passphrase = passphrase.to_owned();
        Box::pin(async move {
            self.provider
                .raw_request::<_, Address>(method.into(), (secret, passphrase))
                .await
                .with_context(|| format!("Failed to create an account through {method}"))
        })
    }

    fn new_account(&self, passphrase: &str) -> Pin<Box<dyn Future<Output = Result<Address>> + '_>> {
        let passphrase = passphrase.to_owned();
        Box::pin(async move {
            self.provider
                .raw_request::<_, Address>("personal_newAccount".into(), (passphrase,))
                .await
                .context("Failed to create a new account")
        })
    }

    fn unlock_account(
        &self,
        address: Address,
        passphrase: &str,
        timeout: UnlockTimeout,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + '_>> {
        let passphrase = passphrase.to_owned();
        Box::pin(async move {
            self.provider
                .raw_request::<_, bool>(
                    "personal_unlockAccount".into(),
                    (address, passphrase, timeout),
                )
                .await
                .with_context(|| format!("Failed to unlock account {address}"))
        })
    }

    /// The provider is the only user of the pubsub service, so dropping it shuts the backend down,
    /// which then sends the close frame.
    fn close(self) -> Pin<Box<dyn Future<Output = ()>>> {
        let Self {
            endpoint,
            provider,
            closed,
        } = self;

        Box::pin(
            async move {
                let notified = closed.notified();
                drop(provider);
                match tokio::time::timeout(CLOSE_TIMEOUT, notified).await {
                    Ok(()) => info!("Closed the control plane connection"),
                    Err(_) => warn!("Timed out waiting for the control plane connection to close"),
                }
            }
            .instrument(info_span!("Closing control plane", %endpoint)),
        )
    }
}

/// A [`Connector`] for the WebSocket control plane at a fixed endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WsConnector {
    endpoint: String,
}

impl WsConnector {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Connector for WsConnector {
    type Connection = WsControlPlane;

    fn connect(&self) -> Pin<Box<dyn Future<Output = Result<Self::Connection>> + '_>> {
        Box::pin(WsControlPlane::connect(&self.endpoint))
    }
}
