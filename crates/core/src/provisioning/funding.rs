//! Tops the balances of the provisioned accounts up to the target balance.

use alloy::{
    primitives::{Address, TxHash, U256},
    rpc::types::TransactionRequest,
};
use anyhow::{Context as _, Result};
use futures::future::try_join_all;
use gunash_node_interaction::ControlPlane;
use tracing::{Instrument, info, info_span, instrument};

/// A transfer sent from the coinbase to top an account up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    /// The hash the node returned for the transfer. The transfer isn't necessarily mined yet.
    pub tx_hash: TxHash,
}

/// Computes the `(recipient, deficit)` pairs of the accounts that need topping up. The first of the
/// `balances` is the coinbase and is never topped up, neither are accounts already at the target.
pub fn deficits(balances: &[(Address, U256)], target_balance: U256) -> Vec<(Address, U256)> {
    balances
        .iter()
        .skip(1)
        .filter(|(_, balance)| *balance < target_balance)
        .map(|(address, balance)| (*address, target_balance - *balance))
        .collect()
}

/// Reads the balances of all of the accounts and sends every account below `target_balance` the
/// difference from the first account. The transfers are sent concurrently and each of them is done
/// once the node returned its hash.
#[instrument(level = "info", skip_all, fields(count = accounts.len(), %target_balance))]
pub async fn equalize_balances(
    control_plane: &impl ControlPlane,
    accounts: &[Address],
    target_balance: U256,
) -> Result<Vec<Transfer>> {
    let balances = try_join_all(accounts.iter().map(|address| control_plane.balance(*address)))
        .await
        .context("Failed to get the balances of the accounts")?;
    let balances = accounts.iter().copied().zip(balances).collect::<Vec<_>>();

    let Some((coinbase, coinbase_balance)) = balances.first().copied() else {
        return Ok(Vec::new());
    };
    let deficits = deficits(&balances, target_balance);
    info!(
        %coinbase,
        %coinbase_balance,
        transfers = deficits.len(),
        "Topping up the accounts below the target balance"
    );

    try_join_all(deficits.into_iter().map(|(to, value)| {
        let transaction = TransactionRequest::default()
            .from(coinbase)
            .to(to)
            .value(value);
        async move {
            let tx_hash = control_plane
                .send_transaction(transaction)
                .await
                .with_context(|| format!("Failed to send {value} wei to {to}"))?;
            Ok::<_, anyhow::Error>(Transfer {
                from: coinbase,
                to,
                value,
                tx_hash,
            })
        }
        .instrument(info_span!("Funding account", %to, %value))
    }))
    .await
    .context("Failed to fund the accounts")
}
