//! Unlocks the provisioned accounts for an indefinite amount of time.

use alloy::primitives::Address;
use anyhow::{Context as _, Result};
use futures::future::try_join_all;
use gunash_node::UnlockPolicy;
use gunash_node_interaction::ControlPlane;
use tracing::{info, instrument, warn};

use crate::constants::ACCOUNT_PASSPHRASE;

/// Unlocks all of the accounts concurrently according to the [`UnlockPolicy`] of the node variant,
/// returning the number of accounts that an unlock was requested for.
#[instrument(level = "info", skip_all, fields(policy = ?policy, count = accounts.len()))]
pub async fn unlock_accounts(
    control_plane: &impl ControlPlane,
    accounts: &[Address],
    policy: UnlockPolicy,
) -> Result<usize> {
    let timeout = match policy {
        UnlockPolicy::Unlock(timeout) => timeout,
        UnlockPolicy::Skip => {
            info!("Accounts are unlocked by the node configuration, skipping");
            return Ok(0);
        }
    };

    let unlocked = try_join_all(accounts.iter().map(|address| {
        control_plane.unlock_account(*address, ACCOUNT_PASSPHRASE, timeout)
    }))
    .await
    .context("Failed to unlock the accounts")?;

    for (address, unlocked) in accounts.iter().zip(unlocked) {
        if !unlocked {
            warn!(%address, "Node reported that the account was not unlocked");
        }
    }

    Ok(accounts.len())
}
