//! Reconciles the accounts of the node towards the target account set.

use alloy::primitives::{Address, B256};
use anyhow::{Context as _, Result};
use futures::future::try_join_all;
use gunash_node::{ImportStrategy, VariantProfile};
use gunash_node_interaction::ControlPlane;
use tracing::{info, instrument, warn};

use crate::{constants::ACCOUNT_PASSPHRASE, provisioning::ProvisioningTarget};

/// The accounts that the later provisioning stages operate on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkingSet {
    /// Every account in the set. The first one funds the others.
    pub accounts: Vec<Address>,
    /// The accounts created from the well-known keys.
    pub imported: Vec<Address>,
    /// The required accounts that the node didn't report and which were only added to the set.
    pub appended: Vec<Address>,
    /// The blank accounts created to reach the target account count.
    pub created: Vec<Address>,
}

/// Renders a secret key in the form the node expects it in.
pub fn encode_key(key: &B256, prefix: &str) -> String {
    format!("{prefix}{}", hex::encode(key))
}

/// Imports the well-known keys with the strategy of the node variant. All of the keys are imported
/// concurrently and the first failure fails the import.
#[instrument(level = "info", skip_all, fields(strategy = ?profile.import_strategy))]
pub async fn import_keys(
    control_plane: &impl ControlPlane,
    profile: &VariantProfile,
    keys: &[B256],
) -> Result<Vec<Address>> {
    let keys = keys.iter().map(|key| encode_key(key, profile.key_prefix));

    let imported = match profile.import_strategy {
        ImportStrategy::NewAccountFromSecret { method } => {
            try_join_all(keys.map(|key| {
                control_plane.new_account_from_secret(method, key, ACCOUNT_PASSPHRASE)
            }))
            .await
        }
        ImportStrategy::ImportRawKey => {
            try_join_all(keys.map(|key| control_plane.import_raw_key(key, ACCOUNT_PASSPHRASE)))
                .await
        }
        ImportStrategy::ExternallyManaged => {
            info!("Accounts are managed by the node configuration, not importing any keys");
            Ok(Vec::new())
        }
    }
    .context("Failed to import the well-known keys")?;

    info!(count = imported.len(), "Imported the well-known keys");
    Ok(imported)
}

/// Appends every required address that's missing from `accounts` to it, returning the appended
/// addresses. This only changes the list, nothing is created on the node.
pub fn append_required_accounts(accounts: &mut Vec<Address>, required: &[Address]) -> Vec<Address> {
    // Comparing the address bytes makes this insensitive to the case of the hex the node used.
    let missing = required
        .iter()
        .filter(|address| !accounts.contains(address))
        .copied()
        .collect::<Vec<_>>();
    accounts.extend(missing.iter().copied());
    missing
}

/// Imports the keys, reads the accounts of the node back, completes them with the required
/// accounts, and finally creates blank accounts until there are enough of them.
#[instrument(level = "info", skip_all)]
pub async fn provision_accounts(
    control_plane: &impl ControlPlane,
    profile: &VariantProfile,
    target: &ProvisioningTarget,
) -> Result<WorkingSet> {
    let imported = import_keys(control_plane, profile, &target.keys).await?;

    let mut accounts = control_plane
        .accounts()
        .await
        .context("Failed to get the accounts after importing the keys")?;
    info!(count = accounts.len(), "Node reported its accounts");

    let appended = append_required_accounts(&mut accounts, &target.required_accounts);
    for address in appended.iter() {
        // TODO: create these on the node once it's decided how to get their keys into nodes that
        // don't import keys, until then later calls for them may fail.
        warn!(%address, "Required account is not known to the node, adding it to the set only");
    }

    let missing = target.account_count.saturating_sub(accounts.len());
    let created = try_join_all((0..missing).map(|_| control_plane.new_account(ACCOUNT_PASSPHRASE)))
        .await
        .context("Failed to create the missing accounts")?;
    if !created.is_empty() {
        info!(count = created.len(), "Created blank accounts");
    }
    accounts.extend(created.iter().copied());

    Ok(WorkingSet {
        accounts,
        imported,
        appended,
        created,
    })
}
