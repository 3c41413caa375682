//! The provisioning pipeline that brings a reachable node to the canonical account state.

use alloy::primitives::{Address, B256, U256};
use anyhow::Result;
use gunash_node::VariantProfile;
use gunash_node_interaction::ControlPlane;
use tracing::{info, instrument};

use crate::{
    constants::{REQUIRED_ACCOUNTS, TARGET_ACCOUNT_COUNT, TARGET_BALANCE, WELL_KNOWN_KEYS},
    orchestrator::RunState,
};

pub mod accounts;
pub mod funding;
pub mod unlock;

pub use accounts::*;
pub use funding::*;
pub use unlock::*;

/// The account state that provisioning drives the node towards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisioningTarget {
    /// The secret keys imported into nodes that support importing keys.
    pub keys: Vec<B256>,
    /// The addresses that must be in the provisioned account set.
    pub required_accounts: Vec<Address>,
    /// The minimum number of accounts in the provisioned account set.
    pub account_count: usize,
    /// The balance in wei that every account but the first is topped up to.
    pub balance: U256,
}

impl Default for ProvisioningTarget {
    fn default() -> Self {
        Self {
            keys: WELL_KNOWN_KEYS.to_vec(),
            required_accounts: REQUIRED_ACCOUNTS.to_vec(),
            account_count: TARGET_ACCOUNT_COUNT,
            balance: TARGET_BALANCE,
        }
    }
}

/// What a provisioning run did to the node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProvisioningReport {
    /// The final working set. The first account is the coinbase that funded the others.
    pub accounts: Vec<Address>,
    /// The number of accounts created from the well-known keys.
    pub imported: usize,
    /// The required accounts that were only added to the working set.
    pub appended: Vec<Address>,
    /// The number of blank accounts created on the node.
    pub created: usize,
    /// The number of accounts that were unlocked.
    pub unlocked: usize,
    pub transfers: Vec<Transfer>,
}

/// Runs the account, unlock, and funding stages in order against a connected node, advancing the
/// `state` after each one of them.
#[instrument(level = "info", skip_all)]
pub async fn provision(
    control_plane: &impl ControlPlane,
    profile: &VariantProfile,
    target: &ProvisioningTarget,
    state: &mut RunState,
) -> Result<ProvisioningReport> {
    let working_set = provision_accounts(control_plane, profile, target).await?;
    state.advance(RunState::Imported);

    let unlocked =
        unlock_accounts(control_plane, &working_set.accounts, profile.unlock_policy).await?;
    state.advance(RunState::Unlocked);

    let transfers = equalize_balances(control_plane, &working_set.accounts, target.balance).await?;
    state.advance(RunState::Funded);

    info!(
        accounts = working_set.accounts.len(),
        unlocked,
        transfers = transfers.len(),
        "Provisioned the node"
    );

    Ok(ProvisioningReport {
        imported: working_set.imported.len(),
        created: working_set.created.len(),
        accounts: working_set.accounts,
        appended: working_set.appended,
        unlocked,
        transfers,
    })
}
