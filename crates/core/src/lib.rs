//! The gunash core library.
//!
//! This crate provisions a freshly started dev node into a fixed set of unlocked and funded
//! accounts, and sequences the whole run from pulling the node image to closing the connection.

pub mod constants;
pub mod orchestrator;
pub mod provisioning;

#[cfg(test)]
pub(crate) mod test_utils;

pub use orchestrator::{Orchestrator, RunState, stop_node};
pub use provisioning::{ProvisioningReport, ProvisioningTarget, Transfer};
