//! The node variants that gunash knows how to launch and provision.

pub mod ganache;
pub mod geth;
pub mod nethermind;
pub mod open_ethereum;
