//! The catalog of node variants and the provisioning quirks of each one of them.

use std::str::FromStr;

use gunash_common::types::NodeIdentifier;
use gunash_config::LaunchOptions;
use gunash_node_interaction::UnlockTimeout;
use strum::VariantNames;
use thiserror::Error;

use crate::{
    constants::{CONTAINER_NAME, HOST_HTTP_PORT, HOST_WEBSOCKET_PORT},
    node_implementations::{ganache, geth, nethermind, open_ethereum},
    process::ContainerSpec,
};

/// The identifiers of all of the node types that can be started, in the order they're listed in.
pub fn supported_node_types() -> &'static [&'static str] {
    NodeIdentifier::VARIANTS
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error(
    "unsupported node type {}: should specify {}",
    .node_type,
    supported_node_types().join(", ")
)]
pub struct UnsupportedNodeTypeError {
    pub node_type: String,
}

/// How the well-known keys get turned into accounts on the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImportStrategy {
    /// Keys are imported through a node specific `*_newAccountFromSecret` method.
    NewAccountFromSecret { method: &'static str },
    /// Keys are imported through the standard `personal_importRawKey` method.
    ImportRawKey,
    /// Nothing is imported. The node's own configuration already provides the accounts.
    ExternallyManaged,
}

/// Whether accounts are unlocked after provisioning and with what timeout encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnlockPolicy {
    Unlock(UnlockTimeout),
    /// The node manages unlocking on its own.
    Skip,
}

/// The per-variant behavior of the provisioning protocol, selected once when the variant is looked
/// up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VariantProfile {
    pub import_strategy: ImportStrategy,
    pub unlock_policy: UnlockPolicy,
    /// The prefix that each secret key must be presented with when it's imported.
    pub key_prefix: &'static str,
}

/// A node implementation that can be launched in a container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeVariant {
    pub identifier: NodeIdentifier,
    pub image: &'static str,
    /// The port that the node serves its WebSocket control plane on inside the container.
    pub container_websocket_port: u16,
    pub run_params: Vec<String>,
    pub profile: VariantProfile,
}

impl NodeVariant {
    pub fn new(identifier: NodeIdentifier, options: LaunchOptions) -> Self {
        match identifier {
            NodeIdentifier::Geth => geth::variant(),
            NodeIdentifier::OpenEthereum => open_ethereum::variant(),
            NodeIdentifier::Nethermind => nethermind::variant(),
            NodeIdentifier::Ganache => ganache::variant(options),
        }
    }

    /// Resolves a node type given as a string, failing if it's not one of the
    /// [`supported_node_types`].
    pub fn lookup(
        node_type: &str,
        options: LaunchOptions,
    ) -> Result<Self, UnsupportedNodeTypeError> {
        NodeIdentifier::from_str(node_type)
            .map(|identifier| Self::new(identifier, options))
            .map_err(|_| UnsupportedNodeTypeError {
                node_type: node_type.to_owned(),
            })
    }

    /// The container to run for this variant.
    pub fn container_spec(&self) -> ContainerSpec {
        ContainerSpec {
            name: CONTAINER_NAME.to_owned(),
            image: self.image.to_owned(),
            port_mappings: vec![
                (HOST_HTTP_PORT, HOST_HTTP_PORT),
                (HOST_WEBSOCKET_PORT, self.container_websocket_port),
            ],
            args: self.run_params.clone(),
        }
    }
}

pub(crate) fn params<'a>(params: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    params.into_iter().map(str::to_owned).collect()
}
