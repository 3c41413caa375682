use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

/// An enum representing the identifiers of the supported nodes.
///
/// The string form of each identifier is what's accepted on the command line and what's reported
/// back in error messages, so the order of the variants here is the order in which they're listed.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
    AsRefStr,
    IntoStaticStr,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeIdentifier {
    /// The go-ethereum node implementation.
    Geth,
    /// The OpenEthereum (formerly Parity) node implementation.
    OpenEthereum,
    /// The Nethermind node implementation running the spaceneth dev chain.
    Nethermind,
    /// The Ganache deterministic test node.
    Ganache,
}
