//! The Nethermind node variant.
//!
//! The `spaceneth` config shipped in the image already comes with unlocked and funded accounts, so
//! nothing is imported or unlocked over RPC.

use gunash_common::types::NodeIdentifier;

use crate::variant::{ImportStrategy, NodeVariant, UnlockPolicy, VariantProfile, params};

const IMAGE: &str = "nethermind/nethermind";

pub fn variant() -> NodeVariant {
    NodeVariant {
        identifier: NodeIdentifier::Nethermind,
        image: IMAGE,
        container_websocket_port: 8546,
        run_params: params([
            "--config",
            "spaceneth.cfg",
            "--Init.WebSocketsEnabled",
            "true",
            "--JsonRpc.Host",
            "0.0.0.0",
            "--JsonRpc.WebSocketsPort",
            "8546",
        ]),
        profile: VariantProfile {
            import_strategy: ImportStrategy::ExternallyManaged,
            unlock_policy: UnlockPolicy::Skip,
            key_prefix: "",
        },
    }
}
