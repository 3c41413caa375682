//! The OpenEthereum node variant.

use gunash_common::types::NodeIdentifier;
use gunash_node_interaction::UnlockTimeout;

use crate::variant::{ImportStrategy, NodeVariant, UnlockPolicy, VariantProfile, params};

const IMAGE: &str = "openethereum/openethereum";

pub fn variant() -> NodeVariant {
    NodeVariant {
        identifier: NodeIdentifier::OpenEthereum,
        image: IMAGE,
        container_websocket_port: 8546,
        run_params: params([
            "--config",
            "dev-insecure",
            "--geth",
            "--jsonrpc-cors",
            "all",
            "--ws-interface",
            "all",
            "--ws-apis",
            "all",
            "--ws-origins",
            "all",
            "--ws-hosts",
            "all",
        ]),
        profile: VariantProfile {
            // OpenEthereum has no `personal_importRawKey`.
            import_strategy: ImportStrategy::NewAccountFromSecret {
                method: "parity_newAccountFromSecret",
            },
            // A zero duration has to be given as a quantity, a plain integer is rejected.
            unlock_policy: UnlockPolicy::Unlock(UnlockTimeout::HexZero),
            key_prefix: "0x",
        },
    }
}
