//! The go-ethereum node variant.
//!
//! Runs in `--dev` mode with the `personal` namespace exposed on both the HTTP and the WebSocket
//! interfaces and insecure unlocking allowed, since accounts are unlocked over RPC.

use gunash_common::types::NodeIdentifier;
use gunash_node_interaction::UnlockTimeout;

use crate::variant::{ImportStrategy, NodeVariant, UnlockPolicy, VariantProfile, params};

const IMAGE: &str = "ethereum/client-go";
const APIS: &str = "admin,debug,web3,eth,txpool,personal,clique,miner,net";

pub fn variant() -> NodeVariant {
    NodeVariant {
        identifier: NodeIdentifier::Geth,
        image: IMAGE,
        container_websocket_port: 8546,
        run_params: params([
            "--dev",
            "--allow-insecure-unlock",
            "--http",
            "--http.addr",
            "0.0.0.0",
            "--http.api",
            APIS,
            "--http.corsdomain",
            "*",
            "--http.vhosts",
            "*",
            "--ws",
            "--ws.addr",
            "0.0.0.0",
            "--ws.api",
            APIS,
            "--ws.origins",
            "*",
            "--vmdebug",
        ]),
        profile: VariantProfile {
            import_strategy: ImportStrategy::ImportRawKey,
            unlock_policy: UnlockPolicy::Unlock(UnlockTimeout::IntegerZero),
            key_prefix: "",
        },
    }
}
