//! The ganache node variant.

use gunash_common::types::NodeIdentifier;
use gunash_config::LaunchOptions;
use gunash_node_interaction::UnlockTimeout;

use crate::variant::{ImportStrategy, NodeVariant, UnlockPolicy, VariantProfile, params};

const IMAGE: &str = "trufflesuite/ganache-cli";
const NO_VM_ERRORS_ON_RPC_RESPONSE: &str = "--noVMErrorsOnRPCResponse";

pub fn variant(options: LaunchOptions) -> NodeVariant {
    let mut run_params = params(["--deterministic", "--defaultBalanceEther", "1000000"]);
    if options.no_vm_errors_on_rpc_response {
        run_params.push(NO_VM_ERRORS_ON_RPC_RESPONSE.to_owned());
    }

    NodeVariant {
        identifier: NodeIdentifier::Ganache,
        image: IMAGE,
        // Ganache serves HTTP and WebSocket on the same port.
        container_websocket_port: 8545,
        run_params,
        profile: VariantProfile {
            import_strategy: ImportStrategy::ImportRawKey,
            unlock_policy: UnlockPolicy::Unlock(UnlockTimeout::IntegerZero),
            key_prefix: "0x",
        },
    }
}
