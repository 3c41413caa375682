//! The configuration used across the gunash crates.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

/// The default control-plane endpoint. The container always publishes its WebSocket port on this
/// host port regardless of which port the node listens on inside the container.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8546";

#[derive(Debug, Parser, Clone)]
#[command(
    name = "gunash",
    version,
    about = "Bootstraps a local single-node Ethereum dev chain",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// The arguments of `start` given without the subcommand.
    #[command(flatten)]
    pub start: StartArguments,
}

impl Cli {
    /// Returns the command to run. `start` is the default when no subcommand was given, and it
    /// then takes the arguments given at the top level.
    pub fn command(self) -> Command {
        self.command.unwrap_or(Command::Start(self.start))
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Starts a gunash node.
    Start(StartArguments),
    /// Stops the running gunash node.
    Stop,
}

#[derive(Debug, Args, Clone, Serialize, Deserialize)]
pub struct StartArguments {
    /// Type of Ethereum node to spin up: one of geth, openethereum, nethermind, or ganache.
    #[arg(long = "node-type", default_value = "geth")]
    pub node_type: String,

    /// (Ganache only) Suppress VM errors.
    #[arg(long = "no-vm-errors-on-rpc-response", alias = "noVMErrorsOnRPCResponse")]
    pub no_vm_errors_on_rpc_response: bool,

    /// The WebSocket control-plane endpoint of the started node.
    #[arg(long = "endpoint", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[command(flatten)]
    pub connection: ConnectionConfiguration,
}

impl StartArguments {
    /// The options that alter how a node variant is launched.
    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            no_vm_errors_on_rpc_response: self.no_vm_errors_on_rpc_response,
        }
    }
}

impl Default for StartArguments {
    fn default() -> Self {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            arguments: StartArguments,
        }

        Wrapper::parse_from(["gunash"]).arguments
    }
}

/// Options that change the launch parameters of the node variant being started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaunchOptions {
    /// Passes `--noVMErrorsOnRPCResponse` to the node. Only meaningful for ganache.
    pub no_vm_errors_on_rpc_response: bool,
}

/// Configuration of how the control-plane connection to a freshly started node is established.
#[derive(Clone, Copy, Debug, Args, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfiguration {
    /// The time in milliseconds to wait between two connection attempts.
    #[arg(long = "connect-interval-ms", default_value = "500", value_parser = parse_duration_ms)]
    pub interval: Duration,

    /// The maximum time in milliseconds to keep retrying the connection. Retries forever when not
    /// given.
    #[arg(long = "connect-timeout-ms", value_parser = parse_duration_ms)]
    pub timeout: Option<Duration>,
}

impl Default for ConnectionConfiguration {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            timeout: None,
        }
    }
}

fn parse_duration_ms(value: &str) -> Result<Duration, std::num::ParseIntError> {
    value.parse().map(Duration::from_millis)
}
