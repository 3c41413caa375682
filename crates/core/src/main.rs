use anyhow::Context as _;
use clap::Parser;
use gunash_config::{Cli, Command, StartArguments};
use gunash_core::{Orchestrator, stop_node};
use gunash_node::DockerCli;
use gunash_node_interaction::{ConnectRetryPolicy, WsConnector};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set the tracing subscriber")?;

    let command = Cli::parse().command();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed building the Runtime")?
        .block_on(run(command))
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Start(arguments) => start(arguments).await,
        Command::Stop => {
            stop_node(&DockerCli::default()).await?;
            info!("Stopped the gunash node");
            Ok(())
        }
    }
}

async fn start(arguments: StartArguments) -> anyhow::Result<()> {
    let policy = ConnectRetryPolicy {
        interval: arguments.connection.interval,
        max_wait: arguments.connection.timeout,
    };
    let orchestrator = Orchestrator::new(
        DockerCli::default(),
        WsConnector::new(arguments.endpoint.as_str()),
    );

    let report = orchestrator
        .start(&arguments.node_type, arguments.launch_options(), policy)
        .await?;

    info!(
        node_type = %arguments.node_type,
        accounts = report.accounts.len(),
        imported = report.imported,
        appended = report.appended.len(),
        created = report.created,
        unlocked = report.unlocked,
        transfers = report.transfers.len(),
        "Started the gunash node"
    );
    for transfer in report.transfers.iter() {
        info!(to = %transfer.to, value = %transfer.value, tx_hash = %transfer.tx_hash, "Funded account");
    }

    Ok(())
}
