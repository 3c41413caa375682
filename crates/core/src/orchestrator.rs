//! Starts and stops the gunash node.

use anyhow::{Context as _, Result};
use gunash_config::LaunchOptions;
use gunash_node::{ContainerRuntime, NodeVariant, constants::CONTAINER_NAME};
use gunash_node_interaction::{ConnectRetryPolicy, Connector, ControlPlane, establish_connection};
use strum::{Display, IntoStaticStr};
use tracing::{error, info, instrument};

use crate::provisioning::{ProvisioningReport, ProvisioningTarget, provision};

/// The states that a single start run goes through. Runs only ever move forward and a failure is
/// terminal; nothing that already happened is rolled back, so a container that was started is left
/// running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum RunState {
    #[default]
    NotStarted,
    ImagePulled,
    Running,
    Connected,
    Imported,
    Unlocked,
    Funded,
    Closed,
    /// The run failed after reaching `stage`.
    Failed { stage: &'static str },
}

impl RunState {
    pub fn advance(&mut self, next: RunState) {
        info!(from = %self, to = %next, "Run advanced");
        *self = next;
    }

    fn fail(&mut self) -> &'static str {
        let stage = match *self {
            Self::Failed { stage } => stage,
            state => state.into(),
        };
        *self = Self::Failed { stage };
        stage
    }
}

/// Launches node variants through a [`ContainerRuntime`] and provisions them over the control
/// plane produced by a [`Connector`].
pub struct Orchestrator<R, C> {
    runtime: R,
    connector: C,
    target: ProvisioningTarget,
}

impl<R, C> Orchestrator<R, C>
where
    R: ContainerRuntime,
    C: Connector,
{
    pub fn new(runtime: R, connector: C) -> Self {
        Self {
            runtime,
            connector,
            target: ProvisioningTarget::default(),
        }
    }

    /// Starts the node of the given type and provisions it.
    ///
    /// Unknown node types fail with an [`UnsupportedNodeTypeError`] before the runtime is used at
    /// all. Any other failure is returned with the last state the run reached as context.
    ///
    /// [`UnsupportedNodeTypeError`]: gunash_node::UnsupportedNodeTypeError
    #[instrument(level = "info", skip(self, policy))]
    pub async fn start(
        &self,
        node_type: &str,
        options: LaunchOptions,
        policy: ConnectRetryPolicy,
    ) -> Result<ProvisioningReport> {
        let variant = NodeVariant::lookup(node_type, options)?;

        let mut state = RunState::NotStarted;
        match self.run(&variant, policy, &mut state).await {
            Ok(report) => Ok(report),
            Err(error) => {
                let stage = state.fail();
                error!(?error, stage, "Run failed");
                Err(error.context(format!(
                    "Failed to start the {} node after reaching the {stage} state",
                    variant.identifier
                )))
            }
        }
    }

    async fn run(
        &self,
        variant: &NodeVariant,
        policy: ConnectRetryPolicy,
        state: &mut RunState,
    ) -> Result<ProvisioningReport> {
        self.runtime.pull_image(variant.image).await?;
        state.advance(RunState::ImagePulled);

        self.runtime.run_detached(&variant.container_spec()).await?;
        state.advance(RunState::Running);

        let control_plane = establish_connection(policy, || self.connector.connect()).await?;
        state.advance(RunState::Connected);

        let report = provision(&control_plane, &variant.profile, &self.target, state).await?;

        control_plane.close().await;
        state.advance(RunState::Closed);

        Ok(report)
    }
}

/// Stops the running gunash container. Stopping needs nothing but the runtime, the node is not
/// contacted.
#[instrument(level = "info", skip_all)]
pub async fn stop_node(runtime: &impl ContainerRuntime) -> Result<()> {
    runtime
        .stop(CONTAINER_NAME)
        .await
        .context("Failed to stop the gunash node")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gunash_node::{ProcessExitError, UnsupportedNodeTypeError, supported_node_types};
    use tokio::time::Instant;

    use super::*;
    use crate::{
        constants::TARGET_BALANCE,
        test_utils::{FakeConnector, FakeNode, RecordingRuntime, RuntimeCall},
    };

    fn orchestrator(
        node: &FakeNode,
        failed_connections: usize,
    ) -> (Orchestrator<RecordingRuntime, FakeConnector>, RecordingRuntime) {
        let runtime = RecordingRuntime::default();
        let connector = FakeConnector::new(node.clone(), failed_connections);
        (Orchestrator::new(runtime.clone(), connector), runtime)
    }

    #[tokio::test]
    async fn unknown_node_types_fail_before_touching_the_runtime() {
        // Arrange
        let (orchestrator, runtime) = orchestrator(&FakeNode::default(), 0);

        // Act
        let result = orchestrator
            .start(
                "unknown-x",
                LaunchOptions::default(),
                ConnectRetryPolicy::default(),
            )
            .await;

        // Assert
        let error = result.expect_err("an unknown node type should fail");
        let error = error
            .downcast_ref::<UnsupportedNodeTypeError>()
            .expect("expected an unsupported node type error");
        assert_eq!(
            error.to_string(),
            "unsupported node type unknown-x: should specify geth, openethereum, nethermind, ganache"
        );
        assert!(runtime.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn every_variant_reaches_the_canonical_state() {
        for node_type in supported_node_types() {
            // Arrange
            let node = FakeNode::with_dev_account();
            let (orchestrator, runtime) = orchestrator(&node, 3);

            // Act
            let report = orchestrator
                .start(
                    node_type,
                    LaunchOptions::default(),
                    ConnectRetryPolicy::default(),
                )
                .await
                .expect("Failed to start the node");

            // Assert
            assert!(report.accounts.len() >= 10, "{node_type}");
            for address in report.accounts.iter().skip(1) {
                assert!(node.balance_of(*address) >= TARGET_BALANCE, "{node_type}");
            }
            assert!(node.is_closed(), "{node_type}");
            let calls = runtime.calls();
            assert_eq!(calls.len(), 2, "{node_type}");
            assert!(matches!(calls[0], RuntimeCall::Pull(_)));
            assert!(matches!(calls[1], RuntimeCall::Run(_)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn connection_is_retried_until_the_node_is_reachable() {
        // Arrange
        let node = FakeNode::with_dev_account();
        let (orchestrator, _) = orchestrator(&node, 4);
        let start = Instant::now();

        // Act
        orchestrator
            .start("geth", LaunchOptions::default(), ConnectRetryPolicy::default())
            .await
            .expect("Failed to start the node");

        // Assert
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn ganache_suppresses_vm_errors_only_when_asked_to() {
        for (no_vm_errors_on_rpc_response, expected) in [(true, true), (false, false)] {
            // Arrange
            let (orchestrator, runtime) = orchestrator(&FakeNode::with_dev_account(), 0);
            let options = LaunchOptions {
                no_vm_errors_on_rpc_response,
            };

            // Act
            orchestrator
                .start("ganache", options, ConnectRetryPolicy::default())
                .await
                .expect("Failed to start the node");

            // Assert
            let calls = runtime.calls();
            let RuntimeCall::Run(spec) = &calls[1] else {
                panic!("expected the container to be run, got {calls:?}");
            };
            assert_eq!(spec.image, "trufflesuite/ganache-cli");
            assert_eq!(
                spec.args.iter().any(|arg| arg == "--noVMErrorsOnRPCResponse"),
                expected
            );
        }
    }

    #[tokio::test]
    async fn failures_name_the_last_reached_state() {
        // Arrange
        let (orchestrator, runtime) = orchestrator(&FakeNode::with_dev_account(), 0);
        runtime.fail_runs();

        // Act
        let result = orchestrator
            .start("geth", LaunchOptions::default(), ConnectRetryPolicy::default())
            .await;

        // Assert
        let error = result.expect_err("a failed container run should fail the start");
        assert_eq!(
            error.to_string(),
            "Failed to start the geth node after reaching the ImagePulled state"
        );
        assert!(error.downcast_ref::<ProcessExitError>().is_some());
    }

    #[tokio::test]
    async fn rpc_failures_leave_the_container_running() {
        // Arrange
        let node = FakeNode::with_dev_account().failing_on("eth_accounts", 1);
        let (orchestrator, runtime) = orchestrator(&node, 0);

        // Act
        let result = orchestrator
            .start("geth", LaunchOptions::default(), ConnectRetryPolicy::default())
            .await;

        // Assert
        let error = result.expect_err("a failed rpc call should fail the start");
        assert!(error.to_string().contains("Connected"));
        assert!(
            !runtime
                .calls()
                .iter()
                .any(|call| matches!(call, RuntimeCall::Stop(_)))
        );
    }

    #[tokio::test]
    async fn stop_stops_the_named_container() {
        // Arrange
        let runtime = RecordingRuntime::default();

        // Act
        stop_node(&runtime).await.expect("Failed to stop the node");

        // Assert
        assert_eq!(runtime.calls(), vec![RuntimeCall::Stop("gunash".to_owned())]);
    }

    #[test]
    fn failing_keeps_the_first_failed_stage() {
        let mut state = RunState::Connected;

        assert_eq!(state.fail(), "Connected");
        assert_eq!(state.fail(), "Connected");
        assert_eq!(state, RunState::Failed { stage: "Connected" });
    }
}
