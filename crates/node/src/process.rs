//! The container runtime that node variants are launched in.

use std::{pin::Pin, process::Stdio};

use anyhow::Context as _;
use thiserror::Error;
use tokio::process::Command;
use tracing::instrument;

/// The error returned when a runtime process exits unsuccessfully.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{} exited with code {}", .process_name, display_code(.code))]
pub struct ProcessExitError {
    pub process_name: String,
    /// The exit code of the process, [`None`] if it was terminated by a signal.
    pub code: Option<i32>,
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_owned(), |code| code.to_string())
}

/// Everything that's needed to start a detached container.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// Pairs of `(host port, container port)` to publish.
    pub port_mappings: Vec<(u16, u16)>,
    /// The arguments passed to the image's entrypoint.
    pub args: Vec<String>,
}

/// An abstract interface for the runtime that pulls, runs, and stops the node containers.
///
/// Each operation only succeeds if the underlying runtime reports success.
pub trait ContainerRuntime {
    /// Pulls the given image.
    fn pull_image(&self, image: &str) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + '_>>;

    /// Runs a container detached according to the [`ContainerSpec`], returning once the runtime has
    /// started it.
    fn run_detached(
        &self,
        spec: &ContainerSpec,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + '_>>;

    /// Stops the container with the given name.
    fn stop(&self, name: &str) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + '_>>;
}

/// A [`ContainerRuntime`] that drives the `docker` command line with inherited stdio.
#[derive(Clone, Debug)]
pub struct DockerCli {
    docker: String,
}

impl DockerCli {
    const DEFAULT_BINARY: &str = "docker";

    pub fn new(docker: impl Into<String>) -> Self {
        Self {
            docker: docker.into(),
        }
    }

    /// The arguments of the `docker run` invocation for a [`ContainerSpec`].
    pub fn run_arguments(spec: &ContainerSpec) -> Vec<String> {
        let mut arguments = vec![
            "run".to_owned(),
            "--detach".to_owned(),
            "--rm".to_owned(),
            "--name".to_owned(),
            spec.name.clone(),
        ];
        for (host_port, container_port) in spec.port_mappings.iter() {
            arguments.push("--publish".to_owned());
            arguments.push(format!("{host_port}:{container_port}"));
        }
        arguments.push(spec.image.clone());
        arguments.extend(spec.args.iter().cloned());
        arguments
    }

    async fn execute(&self, process_name: String, arguments: Vec<String>) -> anyhow::Result<()> {
        tracing::debug!(?arguments, "Running {process_name}");

        let status = Command::new(&self.docker)
            .args(&arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .with_context(|| format!("Failed to spawn {process_name}"))?;

        if !status.success() {
            return Err(ProcessExitError {
                process_name,
                code: status.code(),
            }
            .into());
        }

        Ok(())
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BINARY)
    }
}

impl ContainerRuntime for DockerCli {
    #[instrument(level = "info", skip(self))]
    fn pull_image(&self, image: &str) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + '_>> {
        let arguments = vec!["pull".to_owned(), image.to_owned()];
        Box::pin(self.execute("docker pull".to_owned(), arguments))
    }

    #[instrument(level = "info", skip_all, fields(name = %spec.name, image = %spec.image))]
    fn run_detached(
        &self,
        spec: &ContainerSpec,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + '_>> {
        let arguments = Self::run_arguments(spec);
        Box::pin(self.execute("docker run".to_owned(), arguments))
    }

    #[instrument(level = "info", skip(self))]
    fn stop(&self, name: &str) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + '_>> {
        let arguments = vec!["stop".to_owned(), name.to_owned()];
        Box::pin(self.execute(format!("docker stop {name}"), arguments))
    }
}
