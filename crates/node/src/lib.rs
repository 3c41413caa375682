//! This crate implements the node variants that can be launched and the container runtime that
//! launches them.

pub mod constants;
pub mod node_implementations;
pub mod process;
pub mod variant;

pub use process::{ContainerRuntime, ContainerSpec, DockerCli, ProcessExitError};
pub use variant::{
    ImportStrategy, NodeVariant, UnlockPolicy, UnsupportedNodeTypeError, VariantProfile,
    supported_node_types,
};
