//! This crate provides common concepts, functionality, and types that other crates in the workspace
//! can benefit from.

pub mod futures;
pub mod types;
