//! Core module
//!
//! The configuration context, the phase graph and the Ninja file generator.
//! Process execution and tool adapters live in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`context`] - Hierarchical configuration context
//! - [`configure`] - Populating the context's standard namespaces
//! - [`project`] - Projects and their phases
//! - [`executor`] - Contract between phases and tool adapters
//! - [`ninja`] - Ninja file generation and the line writer
//! - [`manifest`] - `shuriken.toml` parsing
//! - [`paths`] - Path string helpers
//! - [`platform`] - Variant names and platform conventions

pub mod configure;
pub mod context;
pub mod executor;
pub mod manifest;
pub mod ninja;
pub mod paths;
pub mod platform;
pub mod project;
