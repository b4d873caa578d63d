//! Shuriken - Ninja build file generator
//!
//! A meta-build library: a project declares named build phases, each with an
//! executor that knows how to invoke a tool, and shuriken compiles the phase
//! graph into a Ninja file and runs Ninja on it.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Configuration context, phase graph and Ninja generation
//! - [`infra`] - Infrastructure layer (filesystem, processes, tool adapters)
//! - [`config`] - Configuration defaults
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
