//! Infrastructure layer
//!
//! Handles I/O: the filesystem, external processes and the tool adapters
//! that render their command lines.

pub mod copy;
pub mod filesystem;
pub mod gcc;
pub mod glob;
pub mod pkg_config;
pub mod process;
