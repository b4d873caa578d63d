//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod clean;
pub mod config;
pub mod generate;

use std::collections::BTreeMap;

use clap::Subcommand;
use serde::Serialize;

use crate::core::context::PhaseResults;
use crate::core::project::Project;

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Write the Ninja file without building
    Generate,

    /// Write the Ninja file and run Ninja on it (default)
    Build,

    /// Clean the outputs with Ninja and remove the Ninja file
    Clean,

    /// Show the effective configuration
    Config,
}

/// Result of a project command, printed with `--json`
#[derive(Debug, Serialize)]
pub struct Report {
    /// Project description
    pub project: String,
    /// Command that ran
    pub command: &'static str,
    /// Exit status
    pub status: i32,
    /// Generated Ninja file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Outputs per phase
    pub phases: BTreeMap<String, Vec<String>>,
    /// Whether the project was cleaned
    pub cleaned: bool,
}

impl Report {
    /// Collect the report for `project` from the phase results
    pub fn new(
        project: &Project,
        command: &'static str,
        status: i32,
        results: &PhaseResults,
    ) -> Self {
        Self {
            project: project.to_string(),
            command,
            status,
            file: None,
            phases: results.all(),
            cleaned: results.is_cleaned(project.name()),
        }
    }

    /// Attach the Ninja file path
    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}
