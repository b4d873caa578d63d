//! CLI implementation for `shuriken build`

use anyhow::{Context, Result};

use super::Report;
use crate::cli::output::OutputConfig;
use crate::core::context::PhaseResults;
use crate::core::ninja::NinjaFile;
use crate::core::project::Project;

/// Execute the build command.
///
/// Returns Ninja's exit status.
pub fn execute(project: &Project, output: &OutputConfig, results: &PhaseResults) -> Result<i32> {
    let ninja = NinjaFile::new(project);
    output.info(&format!("Building {project}"));
    let status = ninja
        .build()
        .with_context(|| format!("Failed to build {project}"))?;

    if status == 0 {
        output.success(&format!("Built {project}"));
    } else {
        output.warning(&format!("Ninja exited with status {status}"));
    }
    let path = ninja.path()?;
    let report = Report::new(project, "build", status, results)
        .with_file(path.display().to_string());
    output.report(&report)?;
    Ok(status)
}
