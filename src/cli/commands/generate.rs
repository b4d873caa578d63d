//! CLI implementation for `shuriken generate`

use anyhow::{Context, Result};

use super::Report;
use crate::cli::output::OutputConfig;
use crate::core::context::PhaseResults;
use crate::core::ninja::NinjaFile;
use crate::core::project::Project;

/// Execute the generate command
pub fn execute(project: &Project, output: &OutputConfig, results: &PhaseResults) -> Result<i32> {
    let ninja = NinjaFile::new(project);
    let path = ninja
        .generate()
        .with_context(|| format!("Failed to generate Ninja file for {project}"))?;

    output.success(&format!("Generated {}", path.display()));
    let report = Report::new(project, "generate", 0, results)
        .with_file(path.display().to_string());
    output.report(&report)?;
    Ok(0)
}
