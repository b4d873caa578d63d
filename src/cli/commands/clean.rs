//! CLI implementation for `shuriken clean`

use anyhow::{Context, Result};

use super::Report;
use crate::cli::output::OutputConfig;
use crate::core::context::PhaseResults;
use crate::core::ninja::NinjaFile;
use crate::core::project::Project;

/// Execute the clean command.
///
/// Returns Ninja's exit status; the Ninja file is kept when cleaning fails.
pub fn execute(project: &Project, output: &OutputConfig, results: &PhaseResults) -> Result<i32> {
    let ninja = NinjaFile::new(project);
    let path = ninja.path()?;
    let existed = path.is_file();
    let status = ninja
        .clean()
        .with_context(|| format!("Failed to clean {project}"))?;

    if status != 0 {
        output.warning(&format!("Ninja exited with status {status}"));
    } else if existed {
        output.success(&format!("Cleaned {project}"));
    } else {
        output.success("Nothing to clean");
    }
    output.report(&Report::new(project, "clean", status, results))?;
    Ok(status)
}
