//! File copy executor

use crate::core::executor::{CommandLine, Escape, Executor, Extension, OutputType};
use crate::error::ToolError;

/// Copies each input next to the binaries (`cp $in $out`)
#[derive(Debug, Clone)]
pub struct CopyFiles {
    command: String,
}

impl CopyFiles {
    /// Copy with `cp`
    pub fn new() -> Self {
        Self {
            command: "cp".to_string(),
        }
    }

    /// Copy with another command taking `<src> <dest>`
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }
}

impl Default for CopyFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for CopyFiles {
    fn render_command(
        &self,
        _extensions: &[Box<dyn Extension>],
        escape: Escape<'_>,
    ) -> Result<String, ToolError> {
        let mut command = CommandLine::new(&self.command);
        command.var("$in").var("$out");
        Ok(command.render(escape))
    }

    fn output_type(&self) -> OutputType {
        OutputType::Binary
    }
}
