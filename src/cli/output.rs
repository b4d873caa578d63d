//! Output formatting
//!
//! Status messages go to stdout unless `--quiet` or `--json` is set; errors
//! always go to stderr.

use std::sync::OnceLock;

use serde::Serialize;

static GLOBAL: OnceLock<OutputConfig> = OnceLock::new();

/// How the CLI reports to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Only errors
    pub quiet: bool,
    /// Machine-readable reports instead of messages
    pub json: bool,
    /// `-v` count
    pub verbose: u8,
}

impl OutputConfig {
    /// Create an output configuration
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Make this the configuration used by [`OutputConfig::global`]
    pub fn apply_global(self) {
        // First one wins; later calls come from library users re-entering the CLI.
        let _ = GLOBAL.set(self);
    }

    /// The configuration applied by `main`, or the default
    pub fn global() -> Self {
        GLOBAL.get().copied().unwrap_or_default()
    }

    /// Whether status messages are printed
    pub fn shows_messages(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.shows_messages() {
            println!("{} {message}", status::SUCCESS);
        }
    }

    /// Print an informational message
    pub fn info(&self, message: &str) {
        if self.shows_messages() {
            println!("{} {message}", status::INFO);
        }
    }

    /// Print a warning
    pub fn warning(&self, message: &str) {
        if self.shows_messages() {
            println!("{} {message}", status::WARNING);
        }
    }

    /// Print a report as JSON when `--json` is set
    pub fn report<T: Serialize>(&self, report: &T) -> serde_json::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        Ok(())
    }
}

/// Print an error and its causes to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  Caused by: {cause}");
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}
