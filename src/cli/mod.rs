//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no build logic - that belongs in the [`crate::core`] module.
//!
//! The `shuriken` binary reads a `shuriken.toml` manifest. Programs that
//! declare their project in Rust get the same commands through
//! [`ProjectCli`]:
//!
//! ```no_run
//! use clap::Parser;
//! use shuriken::cli::ProjectCli;
//! use shuriken::core::context::new_context;
//! use shuriken::core::project::{Phase, Project};
//! use shuriken::infra::copy::CopyFiles;
//!
//! let ctx = new_context();
//! let _guard = ctx.enter();
//! ctx.set("paths.output", "build").unwrap();
//!
//! let mut project = Project::new("assets");
//! project
//!     .add_phase("copy", Phase::new(CopyFiles::new()).with_inputs(["logo.png"]))
//!     .unwrap();
//!
//! let status = ProjectCli::parse().run(&project).unwrap();
//! std::process::exit(status);
//! ```

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{Args, Parser};

use crate::config::defaults::DEFAULT_MANIFEST;
use crate::core::context::{current_context, new_context, PhaseResults, Value};
use crate::core::manifest::Manifest;
use crate::core::project::Project;

use commands::Commands;
use output::OutputConfig;

/// Shuriken - Ninja build file generator
///
/// Compiles a declared graph of build phases into a Ninja file and runs Ninja.
#[derive(Parser, Debug)]
#[command(name = "shuriken")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Manifest file
    #[arg(short = 'f', long = "file", global = true, default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    #[command(flatten)]
    pub options: RunOptions,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Project command line for programs that declare their project in code
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct ProjectCli {
    #[command(flatten)]
    pub options: RunOptions,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by all commands
#[derive(Args, Debug, Clone, Default)]
pub struct RunOptions {
    /// Enable verbose output (-v for info, -vv for debug); Ninja runs with -v
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Set a context value, e.g. `--set gcc.command=clang`
    #[arg(long = "set", value_name = "NAMESPACE.KEY=VALUE", global = true)]
    pub set: Vec<String>,

    /// Variant to generate (default: the host platform)
    #[arg(long, global = true)]
    pub variant: Option<String>,
}

impl Cli {
    /// Load the manifest and execute the command.
    ///
    /// Returns the exit status: Ninja's for `build` and `clean`.
    pub fn run(self) -> Result<i32> {
        let manifest = Manifest::load(&self.manifest)
            .with_context(|| format!("Failed to load manifest {}", self.manifest.display()))?;
        let dir = manifest_dir(&self.manifest);

        let ctx = new_context();
        let _guard = ctx.enter();
        manifest
            .configure(&dir)
            .with_context(|| format!("Failed to configure {}", self.manifest.display()))?;
        let project = manifest.project().context("Failed to declare project")?;

        run_project(&project, self.command.as_ref(), &self.options)
    }
}

impl ProjectCli {
    /// Execute the command for `project` in the active context
    pub fn run(&self, project: &Project) -> Result<i32> {
        run_project(project, self.command.as_ref(), &self.options)
    }
}

/// Execute `command` (default `build`) for `project`.
///
/// Command-line settings are applied in a child of the active context.
pub fn run_project(
    project: &Project,
    command: Option<&Commands>,
    options: &RunOptions,
) -> Result<i32> {
    let overrides = new_context();
    let _guard = overrides.enter();
    overrides.set("cli.verbose", options.verbose > 0)?;
    if let Some(variant) = &options.variant {
        overrides.set("projects.default_variant", variant.as_str())?;
    }
    for assignment in &options.set {
        let (name, value) = parse_override(assignment)?;
        overrides
            .set(&name, value)
            .with_context(|| format!("Invalid --set '{assignment}'"))?;
    }
    let results = current_context()?
        .get_opt::<PhaseResults>("build._phase_results")
        .unwrap_or_default();
    overrides.set("build._phase_results", results.clone())?;

    let output = OutputConfig::new(options.quiet, options.json, options.verbose);
    match command.unwrap_or(&Commands::Build) {
        Commands::Generate => commands::generate::execute(project, &output, &results),
        Commands::Build => commands::build::execute(project, &output, &results),
        Commands::Clean => commands::clean::execute(project, &output, &results),
        Commands::Config => commands::config::execute(&output),
    }
}

/// Parse `namespace.key=value`.
///
/// `true`/`false` become booleans, integers become integers, anything else is
/// a string.
pub fn parse_override(assignment: &str) -> Result<(String, Value)> {
    let Some((name, value)) = assignment.split_once('=') else {
        bail!("Expected NAMESPACE.KEY=VALUE, got '{assignment}'");
    };
    let value = match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        value => value
            .parse::<i64>()
            .map_or_else(|_| Value::Str(value.to_string()), Value::Int),
    };
    Ok((name.trim().to_string(), value))
}

fn manifest_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
        ProjectCli::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "shuriken",
            "-f",
            "demo/shuriken.toml",
            "-vv",
            "--set",
            "gcc.command=clang",
            "--variant",
            "win64",
            "generate",
        ])
        .unwrap();

        assert_eq!(cli.manifest, PathBuf::from("demo/shuriken.toml"));
        assert_eq!(cli.options.verbose, 2);
        assert_eq!(cli.options.set, vec!["gcc.command=clang"]);
        assert_eq!(cli.options.variant.as_deref(), Some("win64"));
        assert!(matches!(cli.command, Some(Commands::Generate)));
    }

    #[test]
    fn test_default_command_and_manifest() {
        let cli = Cli::try_parse_from(["shuriken"]).unwrap();
        assert_eq!(cli.manifest, PathBuf::from(DEFAULT_MANIFEST));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("gcc.ccache=true").unwrap(),
            ("gcc.ccache".to_string(), Value::Bool(true))
        );
        assert_eq!(
            parse_override("ninja.file_columns=80").unwrap(),
            ("ninja.file_columns".to_string(), Value::Int(80))
        );
        assert_eq!(
            parse_override("paths.output=out=dir").unwrap(),
            ("paths.output".to_string(), Value::Str("out=dir".to_string()))
        );
        assert!(parse_override("gcc.command").is_err());
    }

    #[test]
    fn test_manifest_dir() {
        assert_eq!(
            manifest_dir(Path::new("demo/shuriken.toml")),
            PathBuf::from("demo")
        );
        assert!(manifest_dir(Path::new("shuriken.toml")).is_absolute());
    }
}
