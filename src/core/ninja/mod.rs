//! Ninja build file generation
//!
//! [`NinjaFile`] compiles a [`Project`]'s phase graph into a Ninja file. Every
//! phase becomes one `rule` block followed by its `build` edges. Phases are
//! written after the phases they take inputs from, and each phase is written
//! once no matter how many phases depend on it.
//!
//! All settings are read from the active context:
//!
//! - `ninja.command`, `ninja.file_name`, `ninja.file_columns`,
//!   `ninja.file_columns_strict`
//! - `paths.output` (required), `paths.input`, `paths.object`,
//!   `paths.object_relative`, `paths.binary`, `paths.binary_relative`
//! - `cli.verbose`
//!
//! Outputs are reported to the `build._phase_results` collector when the
//! context has one.

pub mod writer;

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::defaults::{
    DEFAULT_BINARY_RELATIVE, DEFAULT_COLUMNS, DEFAULT_FILE_NAME, DEFAULT_NINJA_COMMAND,
    DEFAULT_OBJECT_RELATIVE,
};
use crate::core::context::{current_context, new_context, Context, PhaseResults};
use crate::core::executor::OutputType;
use crate::core::paths::{change_extension, dedup, join_path, with_trailing_separator};
use crate::core::project::{Phase, Project};
use crate::error::{ContextError, GraphError, ShurikenError};
use crate::infra::{filesystem, process};

use writer::Writer;

/// Escape command text: `$` becomes `$$`
pub fn escape(value: &str) -> String {
    value.replace('$', "$$")
}

/// Escape a path token for `build` lines.
///
/// Already escaped spaces are escaped again, then bare spaces and colons.
pub fn pathify(value: &str) -> String {
    value
        .replace("$ ", "$$ ")
        .replace(' ', "$ ")
        .replace(':', "$:")
}

/// A Ninja build file for one project
#[derive(Debug)]
pub struct NinjaFile<'a> {
    project: &'a Project,
    command: Option<String>,
    file_name: Option<String>,
    columns: Option<usize>,
    strict: Option<bool>,
}

impl<'a> NinjaFile<'a> {
    /// Ninja file for `project`, configured entirely from the context
    pub fn new(project: &'a Project) -> Self {
        Self {
            project,
            command: None,
            file_name: project.file_name().map(|name| format!("{name}.ninja")),
            columns: None,
            strict: None,
        }
    }

    /// Override `ninja.command`
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Override the file name
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Override `ninja.file_columns` (0 disables wrapping)
    #[must_use]
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Override `ninja.file_columns_strict`
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// The project being compiled
    pub fn project(&self) -> &Project {
        self.project
    }

    /// Directory holding the file and the variant's outputs:
    /// `paths.output/<variant>`
    pub fn base_path(&self) -> Result<String, ContextError> {
        let ctx = current_context()?;
        let output: String = ctx.require("paths.output")?;
        let variant = self.project.variant();
        if variant.is_empty() {
            Ok(output)
        } else {
            Ok(join_path(&output, &variant))
        }
    }

    /// Path of the generated file
    pub fn path(&self) -> Result<PathBuf, ContextError> {
        let ctx = current_context()?;
        let file_name = ctx.fallback(
            self.file_name.clone(),
            "ninja.file_name",
            DEFAULT_FILE_NAME.to_string(),
        );
        Ok(PathBuf::from(join_path(&self.base_path()?, &file_name)))
    }

    /// Render the complete file.
    ///
    /// The phase graph is validated first; nothing is rendered for a project
    /// with dangling or circular dependencies.
    pub fn render(&self) -> Result<String, ShurikenError> {
        let ctx = current_context()?;
        self.project.validate()?;

        let strict = ctx.fallback(self.strict, "ninja.file_columns_strict", false);
        let columns = ctx.fallback(self.columns, "ninja.file_columns", DEFAULT_COLUMNS);
        let mut writer = Writer::new((columns > 0).then_some(columns), strict);

        writer.comment(&format!("Ninja file for {}", self.project));
        writer.comment(&format!(
            "Generated by shuriken on {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        if let Some(columns) = writer.columns() {
            let mode = if strict { "strict" } else { "non-strict" };
            writer.comment(&format!("Columns: {columns} ({mode})"));
        }

        // Adapters read the variant they are compiled for from `current.variant`.
        let scope = new_context();
        scope.set("current.variant", self.project.variant())?;
        let _scope = scope.enter();

        let layout = OutputLayout::from_context(&ctx, &self.base_path()?);
        let mut resolver = Resolver {
            project: self.project,
            layout,
            writer,
            outputs: HashMap::new(),
            in_progress: Vec::new(),
            results: ctx.get_opt("build._phase_results"),
        };
        for (name, phase) in self.project.phases() {
            resolver.resolve(name, phase)?;
        }
        Ok(resolver.writer.into_string())
    }

    /// Write the file, creating its directory
    pub fn generate(&self) -> Result<PathBuf, ShurikenError> {
        let path = self.path()?;
        info!("Generating '{}'", path.display());
        let text = self.render()?;
        filesystem::write_file(&path, &text)?;
        Ok(path)
    }

    /// Remove the file if it exists
    pub fn remove(&self) -> Result<(), ShurikenError> {
        let path = self.path()?;
        filesystem::remove_file(&path)?;
        Ok(())
    }

    /// Generate the file and run Ninja on it.
    ///
    /// Returns Ninja's exit status; a failed build is not an error.
    pub fn build(&self) -> Result<i32, ShurikenError> {
        let path = self.generate()?;
        let ctx = current_context()?;
        let ninja = process::find_command(&self.command(&ctx))?;
        let verbose = ctx.get("cli.verbose", false);

        let mut command = Command::new(ninja);
        command.arg("-f").arg(&path);
        if verbose {
            command.arg("-v");
        }
        Ok(process::run_status(&mut command)?)
    }

    /// Clean the outputs with Ninja, then remove the file.
    ///
    /// Returns Ninja's exit status; the file is kept when cleaning fails.
    pub fn clean(&self) -> Result<i32, ShurikenError> {
        let ctx = current_context()?;
        if let Some(results) = ctx.get_opt::<PhaseResults>("build._phase_results") {
            results.mark_cleaned(self.project.name());
        }

        let path = self.path()?;
        if path.is_file() {
            let ninja = process::find_command(&self.command(&ctx))?;
            info!("Cleaning '{}'", path.display());
            let mut command = Command::new(ninja);
            command.arg("-f").arg(&path).args(["-t", "clean", "-g"]);
            let status = process::run_status(&mut command)?;
            if status != 0 {
                return Ok(status);
            }
        }
        self.remove()?;
        Ok(0)
    }

    fn command(&self, ctx: &Context) -> String {
        ctx.fallback(
            self.command.clone(),
            "ninja.command",
            DEFAULT_NINJA_COMMAND.to_string(),
        )
    }
}

/// Where outputs go, read once per render
#[derive(Debug)]
struct OutputLayout {
    base: String,
    input: Option<String>,
    object: String,
    binary: String,
}

impl OutputLayout {
    fn from_context(ctx: &Context, base: &str) -> Self {
        let object = ctx.get_opt::<String>("paths.object").unwrap_or_else(|| {
            let relative = ctx.get("paths.object_relative", DEFAULT_OBJECT_RELATIVE.to_string());
            join_path(base, &relative)
        });
        let binary = ctx.get_opt::<String>("paths.binary").unwrap_or_else(|| {
            let relative = ctx.get("paths.binary_relative", DEFAULT_BINARY_RELATIVE.to_string());
            join_path(base, &relative)
        });
        Self {
            base: base.to_string(),
            input: ctx
                .get_opt::<String>("paths.input")
                .filter(|input| !input.is_empty())
                .map(|input| with_trailing_separator(&input)),
            object,
            binary,
        }
    }

    fn output_base(&self, output_type: OutputType) -> &str {
        match output_type {
            OutputType::Object => &self.object,
            OutputType::Binary => &self.binary,
            OutputType::Other => &self.base,
        }
    }

    fn strip_input<'p>(&self, path: &'p str) -> &'p str {
        self.input
            .as_deref()
            .and_then(|input| path.strip_prefix(input))
            .unwrap_or(path)
    }
}

/// Put `prefix` in front of the file name of `path`
fn prefix_file_name(path: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    match path.rfind(['/', std::path::MAIN_SEPARATOR]) {
        Some(i) => format!("{}{prefix}{}", &path[..=i], &path[i + 1..]),
        None => format!("{prefix}{path}"),
    }
}

/// Depth-first phase resolution with memoized outputs
struct Resolver<'p> {
    project: &'p Project,
    layout: OutputLayout,
    writer: Writer,
    outputs: HashMap<&'p str, Vec<String>>,
    in_progress: Vec<&'p str>,
    results: Option<PhaseResults>,
}

impl<'p> Resolver<'p> {
    fn resolve(&mut self, name: &'p str, phase: &'p Phase) -> Result<(), ShurikenError> {
        if self.outputs.contains_key(name) {
            return Ok(());
        }
        if let Some(pos) = self.in_progress.iter().position(|&n| n == name) {
            let mut cycle: Vec<String> = self.in_progress[pos..]
                .iter()
                .map(ToString::to_string)
                .collect();
            cycle.push(name.to_string());
            return Err(GraphError::Cycle { cycle }.into());
        }
        debug!("Resolving phase '{name}'");

        let project = self.project;
        self.in_progress.push(name);
        let mut sources = Vec::with_capacity(phase.inputs_from.len());
        for reference in &phase.inputs_from {
            let source = project.resolve_ref(name, reference)?;
            let source_phase = project
                .phase(source)
                .ok_or_else(|| GraphError::UnknownPhase {
                    phase: name.to_string(),
                    dependency: source.to_string(),
                })?;
            self.resolve(source, source_phase)?;
            sources.push(source);
        }
        self.in_progress.pop();

        self.write_rule(name, phase, &sources)
    }

    fn write_rule(
        &mut self,
        name: &'p str,
        phase: &'p Phase,
        sources: &[&'p str],
    ) -> Result<(), ShurikenError> {
        let executor = &phase.executor;
        let rule = name.replace(' ', "_");

        let w = &mut self.writer;
        w.blank();
        w.line(&format!("rule {rule}"), 0);
        let description = phase
            .description
            .clone()
            .unwrap_or_else(|| format!("{name} $out"));
        w.line(&format!("description = {description}"), 1);
        let command = phase.command_as_str(&escape)?;
        w.line(&format!("command = {command}"), 1);
        if let Some(deps_file) = executor.deps_file() {
            w.line(&format!("depfile = {deps_file}"), 1);
            if let Some(deps_type) = executor.deps_type() {
                w.line(&format!("deps = {deps_type}"), 1);
            }
        }

        let mut inputs = phase.inputs.clone();
        for source in sources {
            if let Some(outputs) = self.outputs.get(source) {
                inputs.extend(outputs.iter().cloned());
            }
        }
        let inputs = dedup(&inputs);

        let output_base = self.layout.output_base(executor.output_type());
        let extension = executor.output_extension();
        let mut outputs = Vec::new();

        if let Some(output) = &phase.output {
            let prefix = executor.output_prefix().unwrap_or_default();
            let output = change_extension(
                &join_path(output_base, &prefix_file_name(output, &prefix)),
                extension.as_deref(),
            );
            let mut line = format!("build {}: {rule}", pathify(&output));
            for input in &inputs {
                line.push(' ');
                line.push_str(&pathify(input));
            }
            w.blank();
            w.line(&line, 0);
            outputs.push(output);
        } else if !inputs.is_empty() {
            w.blank();
            for input in &inputs {
                let relative = change_extension(self.layout.strip_input(input), extension.as_deref());
                let output = join_path(output_base, &relative);
                w.line(
                    &format!("build {}: {rule} {}", pathify(&output), pathify(input)),
                    0,
                );
                outputs.push(output);
            }
        }

        if let Some(results) = &self.results {
            results.touch(name);
            for output in &outputs {
                results.record(name, output);
            }
        }
        self.outputs.insert(name, outputs);
        Ok(())
    }
}
