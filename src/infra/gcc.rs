//! GCC executors
//!
//! [`GccCompile`] turns sources into objects, [`GccLink`] turns objects into
//! a binary, and [`GccBuild`] does both in one step. Settings come from the
//! `gcc` namespace:
//!
//! - `gcc.command`: compiler driver (`gcc`, `g++`, `clang`, ...)
//! - `gcc.ccache`: run the driver through ccache's symlink directory
//! - `gcc.ccache_path`: that directory
//!
//! The executable extension of [`GccLink`] and [`GccBuild`] follows the
//! variant being generated (`current.variant`).

use crate::config::defaults::{DEFAULT_CCACHE_PATH, DEFAULT_GCC_COMMAND};
use crate::core::context::current_context;
use crate::core::executor::{
    CommandLine, Escape, Executor, Extension, OutputType, Stage, ToolchainArgs,
};
use crate::core::paths::join_path;
use crate::core::platform;
use crate::error::ToolError;

/// Arguments collected from the executor and its extensions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GccArgs {
    /// `-I` paths
    pub include_paths: Vec<String>,
    /// `-D` defines
    pub defines: Vec<(String, Option<String>)>,
    /// `-L` paths
    pub library_paths: Vec<String>,
    /// `-l` libraries
    pub libraries: Vec<String>,
    /// Anything else, passed as is
    pub flags: Vec<String>,
}

impl ToolchainArgs for GccArgs {
    fn add_include_path(&mut self, path: &str) {
        self.include_paths.push(path.to_string());
    }

    fn define(&mut self, name: &str, value: Option<&str>) {
        self.defines
            .push((name.to_string(), value.map(str::to_string)));
    }

    fn add_library_path(&mut self, path: &str) {
        self.library_paths.push(path.to_string());
    }

    fn add_library(&mut self, name: &str) {
        self.libraries.push(name.to_string());
    }

    fn add_flag(&mut self, flag: &str) {
        self.flags.push(flag.to_string());
    }
}

impl GccArgs {
    fn with_extensions(
        &self,
        extensions: &[Box<dyn Extension>],
        stages: &[Stage],
    ) -> Result<Self, ToolError> {
        let mut args = self.clone();
        for stage in stages {
            for extension in extensions {
                extension.apply(*stage, &mut args)?;
            }
        }
        Ok(args)
    }

    fn push_compile(&self, command: &mut CommandLine) {
        command.args(self.flags.iter().cloned());
        for path in &self.include_paths {
            command.arg(format!("-I{path}"));
        }
        for (name, value) in &self.defines {
            match value {
                Some(value) => command.arg(format!("-D{name}={value}")),
                None => command.arg(format!("-D{name}")),
            };
        }
    }

    fn push_link(&self, command: &mut CommandLine) {
        for path in &self.library_paths {
            command.arg(format!("-L{path}"));
        }
        for library in &self.libraries {
            command.arg(format!("-l{library}"));
        }
    }
}

/// Driver settings shared by all GCC executors
#[derive(Debug, Clone, Default)]
struct Driver {
    command: Option<String>,
    standard: Option<String>,
    optimize: Option<String>,
    debug: bool,
    pic: bool,
}

impl Driver {
    fn program(&self) -> String {
        let (command, ccache, ccache_path) = match current_context() {
            Ok(ctx) => (
                ctx.fallback(
                    self.command.clone(),
                    "gcc.command",
                    DEFAULT_GCC_COMMAND.to_string(),
                ),
                ctx.get("gcc.ccache", false),
                ctx.get("gcc.ccache_path", DEFAULT_CCACHE_PATH.to_string()),
            ),
            Err(_) => (
                self.command
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GCC_COMMAND.to_string()),
                false,
                String::new(),
            ),
        };
        if ccache {
            join_path(&ccache_path, &command)
        } else {
            command
        }
    }

    fn start(&self) -> CommandLine {
        CommandLine::new(&self.program())
    }

    fn push_options(&self, command: &mut CommandLine) {
        if let Some(standard) = &self.standard {
            command.arg(format!("-std={standard}"));
        }
        if let Some(level) = &self.optimize {
            command.arg(format!("-O{level}"));
        }
        if self.debug {
            command.arg("-g");
        }
        if self.pic {
            command.arg("-fPIC");
        }
    }
}

/// Variant being generated, or the host's outside of generation
fn current_variant() -> String {
    current_context()
        .ok()
        .and_then(|ctx| ctx.get_opt::<String>("current.variant"))
        .unwrap_or_else(platform::host_platform)
}

macro_rules! driver_builders {
    () => {
        /// Use another compiler driver than `gcc.command`
        #[must_use]
        pub fn with_command(mut self, command: impl Into<String>) -> Self {
            self.driver.command = Some(command.into());
            self
        }

        /// Language standard (`-std=`)
        #[must_use]
        pub fn standard(mut self, standard: impl Into<String>) -> Self {
            self.driver.standard = Some(standard.into());
            self
        }

        /// Optimization level (`-O`)
        #[must_use]
        pub fn optimize(mut self, level: impl Into<String>) -> Self {
            self.driver.optimize = Some(level.into());
            self
        }

        /// Emit debug information
        #[must_use]
        pub fn debug(mut self) -> Self {
            self.driver.debug = true;
            self
        }

        /// Add an include path
        #[must_use]
        pub fn include_path(mut self, path: impl Into<String>) -> Self {
            self.args.include_paths.push(path.into());
            self
        }

        /// Add a define
        #[must_use]
        pub fn define(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
            self.args
                .defines
                .push((name.into(), value.map(str::to_string)));
            self
        }

        /// Add a raw flag
        #[must_use]
        pub fn flag(mut self, flag: impl Into<String>) -> Self {
            self.args.flags.push(flag.into());
            self
        }

        /// Add a library search path
        #[must_use]
        pub fn library_path(mut self, path: impl Into<String>) -> Self {
            self.args.library_paths.push(path.into());
            self
        }

        /// Link against a library
        #[must_use]
        pub fn library(mut self, name: impl Into<String>) -> Self {
            self.args.libraries.push(name.into());
            self
        }
    };
}

/// Compile each source to an object file
#[derive(Debug, Clone, Default)]
pub struct GccCompile {
    driver: Driver,
    args: GccArgs,
}

impl GccCompile {
    /// Compile with the configured driver
    pub fn new() -> Self {
        Self::default()
    }

    driver_builders!();

    /// Generate position-independent code
    #[must_use]
    pub fn pic(mut self) -> Self {
        self.driver.pic = true;
        self
    }
}

impl Executor for GccCompile {
    fn render_command(
        &self,
        extensions: &[Box<dyn Extension>],
        escape: Escape<'_>,
    ) -> Result<String, ToolError> {
        let args = self.args.with_extensions(extensions, &[Stage::Compile])?;
        let mut command = self.driver.start();
        command.args(["-MD", "-MF"]).var("$out.d");
        self.driver.push_options(&mut command);
        args.push_compile(&mut command);
        command.arg("-c").var("$in").arg("-o").var("$out");
        Ok(command.render(escape))
    }

    fn output_type(&self) -> OutputType {
        OutputType::Object
    }

    fn output_extension(&self) -> Option<String> {
        Some("o".to_string())
    }

    fn deps_file(&self) -> Option<String> {
        Some("$out.d".to_string())
    }

    fn deps_type(&self) -> Option<String> {
        Some("gcc".to_string())
    }
}

/// Link objects into an executable or shared library
#[derive(Debug, Clone, Default)]
pub struct GccLink {
    driver: Driver,
    args: GccArgs,
    shared: bool,
}

impl GccLink {
    /// Link with the configured driver
    pub fn new() -> Self {
        Self::default()
    }

    driver_builders!();

    /// Produce a shared library (`lib<name>.so`, `<name>.dll`, ...)
    #[must_use]
    pub fn shared(mut self) -> Self {
        self.shared = true;
        self
    }
}

impl Executor for GccLink {
    fn render_command(
        &self,
        extensions: &[Box<dyn Extension>],
        escape: Escape<'_>,
    ) -> Result<String, ToolError> {
        let args = self.args.with_extensions(extensions, &[Stage::Link])?;
        let mut command = self.driver.start();
        if self.shared {
            command.arg("-shared");
        }
        self.driver.push_options(&mut command);
        command.args(args.flags.iter().cloned());
        command.var("$in").arg("-o").var("$out");
        args.push_link(&mut command);
        Ok(command.render(escape))
    }

    fn output_type(&self) -> OutputType {
        OutputType::Binary
    }

    fn output_prefix(&self) -> Option<String> {
        self.shared
            .then(|| platform::shared_library_prefix(&current_variant()).to_string())
    }

    fn output_extension(&self) -> Option<String> {
        let variant = current_variant();
        if self.shared {
            Some(platform::shared_library_extension(&variant).to_string())
        } else {
            platform::executable_extension(&variant).map(str::to_string)
        }
    }
}

/// Compile and link sources into an executable in one step
#[derive(Debug, Clone, Default)]
pub struct GccBuild {
    driver: Driver,
    args: GccArgs,
}

impl GccBuild {
    /// Build with the configured driver
    pub fn new() -> Self {
        Self::default()
    }

    driver_builders!();
}

impl Executor for GccBuild {
    fn render_command(
        &self,
        extensions: &[Box<dyn Extension>],
        escape: Escape<'_>,
    ) -> Result<String, ToolError> {
        let args = self
            .args
            .with_extensions(extensions, &[Stage::Compile, Stage::Link])?;
        let mut command = self.driver.start();
        command.args(["-MD", "-MF"]).var("$out.d");
        self.driver.push_options(&mut command);
        args.push_compile(&mut command);
        command.var("$in").arg("-o").var("$out");
        args.push_link(&mut command);
        Ok(command.render(escape))
    }

    fn output_type(&self) -> OutputType {
        OutputType::Binary
    }

    fn output_extension(&self) -> Option<String> {
        platform::executable_extension(&current_variant()).map(str::to_string)
    }

    fn deps_file(&self) -> Option<String> {
        Some("$out.d".to_string())
    }

    fn deps_type(&self) -> Option<String> {
        Some("gcc".to_string())
    }
}
