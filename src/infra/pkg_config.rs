//! pkg-config extension
//!
//! A [`Package`] asks `pkg-config` for a library's compile and link flags and
//! feeds them to GCC executors. The tool is found through `pkg_config.command`
//! (or `$PKG_CONFIG`), and `pkg_config.path` is passed as `PKG_CONFIG_PATH`.
//! A failing query is an error, since the build cannot be described without
//! its answer.

use std::process::Command;

use crate::config::defaults::DEFAULT_PKG_CONFIG_COMMAND;
use crate::core::context::current_context;
use crate::core::executor::{Extension, Stage, ToolchainArgs};
use crate::error::ToolError;
use crate::infra::process;

/// A library configured by pkg-config
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    command: Option<String>,
    path: Option<String>,
    is_static: bool,
}

impl Package {
    /// Package by its pkg-config name (`gtk+-3.0`, `sdl2`, ...)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: None,
            path: None,
            is_static: false,
        }
    }

    /// Override `pkg_config.command`
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Override `pkg_config.path`
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Ask for static linking flags
    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Package name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, flags: &[&str]) -> Result<Vec<String>, ToolError> {
        let default = std::env::var("PKG_CONFIG")
            .unwrap_or_else(|_| DEFAULT_PKG_CONFIG_COMMAND.to_string());
        let (command, path) = match current_context() {
            Ok(ctx) => (
                ctx.fallback(self.command.clone(), "pkg_config.command", default),
                self.path
                    .clone()
                    .or_else(|| ctx.get_opt("pkg_config.path")),
            ),
            Err(_) => (self.command.clone().unwrap_or(default), self.path.clone()),
        };

        let mut query = Command::new(process::find_command(&command)?);
        query.args(flags).arg(&self.name);
        if let Some(path) = path {
            query.env("PKG_CONFIG_PATH", path);
        }
        Ok(split_flags(&process::run_query(&mut query)?))
    }
}

impl Extension for Package {
    fn apply(&self, stage: Stage, args: &mut dyn ToolchainArgs) -> Result<(), ToolError> {
        match stage {
            Stage::Compile => add_cflags(args, &self.query(&["--cflags"])?),
            Stage::Link => {
                let flags: &[&str] = if self.is_static {
                    &["--libs", "--static"]
                } else {
                    &["--libs"]
                };
                add_libs(args, &self.query(flags)?);
            }
        }
        Ok(())
    }
}

/// Split pkg-config output on whitespace that is not backslash-escaped
pub fn split_flags(output: &str) -> Vec<String> {
    let mut flags = Vec::new();
    let mut current = String::new();
    let mut chars = output.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) if next.is_whitespace() => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            },
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    flags.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        flags.push(current);
    }
    flags
}

/// Feed `--cflags` output to a toolchain
pub fn add_cflags(args: &mut dyn ToolchainArgs, flags: &[String]) {
    for flag in flags {
        if let Some(path) = flag.strip_prefix("-I") {
            args.add_include_path(path);
        } else if let Some(define) = flag.strip_prefix("-D") {
            match define.split_once('=') {
                Some((name, value)) => args.define(name, Some(value)),
                None => args.define(define, None),
            }
        } else {
            args.add_flag(flag);
        }
    }
}

/// Feed `--libs` output to a toolchain
pub fn add_libs(args: &mut dyn ToolchainArgs, flags: &[String]) {
    for flag in flags {
        if let Some(path) = flag.strip_prefix("-L") {
            args.add_library_path(path);
        } else if let Some(library) = flag.strip_prefix("-l") {
            args.add_library(library);
        } else {
            args.add_flag(flag);
        }
    }
}
