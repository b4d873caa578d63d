//! Populating the active context
//!
//! Each `configure_*` function writes one namespace of the active context.
//! Options left unset are not written, so values from enclosing contexts stay
//! visible.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::defaults::{
    DEFAULT_BINARY_RELATIVE, DEFAULT_OBJECT_RELATIVE, DEFAULT_OUTPUT_RELATIVE,
    DEFAULT_PKG_CONFIG_COMMAND, DEFAULT_SOURCE_RELATIVE,
};
use crate::core::context::{current_context_mut, new_context, Context};
use crate::core::paths::join_path;
use crate::error::ContextError;

/// Directory layout of a build (`paths` namespace)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildPaths {
    /// Project root; the working directory when unset
    pub root: Option<String>,
    /// Common root of the inputs, stripped from fan-out outputs; the root
    /// when unset
    pub input: Option<String>,
    /// `input` relative to the root
    pub input_relative: Option<String>,
    /// Output directory
    pub output: Option<String>,
    /// `output` relative to the root (default `build`)
    pub output_relative: Option<String>,
    /// Fixed binary directory
    pub binary: Option<String>,
    /// Binary directory relative to each variant's output (default `bin`)
    pub binary_relative: Option<String>,
    /// Fixed object directory
    pub object: Option<String>,
    /// Object directory relative to each variant's output (default `obj`)
    pub object_relative: Option<String>,
    /// Source directory
    pub source: Option<String>,
    /// `source` relative to the root (default `src`)
    pub source_relative: Option<String>,
}

impl BuildPaths {
    /// Layout rooted at `root`
    pub fn rooted(root: impl Into<String>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Resolve the directory paths that are set against `base`
    pub fn resolve_relative(&mut self, base: &str) {
        for path in [
            &mut self.root,
            &mut self.input,
            &mut self.output,
            &mut self.binary,
            &mut self.object,
            &mut self.source,
        ]
        .into_iter()
        .flatten()
        {
            *path = join_path(base, path);
        }
    }
}

/// Ninja file settings (`ninja` namespace)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NinjaOptions {
    /// Ninja executable
    pub command: Option<String>,
    /// Generated file name
    pub file_name: Option<String>,
    /// Wrap width, 0 for none
    pub columns: Option<usize>,
    /// Allow hard breaks inside tokens
    pub strict: Option<bool>,
}

/// GCC settings (`gcc` namespace)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GccOptions {
    /// Compiler driver
    pub command: Option<String>,
    /// Compile through ccache
    pub ccache: Option<bool>,
    /// Directory of ccache's compiler symlinks
    pub ccache_path: Option<String>,
}

/// pkg-config settings (`pkg_config` namespace)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PkgConfigOptions {
    /// pkg-config executable
    pub command: Option<String>,
    /// `PKG_CONFIG_PATH` for queries
    pub path: Option<String>,
}

/// Write the `paths` namespace of the active context
pub fn configure_build(paths: &BuildPaths) -> Result<(), ContextError> {
    let ctx = current_context_mut()?;

    let root = match &paths.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .display()
            .to_string(),
    };
    let under_root = |path: &Option<String>, relative: Option<&str>| {
        path.clone()
            .or_else(|| relative.map(|relative| join_path(&root, relative)))
    };

    ctx.set("paths.root", root.as_str())?;
    ctx.set_opt(
        "paths.input",
        under_root(
            &paths.input,
            Some(paths.input_relative.as_deref().unwrap_or("")),
        ),
    )?;
    ctx.set_opt(
        "paths.output",
        under_root(
            &paths.output,
            Some(paths.output_relative.as_deref().unwrap_or(DEFAULT_OUTPUT_RELATIVE)),
        ),
    )?;
    ctx.set_opt("paths.binary", paths.binary.clone())?;
    ctx.set(
        "paths.binary_relative",
        paths
            .binary_relative
            .as_deref()
            .unwrap_or(DEFAULT_BINARY_RELATIVE),
    )?;
    ctx.set_opt("paths.object", paths.object.clone())?;
    ctx.set(
        "paths.object_relative",
        paths
            .object_relative
            .as_deref()
            .unwrap_or(DEFAULT_OBJECT_RELATIVE),
    )?;
    ctx.set_opt(
        "paths.source",
        under_root(
            &paths.source,
            Some(paths.source_relative.as_deref().unwrap_or(DEFAULT_SOURCE_RELATIVE)),
        ),
    )?;
    Ok(())
}

/// Create a context chained to the active one and configure its paths
pub fn new_build_context(paths: &BuildPaths) -> Result<Arc<Context>, ContextError> {
    let ctx = new_context();
    let _guard = ctx.enter();
    configure_build(paths)?;
    Ok(ctx)
}

/// Write the `ninja` namespace of the active context
pub fn configure_ninja(options: &NinjaOptions) -> Result<(), ContextError> {
    let ctx = current_context_mut()?;
    ctx.set_opt("ninja.command", options.command.clone())?;
    ctx.set_opt("ninja.file_name", options.file_name.clone())?;
    ctx.set_opt("ninja.file_columns", options.columns)?;
    ctx.set_opt("ninja.file_columns_strict", options.strict)?;
    Ok(())
}

/// Write the `gcc` namespace of the active context
pub fn configure_gcc(options: &GccOptions) -> Result<(), ContextError> {
    let ctx = current_context_mut()?;
    ctx.set_opt("gcc.command", options.command.clone())?;
    ctx.set_opt("gcc.ccache", options.ccache)?;
    ctx.set_opt("gcc.ccache_path", options.ccache_path.clone())?;
    Ok(())
}

/// Write the `pkg_config` namespace of the active context
pub fn configure_pkg_config(options: &PkgConfigOptions) -> Result<(), ContextError> {
    let ctx = current_context_mut()?;
    ctx.set(
        "pkg_config.command",
        options
            .command
            .as_deref()
            .unwrap_or(DEFAULT_PKG_CONFIG_COMMAND),
    )?;
    ctx.set_opt("pkg_config.path", options.path.clone())?;
    Ok(())
}
