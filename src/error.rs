//! Error types for shuriken
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration context errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// No context is active on this thread
    #[error("No context is active on this thread")]
    NoContext,

    /// Key is not defined anywhere in the context chain
    #[error("'{name}' is not defined in the context")]
    NotInContext { name: String },

    /// Mutation attempted on an immutable context
    #[error("Cannot set '{name}': context is immutable")]
    ImmutableContext { name: String },

    /// Key is defined with a value of another type
    #[error("'{name}' is defined in the context but is not a {expected}")]
    WrongType { name: String, expected: String },

    /// Value assigned to something other than a namespace attribute
    #[error("Incorrect use of context: '{name}' is not a namespace attribute (expected 'namespace.key')")]
    IncorrectUse { name: String },
}

/// Phase graph declaration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Phase name registered twice
    #[error("Phase '{name}' is already defined in project '{project}'")]
    DuplicatePhase { project: String, name: String },

    /// Dependency on a phase name that is not in the project
    #[error("Phase '{phase}' depends on '{dependency}', which is not a phase in the project")]
    UnknownPhase { phase: String, dependency: String },

    /// Dependency on a phase handle registered with another project
    #[error("Phase '{phase}' depends on a phase that is not in the project")]
    ForeignPhase { phase: String },

    /// Phase lists itself as a dependency
    #[error("Phase '{phase}' depends on itself")]
    SelfReference { phase: String },

    /// Indirect dependency cycle
    #[error("Circular phase dependency detected: {}", cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },
}

/// External tool errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// Command could not be located on PATH
    #[error("Command not found: {command}")]
    CommandNotFound { command: String },

    /// Command could not be started
    #[error("Failed to run '{command}': {error}")]
    Spawn { command: String, error: String },

    /// Query command returned a non-zero status
    #[error("Failed to run '{command}' (status {status}): {stderr}")]
    QueryFailed {
        command: String,
        status: i32,
        stderr: String,
    },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove file
    #[error("Failed to remove file '{path}': {error}")]
    RemoveFile { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to read directory
    #[error("Failed to read directory '{path}': {error}")]
    ReadDir { path: PathBuf, error: String },

    /// Glob pattern could not be compiled
    #[error("Invalid glob pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },
}

/// Manifest (shuriken.toml) errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest not found
    #[error("Manifest not found at '{path}'")]
    NotFound { path: PathBuf },

    /// Manifest parse error
    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    /// Unknown executor name
    #[error("Phase '{phase}' uses unknown executor '{executor}' (expected one of: gcc-compile, gcc-link, gcc-build, copy)")]
    UnknownExecutor { phase: String, executor: String },

    /// Unsupported context value
    #[error("Context value for '{name}' has unsupported type: {kind}")]
    UnsupportedValue { name: String, kind: String },
}

/// Top-level shuriken error type
#[derive(Error, Debug)]
pub enum ShurikenError {
    /// Context error
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    /// Graph error
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Tool error
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Manifest error
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
}
