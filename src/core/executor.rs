//! Executor and extension contracts
//!
//! An [`Executor`] is attached to every phase. It knows how to render the
//! command line the backend will run and how the phase's outputs are named.
//! [`Extension`]s contribute arguments (include paths, libraries, ...) to
//! toolchain executors.

use std::fmt;

use crate::error::ToolError;

/// Escaping applied to literal command-line text
pub type Escape<'a> = &'a dyn Fn(&str) -> String;

/// Where a phase's outputs are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    /// Intermediate objects (`paths.object`)
    Object,
    /// Final binaries and resources (`paths.binary`)
    Binary,
    /// Anything else, placed under the project's output directory
    Other,
}

/// Capability object that runs a phase
pub trait Executor: fmt::Debug {
    /// Full command line, with literal text passed through `escape`
    fn render_command(
        &self,
        extensions: &[Box<dyn Extension>],
        escape: Escape<'_>,
    ) -> Result<String, ToolError>;

    /// Output classification
    fn output_type(&self) -> OutputType;

    /// Prefix prepended to a single explicit output
    fn output_prefix(&self) -> Option<String> {
        None
    }

    /// Extension the outputs are rewritten to (without the dot)
    fn output_extension(&self) -> Option<String> {
        None
    }

    /// Dependency file emitted by the command
    fn deps_file(&self) -> Option<String> {
        None
    }

    /// Dependency file format (`gcc`, `msvc`)
    fn deps_type(&self) -> Option<String> {
        None
    }
}

/// Toolchain stage an extension is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Compiling sources to objects
    Compile,
    /// Linking objects to a binary
    Link,
}

/// Argument sink exposed by toolchain executors to extensions
pub trait ToolchainArgs {
    /// Add an include search path
    fn add_include_path(&mut self, path: &str);
    /// Add a preprocessor define
    fn define(&mut self, name: &str, value: Option<&str>);
    /// Add a library search path
    fn add_library_path(&mut self, path: &str);
    /// Link against a library
    fn add_library(&mut self, name: &str);
    /// Add a raw flag
    fn add_flag(&mut self, flag: &str);
}

/// Pluggable contributor to toolchain command lines
pub trait Extension: fmt::Debug {
    /// Contribute arguments for `stage`
    fn apply(&self, stage: Stage, args: &mut dyn ToolchainArgs) -> Result<(), ToolError>;
}

/// One argument of a rendered command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Literal text, escaped on render
    Literal(String),
    /// Backend variable such as `$in`, rendered verbatim
    Variable(String),
}

/// Command line under construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    args: Vec<Arg>,
}

impl CommandLine {
    /// Start with a program name
    pub fn new(program: &str) -> Self {
        Self {
            args: vec![Arg::Literal(program.to_string())],
        }
    }

    /// Append a literal argument
    pub fn arg(&mut self, value: impl Into<String>) -> &mut Self {
        self.args.push(Arg::Literal(value.into()));
        self
    }

    /// Append literal arguments
    pub fn args<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .extend(values.into_iter().map(|v| Arg::Literal(v.into())));
        self
    }

    /// Append a backend variable
    pub fn var(&mut self, name: &str) -> &mut Self {
        self.args.push(Arg::Variable(name.to_string()));
        self
    }

    /// Arguments so far
    pub fn as_args(&self) -> &[Arg] {
        &self.args
    }

    /// Render to a single line; literals with whitespace or quotes are
    /// single-quoted, with embedded quotes written as `'\''`
    pub fn render(&self, escape: Escape<'_>) -> String {
        self.args
            .iter()
            .map(|arg| match arg {
                Arg::Literal(text) => {
                    let escaped = escape(text);
                    if escaped.chars().any(|c| c.is_whitespace() || c == '\'') {
                        format!("'{}'", escaped.replace('\'', r"'\''"))
                    } else {
                        escaped
                    }
                }
                Arg::Variable(name) => name.clone(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dollars(text: &str) -> String {
        text.replace('$', "$$")
    }

    #[test]
    fn test_render_escapes_literals_only() {
        let mut command = CommandLine::new("gcc");
        command.arg("-DPRICE=$5").var("$in").arg("-o").var("$out");

        assert_eq!(command.render(&dollars), "gcc -DPRICE=$$5 $in -o $out");
    }

    #[test]
    fn test_render_quotes_whitespace() {
        let mut command = CommandLine::new("cp");
        command.arg("my file.txt");

        assert_eq!(command.render(&dollars), "cp 'my file.txt'");
    }

    #[test]
    fn test_render_quotes_embedded_quote() {
        let mut command = CommandLine::new("echo");
        command.arg("it's here").arg("don't");

        assert_eq!(command.render(&dollars), r"echo 'it'\''s here' 'don'\''t'");
    }

    #[test]
    fn test_args_appends_in_order() {
        let mut command = CommandLine::new("ld");
        command.args(["-L", "lib"]);
        assert_eq!(
            command.as_args(),
            &[
                Arg::Literal("ld".to_string()),
                Arg::Literal("-L".to_string()),
                Arg::Literal("lib".to_string())
            ]
        );
    }
}
