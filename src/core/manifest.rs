//! Manifest (shuriken.toml) parsing
//!
//! A manifest describes one project declaratively: its paths, tool settings,
//! arbitrary context values and its phases. String values support
//! environment variable substitution using `${VAR}` syntax.
//!
//! ```toml
//! [project]
//! name = "hello"
//! version = "1.0"
//!
//! [paths]
//! output_relative = "build"
//!
//! [context]
//! "build.debug" = true
//!
//! [[phase]]
//! name = "compile"
//! executor = "gcc-compile"
//! inputs = ["src/**/*.c"]
//! packages = ["gtk+-3.0"]
//!
//! [[phase]]
//! name = "link"
//! executor = "gcc-link"
//! inputs_from = ["compile"]
//! output = "hello"
//! packages = ["gtk+-3.0"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::defaults::DEFAULT_MANIFEST;
use crate::core::configure::{
    configure_build, configure_gcc, configure_ninja, configure_pkg_config, BuildPaths,
    GccOptions, NinjaOptions, PkgConfigOptions,
};
use crate::core::context::{current_context, current_context_mut, Value};
use crate::core::executor::Executor;
use crate::core::paths::join_path;
use crate::core::project::{Phase, Project};
use crate::error::{ManifestError, ShurikenError};
use crate::infra::copy::CopyFiles;
use crate::infra::gcc::{GccBuild, GccCompile, GccLink};
use crate::infra::glob::glob;
use crate::infra::pkg_config::Package;
use crate::infra::filesystem;

/// The project manifest (shuriken.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Project identity
    pub project: ProjectSection,

    /// Directory layout
    #[serde(default)]
    pub paths: BuildPaths,

    /// Ninja settings
    #[serde(default)]
    pub ninja: NinjaOptions,

    /// GCC settings
    #[serde(default)]
    pub gcc: GccOptions,

    /// pkg-config settings
    #[serde(default)]
    pub pkg_config: PkgConfigOptions,

    /// Extra context values, `"namespace.key" = value`
    #[serde(default)]
    pub context: BTreeMap<String, toml::Value>,

    /// Phases in declaration order
    #[serde(default, rename = "phase")]
    pub phases: Vec<PhaseSpec>,
}

/// `[project]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectSection {
    /// Project name
    pub name: String,

    /// Project version
    #[serde(default)]
    pub version: Option<String>,

    /// Generated file name, without `.ninja`
    #[serde(default)]
    pub file_name: Option<String>,

    /// Fixed variant, instead of `projects.default_variant`
    #[serde(default)]
    pub variant: Option<String>,
}

/// One `[[phase]]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseSpec {
    /// Unique phase name
    pub name: String,

    /// `gcc-compile`, `gcc-link`, `gcc-build` or `copy`
    pub executor: String,

    /// Input paths or glob patterns, relative to the project root
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Phases whose outputs are inputs
    #[serde(default)]
    pub inputs_from: Vec<String>,

    /// Single output name; one output per input when unset
    #[serde(default)]
    pub output: Option<String>,

    /// Description shown by Ninja
    #[serde(default)]
    pub description: Option<String>,

    /// Executor command override
    #[serde(default)]
    pub command: Option<String>,

    /// Language standard
    #[serde(default)]
    pub standard: Option<String>,

    /// Optimization level
    #[serde(default)]
    pub optimize: Option<String>,

    /// Emit debug information
    #[serde(default)]
    pub debug: bool,

    /// Link a shared library
    #[serde(default)]
    pub shared: bool,

    /// Include paths
    #[serde(default)]
    pub include_paths: Vec<String>,

    /// Defines, `NAME` or `NAME=VALUE`
    #[serde(default)]
    pub defines: Vec<String>,

    /// Library search paths
    #[serde(default)]
    pub library_paths: Vec<String>,

    /// Libraries
    #[serde(default)]
    pub libraries: Vec<String>,

    /// Raw flags
    #[serde(default)]
    pub flags: Vec<String>,

    /// pkg-config packages
    #[serde(default)]
    pub packages: Vec<String>,

    /// Ask pkg-config for static linking flags
    #[serde(default, rename = "static")]
    pub static_packages: bool,
}

/// Substitute environment variables in a string using ${VAR} syntax.
///
/// Unset variables expand to nothing.
///
/// ```
/// use shuriken::core::manifest::substitute_env_vars;
///
/// std::env::set_var("SHURIKEN_DOC_VAR", "hello");
/// let result = substitute_env_vars("prefix_${SHURIKEN_DOC_VAR}_suffix").unwrap();
/// assert_eq!(result, "prefix_hello_suffix");
/// std::env::remove_var("SHURIKEN_DOC_VAR");
/// ```
pub fn substitute_env_vars(input: &str) -> Result<String, ManifestError> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| ManifestError::Parse(format!("Invalid regex: {e}")))?;

    Ok(re
        .replace_all(input, |caps: &regex::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned())
}

/// Recursively substitute environment variables in a TOML value
fn substitute_in_value(value: &mut toml::Value) -> Result<(), ManifestError> {
    match value {
        toml::Value::String(s) => {
            *s = substitute_env_vars(s)?;
        }
        toml::Value::Array(arr) => {
            for item in arr.iter_mut() {
                substitute_in_value(item)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                substitute_in_value(v)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Convert a TOML value to a context value
pub fn toml_to_value(name: &str, value: &toml::Value) -> Result<Value, ManifestError> {
    let unsupported = || ManifestError::UnsupportedValue {
        name: name.to_string(),
        kind: value.type_str().to_string(),
    };
    match value {
        toml::Value::String(s) => Ok(Value::Str(s.clone())),
        toml::Value::Integer(i) => Ok(Value::Int(*i)),
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(unsupported))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        _ => Err(unsupported()),
    }
}

/// Flatten `[context]`: quoted `"ns.key"` entries and `ns.key` sub-tables
fn context_entries(
    context: &BTreeMap<String, toml::Value>,
) -> Result<Vec<(String, Value)>, ManifestError> {
    let mut entries = Vec::new();
    for (name, value) in context {
        match value {
            toml::Value::Table(table) => {
                for (key, value) in table {
                    let name = format!("{name}.{key}");
                    entries.push((name.clone(), toml_to_value(&name, value)?));
                }
            }
            value => entries.push((name.clone(), toml_to_value(name, value)?)),
        }
    }
    Ok(entries)
}

macro_rules! gcc_executor {
    ($executor:expr, $spec:expr) => {{
        let spec: &PhaseSpec = $spec;
        let mut executor = $executor;
        if let Some(command) = &spec.command {
            executor = executor.with_command(command.clone());
        }
        if let Some(standard) = &spec.standard {
            executor = executor.standard(standard.clone());
        }
        if let Some(level) = &spec.optimize {
            executor = executor.optimize(level.clone());
        }
        if spec.debug {
            executor = executor.debug();
        }
        for path in &spec.include_paths {
            executor = executor.include_path(path.clone());
        }
        for define in &spec.defines {
            executor = match define.split_once('=') {
                Some((name, value)) => executor.define(name, Some(value)),
                None => executor.define(define.clone(), None),
            };
        }
        for path in &spec.library_paths {
            executor = executor.library_path(path.clone());
        }
        for library in &spec.libraries {
            executor = executor.library(library.clone());
        }
        for flag in &spec.flags {
            executor = executor.flag(flag.clone());
        }
        Box::new(executor) as Box<dyn Executor>
    }};
}

impl PhaseSpec {
    fn executor(&self) -> Result<Box<dyn Executor>, ManifestError> {
        let executor: Box<dyn Executor> = match self.executor.as_str() {
            "gcc-compile" => gcc_executor!(GccCompile::new(), self),
            "gcc-link" if self.shared => gcc_executor!(GccLink::new().shared(), self),
            "gcc-link" => gcc_executor!(GccLink::new(), self),
            "gcc-build" => gcc_executor!(GccBuild::new(), self),
            "copy" => match &self.command {
                Some(command) => Box::new(CopyFiles::new().with_command(command.clone())),
                None => Box::new(CopyFiles::new()),
            },
            other => {
                return Err(ManifestError::UnknownExecutor {
                    phase: self.name.clone(),
                    executor: other.to_string(),
                })
            }
        };
        Ok(executor)
    }

    /// Build the phase; patterns are globbed and paths joined under `paths.root`
    pub fn to_phase(&self) -> Result<Phase, ShurikenError> {
        let root = current_context()
            .ok()
            .and_then(|ctx| ctx.get_opt::<String>("paths.root"))
            .unwrap_or_default();

        let mut inputs = Vec::new();
        for input in &self.inputs {
            if input.contains(['*', '?']) {
                inputs.extend(glob(input)?);
            } else {
                inputs.push(join_path(&root, input));
            }
        }

        let mut phase = Phase {
            inputs,
            inputs_from: self.inputs_from.iter().map(|name| name.as_str().into()).collect(),
            executor: self.executor()?,
            output: self.output.clone(),
            description: self.description.clone(),
            extensions: Vec::new(),
        };
        for package in &self.packages {
            phase = phase.with_extension(Package::new(package).with_static(self.static_packages));
        }
        Ok(phase)
    }
}

impl Manifest {
    /// Load manifest from file path, substituting environment variables
    pub fn load(path: &Path) -> Result<Self, ShurikenError> {
        if !path.is_file() {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        let content = filesystem::read_file(path)?;
        Ok(Self::from_toml(&content)?)
    }

    /// Find `shuriken.toml` in `dir`
    pub fn default_path(dir: &Path) -> std::path::PathBuf {
        dir.join(DEFAULT_MANIFEST)
    }

    /// Parse manifest text, substituting environment variables
    pub fn from_toml(content: &str) -> Result<Self, ManifestError> {
        let mut value: toml::Value =
            toml::from_str(content).map_err(|e| ManifestError::Parse(e.to_string()))?;
        substitute_in_value(&mut value)?;
        value
            .try_into()
            .map_err(|e: toml::de::Error| ManifestError::Parse(e.to_string()))
    }

    /// Serialize manifest to TOML string
    pub fn to_toml(&self) -> Result<String, ManifestError> {
        toml::to_string_pretty(self).map_err(|e| ManifestError::Parse(e.to_string()))
    }

    /// Write the manifest's settings into the active context.
    ///
    /// Relative paths are resolved against `dir`, which is also the default
    /// project root.
    pub fn configure(&self, dir: &Path) -> Result<(), ShurikenError> {
        let base = dir.display().to_string();
        let mut paths = self.paths.clone();
        paths.resolve_relative(&base);
        if paths.root.is_none() {
            paths.root = Some(base);
        }

        configure_build(&paths)?;
        configure_ninja(&self.ninja)?;
        configure_gcc(&self.gcc)?;
        configure_pkg_config(&self.pkg_config)?;

        let ctx = current_context_mut()?;
        for (name, value) in context_entries(&self.context)? {
            ctx.set(&name, value)?;
        }
        Ok(())
    }

    /// Build the project; call inside a configured context
    pub fn project(&self) -> Result<Project, ShurikenError> {
        let mut project = Project::new(self.project.name.clone());
        if let Some(version) = &self.project.version {
            project = project.with_version(version.clone());
        }
        if let Some(file_name) = &self.project.file_name {
            project = project.with_file_name(file_name.clone());
        }
        if let Some(variant) = &self.project.variant {
            let variant = variant.clone();
            project = project.with_variant(move |_| variant.clone());
        }
        for spec in &self.phases {
            project.add_phase(spec.name.clone(), spec.to_phase()?)?;
        }
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::new_context;
    use crate::core::ninja::NinjaFile;
    use crate::error::{ContextError, GraphError};
    use tempfile::TempDir;

    const HELLO: &str = r#"
[project]
name = "hello"
version = "1.0"
variant = "linux64"

[ninja]
columns = 0

[gcc]
command = "clang"

[context]
"build.debug" = true
cli = { verbose = true }

[[phase]]
name = "compile"
executor = "gcc-compile"
inputs = ["src/*.c"]
defines = ["NDEBUG", "LEVEL=2"]

[[phase]]
name = "link"
executor = "gcc-link"
inputs_from = ["compile"]
output = "hello"
libraries = ["m"]
"#;

    fn source_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::write(temp.path().join("src/main.c"), "int main() {}").unwrap();
        std::fs::write(temp.path().join("src/util.c"), "").unwrap();
        temp
    }

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_toml(HELLO).unwrap();

        assert_eq!(manifest.project.name, "hello");
        assert_eq!(manifest.ninja.columns, Some(0));
        assert_eq!(manifest.gcc.command.as_deref(), Some("clang"));
        assert_eq!(manifest.phases.len(), 2);
        assert_eq!(manifest.phases[1].inputs_from, vec!["compile"]);
        assert!(!manifest.phases[1].shared);
    }

    #[test]
    fn test_minimal_manifest() {
        let manifest = Manifest::from_toml("[project]\nname = \"empty\"\n").unwrap();
        assert!(manifest.phases.is_empty());
        assert_eq!(manifest.paths, BuildPaths::default());
    }

    #[test]
    fn test_missing_project_is_parse_error() {
        let err = Manifest::from_toml("[[phase]]\nname = \"a\"\nexecutor = \"copy\"\n").unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("SHURIKEN_TEST_CC", "gcc-13");
        let manifest = Manifest::from_toml(
            "[project]\nname = \"env\"\n[gcc]\ncommand = \"${SHURIKEN_TEST_CC}\"\n",
        )
        .unwrap();
        std::env::remove_var("SHURIKEN_TEST_CC");

        assert_eq!(manifest.gcc.command.as_deref(), Some("gcc-13"));
        assert_eq!(substitute_env_vars("a${SHURIKEN_UNSET_VAR}b").unwrap(), "ab");
    }

    #[test]
    fn test_configure_and_generate() {
        let temp = source_tree();
        let root = temp.path().display().to_string();
        let manifest = Manifest::from_toml(HELLO).unwrap();

        let ctx = new_context();
        let _guard = ctx.enter();
        manifest.configure(temp.path()).unwrap();

        assert_eq!(ctx.get("paths.root", String::new()), root);
        assert_eq!(ctx.get("paths.output", String::new()), join_path(&root, "build"));
        assert!(ctx.get("build.debug", false));
        assert!(ctx.get("cli.verbose", false));
        assert_eq!(ctx.get("ninja.file_columns", 100usize), 0);

        let project = manifest.project().unwrap();
        assert_eq!(project.to_string(), "hello 1.0 (linux64)");
        assert_eq!(
            project.phase("compile").unwrap().inputs,
            vec![join_path(&root, "src/main.c"), join_path(&root, "src/util.c")]
        );

        let text = NinjaFile::new(&project).render().unwrap();
        let objects = join_path(&root, "build/linux64/obj");
        assert!(text.contains(&format!(
            "build {}: compile {}",
            join_path(&objects, "src/main.o"),
            join_path(&root, "src/main.c")
        )));
        assert!(text.contains("  command = clang -MD -MF $out.d -DNDEBUG -DLEVEL=2 -c $in -o $out\n"));
        assert!(text.contains("  command = clang $in -o $out -lm\n"));
    }

    #[test]
    fn test_unknown_executor() {
        let manifest = Manifest::from_toml(
            "[project]\nname = \"x\"\n[[phase]]\nname = \"a\"\nexecutor = \"msvc\"\n",
        )
        .unwrap();
        let err = manifest.project().unwrap_err();
        assert!(matches!(
            err,
            ShurikenError::Manifest(ManifestError::UnknownExecutor { .. })
        ));
    }

    #[test]
    fn test_duplicate_phase_names() {
        let manifest = Manifest::from_toml(
            "[project]\nname = \"x\"\n\
             [[phase]]\nname = \"a\"\nexecutor = \"copy\"\n\
             [[phase]]\nname = \"a\"\nexecutor = \"copy\"\n",
        )
        .unwrap();
        assert!(matches!(
            manifest.project().unwrap_err(),
            ShurikenError::Graph(GraphError::DuplicatePhase { .. })
        ));
    }

    #[test]
    fn test_context_values() {
        let mut context = BTreeMap::new();
        context.insert("build.jobs".to_string(), toml::Value::Integer(4));
        context.insert(
            "gcc.warnings".to_string(),
            toml::Value::Array(vec![toml::Value::String("all".to_string())]),
        );
        let entries = context_entries(&context).unwrap();
        assert_eq!(
            entries,
            vec![
                ("build.jobs".to_string(), Value::Int(4)),
                ("gcc.warnings".to_string(), Value::List(vec!["all".to_string()])),
            ]
        );

        let err = toml_to_value("build.ratio", &toml::Value::Float(0.5)).unwrap_err();
        assert!(matches!(err, ManifestError::UnsupportedValue { .. }));
    }

    #[test]
    fn test_context_key_without_namespace() {
        let temp = TempDir::new().unwrap();
        let manifest =
            Manifest::from_toml("[project]\nname = \"x\"\n[context]\nverbose = true\n").unwrap();

        let ctx = new_context();
        let _guard = ctx.enter();
        let err = manifest.configure(temp.path()).unwrap_err();
        assert!(matches!(
            err,
            ShurikenError::Context(ContextError::IncorrectUse { .. })
        ));
    }

    #[test]
    fn test_load_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let err = Manifest::load(&Manifest::default_path(temp.path())).unwrap_err();
        assert!(matches!(
            err,
            ShurikenError::Manifest(ManifestError::NotFound { .. })
        ));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let manifest = Manifest::from_toml(HELLO).unwrap();
        let reparsed = Manifest::from_toml(&manifest.to_toml().unwrap()).unwrap();
        assert_eq!(reparsed, manifest);
    }
}
