//! Build description: projects and their phases
//!
//! A [`Project`] owns an ordered set of named [`Phase`]s. Phases are only
//! added through [`Project::add_phase`], which hands back a [`PhaseId`] so
//! other phases can depend on it without a name lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::context::{current_context, Context};
use crate::core::executor::{Escape, Executor, Extension};
use crate::core::platform;
use crate::error::{GraphError, ToolError};

static NEXT_PROJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle of a phase registered with a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhaseId {
    project: u64,
    index: usize,
}

/// Reference from one phase to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseRef {
    /// By registration handle
    Id(PhaseId),
    /// By name
    Name(String),
}

impl From<PhaseId> for PhaseRef {
    fn from(id: PhaseId) -> Self {
        PhaseRef::Id(id)
    }
}

impl From<&str> for PhaseRef {
    fn from(name: &str) -> Self {
        PhaseRef::Name(name.to_string())
    }
}

impl From<String> for PhaseRef {
    fn from(name: String) -> Self {
        PhaseRef::Name(name)
    }
}

/// A unit of build work
#[derive(Debug)]
pub struct Phase {
    /// Input paths
    pub inputs: Vec<String>,
    /// Phases whose outputs are appended to the inputs
    pub inputs_from: Vec<PhaseRef>,
    /// Runs the phase
    pub executor: Box<dyn Executor>,
    /// Single explicit output; fan-out when `None`
    pub output: Option<String>,
    /// Human description, defaults to `"<phase> $out"`
    pub description: Option<String>,
    /// Command-line contributors
    pub extensions: Vec<Box<dyn Extension>>,
}

impl Phase {
    /// Create a phase run by `executor`
    pub fn new(executor: impl Executor + 'static) -> Self {
        Self {
            inputs: Vec::new(),
            inputs_from: Vec::new(),
            executor: Box::new(executor),
            output: None,
            description: None,
            extensions: Vec::new(),
        }
    }

    /// Set the input paths
    #[must_use]
    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    /// Take the outputs of another phase as inputs
    #[must_use]
    pub fn with_inputs_from(mut self, phase: impl Into<PhaseRef>) -> Self {
        self.inputs_from.push(phase.into());
        self
    }

    /// Produce a single output
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an extension
    #[must_use]
    pub fn with_extension(mut self, extension: impl Extension + 'static) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Render the executor's command with this phase's extensions applied
    pub fn command_as_str(&self, escape: Escape<'_>) -> Result<String, ToolError> {
        self.executor.render_command(&self.extensions, escape)
    }
}

/// Picks the variant for a project from the active context
pub type VariantSelector = Box<dyn Fn(&Context) -> String>;

/// An interrelated set of build phases
pub struct Project {
    id: u64,
    name: String,
    version: Option<String>,
    file_name: Option<String>,
    variant: Option<VariantSelector>,
    phases: Vec<(String, Phase)>,
    index: HashMap<String, usize>,
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("file_name", &self.file_name)
            .field("phases", &self.phases)
            .finish_non_exhaustive()
    }
}

impl Project {
    /// Create an empty project
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_PROJECT_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            version: None,
            file_name: None,
            variant: None,
            phases: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Set the version
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Override the generated file name (`<file_name>.ninja`)
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Choose the variant with a function of the active context
    #[must_use]
    pub fn with_variant(mut self, selector: impl Fn(&Context) -> String + 'static) -> Self {
        self.variant = Some(Box::new(selector));
        self
    }

    /// Project name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Project version
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// File name override
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Register a phase under a unique name
    pub fn add_phase(&mut self, name: impl Into<String>, phase: Phase) -> Result<PhaseId, GraphError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(GraphError::DuplicatePhase {
                project: self.name.clone(),
                name,
            });
        }
        if phase
            .inputs_from
            .iter()
            .any(|r| matches!(r, PhaseRef::Name(dep) if *dep == name))
        {
            return Err(GraphError::SelfReference { phase: name });
        }
        let index = self.phases.len();
        self.index.insert(name.clone(), index);
        self.phases.push((name, phase));
        Ok(PhaseId {
            project: self.id,
            index,
        })
    }

    /// Phase by name
    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.index.get(name).map(|&i| &self.phases[i].1)
    }

    /// Mutable phase by name
    pub fn phase_mut(&mut self, name: &str) -> Option<&mut Phase> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.phases[i].1),
            None => None,
        }
    }

    /// Handle of a phase by name
    pub fn phase_id(&self, name: &str) -> Option<PhaseId> {
        self.index.get(name).map(|&index| PhaseId {
            project: self.id,
            index,
        })
    }

    /// Name of a phase by handle
    pub fn phase_name(&self, id: PhaseId) -> Option<&str> {
        if id.project != self.id {
            return None;
        }
        self.phases.get(id.index).map(|(name, _)| name.as_str())
    }

    /// Phases in registration order
    pub fn phases(&self) -> impl Iterator<Item = (&str, &Phase)> {
        self.phases.iter().map(|(name, phase)| (name.as_str(), phase))
    }

    /// Number of phases
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Whether there are no phases
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Resolve a dependency of `phase` to the depended-on phase's name
    pub fn resolve_ref<'a>(&'a self, phase: &str, reference: &'a PhaseRef) -> Result<&'a str, GraphError> {
        let name = match reference {
            PhaseRef::Id(id) => self.phase_name(*id).ok_or_else(|| GraphError::ForeignPhase {
                phase: phase.to_string(),
            })?,
            PhaseRef::Name(name) => {
                if !self.index.contains_key(name) {
                    return Err(GraphError::UnknownPhase {
                        phase: phase.to_string(),
                        dependency: name.clone(),
                    });
                }
                name.as_str()
            }
        };
        if name == phase {
            return Err(GraphError::SelfReference {
                phase: phase.to_string(),
            });
        }
        Ok(name)
    }

    /// Check every dependency reference
    pub fn validate(&self) -> Result<(), GraphError> {
        for (name, phase) in self.phases() {
            for reference in &phase.inputs_from {
                self.resolve_ref(name, reference)?;
            }
        }
        Ok(())
    }

    /// Variant chosen in the active context
    pub fn variant(&self) -> String {
        let ctx = current_context().unwrap_or_else(|_| Context::new());
        match &self.variant {
            Some(selector) => selector(&ctx),
            None => ctx.get("projects.default_variant", platform::host_platform()),
        }
    }

    /// Whether the variant targets Windows
    pub fn is_windows(&self) -> bool {
        platform::is_windows(&self.variant())
    }

    /// Whether the variant targets Linux
    pub fn is_linux(&self) -> bool {
        platform::is_linux(&self.variant())
    }

    /// Executable extension for the variant
    pub fn executable_extension(&self) -> Option<&'static str> {
        platform::executable_extension(&self.variant())
    }

    /// Shared library extension for the variant
    pub fn shared_library_extension(&self) -> &'static str {
        platform::shared_library_extension(&self.variant())
    }

    /// Shared library prefix for the variant
    pub fn shared_library_prefix(&self) -> &'static str {
        platform::shared_library_prefix(&self.variant())
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = self.variant();
        match (&self.version, variant.is_empty()) {
            (Some(version), false) => write!(f, "{} {version} ({variant})", self.name),
            (Some(version), true) => write!(f, "{} {version}", self.name),
            (None, false) => write!(f, "{} ({variant})", self.name),
            (None, true) => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::new_context;
    use crate::infra::copy::CopyFiles;

    #[test]
    fn test_add_phase_returns_handles() {
        let mut project = Project::new("demo");
        let compile = project.add_phase("compile", Phase::new(CopyFiles::new())).unwrap();
        let link = project.add_phase("link", Phase::new(CopyFiles::new())).unwrap();

        assert_eq!(project.phase_name(compile), Some("compile"));
        assert_eq!(project.phase_name(link), Some("link"));
        assert_eq!(project.phase_id("link"), Some(link));
        assert_eq!(project.len(), 2);
    }

    #[test]
    fn test_duplicate_phase_rejected() {
        let mut project = Project::new("demo");
        project.add_phase("copy", Phase::new(CopyFiles::new())).unwrap();
        let err = project
            .add_phase("copy", Phase::new(CopyFiles::new()))
            .unwrap_err();

        assert_eq!(
            err,
            GraphError::DuplicatePhase {
                project: "demo".to_string(),
                name: "copy".to_string()
            }
        );
    }

    #[test]
    fn test_self_reference_by_name_rejected_on_add() {
        let mut project = Project::new("demo");
        let err = project
            .add_phase("copy", Phase::new(CopyFiles::new()).with_inputs_from("copy"))
            .unwrap_err();

        assert!(matches!(err, GraphError::SelfReference { .. }));
    }

    #[test]
    fn test_self_reference_by_id_rejected_on_validate() {
        let mut project = Project::new("demo");
        let id = project.add_phase("copy", Phase::new(CopyFiles::new())).unwrap();
        project.phase_mut("copy").unwrap().inputs_from.push(id.into());

        assert!(matches!(
            project.validate(),
            Err(GraphError::SelfReference { .. })
        ));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let mut project = Project::new("demo");
        project
            .add_phase("link", Phase::new(CopyFiles::new()).with_inputs_from("compile"))
            .unwrap();

        assert_eq!(
            project.validate(),
            Err(GraphError::UnknownPhase {
                phase: "link".to_string(),
                dependency: "compile".to_string()
            })
        );
    }

    #[test]
    fn test_foreign_phase_rejected() {
        let mut other = Project::new("other");
        let foreign = other.add_phase("compile", Phase::new(CopyFiles::new())).unwrap();

        let mut project = Project::new("demo");
        project
            .add_phase("link", Phase::new(CopyFiles::new()).with_inputs_from(foreign))
            .unwrap();

        assert!(matches!(
            project.validate(),
            Err(GraphError::ForeignPhase { .. })
        ));
    }

    #[test]
    fn test_variant_from_context() {
        let ctx = new_context();
        let _guard = ctx.enter();
        ctx.set("projects.default_variant", "win64").unwrap();

        let project = Project::new("demo").with_version("1.0");
        assert_eq!(project.variant(), "win64");
        assert_eq!(project.executable_extension(), Some("exe"));
        assert_eq!(project.to_string(), "demo 1.0 (win64)");
    }

    #[test]
    fn test_variant_selector() {
        let ctx = new_context();
        let _guard = ctx.enter();
        ctx.set("build.debug", true).unwrap();

        let project = Project::new("demo").with_variant(|ctx| {
            if ctx.get("build.debug", false) {
                "linux64-debug".to_string()
            } else {
                "linux64".to_string()
            }
        });
        assert_eq!(project.to_string(), "demo (linux64-debug)");
    }
}
