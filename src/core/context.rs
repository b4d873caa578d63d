//! Hierarchical configuration context
//!
//! A [`Context`] is a set of namespaces (`ninja`, `paths`, `gcc`, ...) holding
//! key/value attributes. Contexts chain to a parent: a read that misses locally
//! is answered by the parent's namespace of the same name, recursively up to
//! the root.
//!
//! Each thread keeps its own stack of active contexts. Entering a context
//! pushes it and returns a [`ContextGuard`] that pops it again when dropped,
//! so every component can read its settings through [`current_context`]
//! without the caller threading them through.
//!
//! ```
//! use shuriken::core::context::{current_context, new_context};
//!
//! let root = new_context();
//! let _root = root.enter();
//! root.set("ninja.file_columns", 80).unwrap();
//!
//! let child = new_context();
//! let _child = child.enter();
//! child.set("ninja.file_columns", 120).unwrap();
//!
//! let ctx = current_context().unwrap();
//! assert_eq!(ctx.get("ninja.file_columns", 100_i64), 120);
//! assert_eq!(ctx.get("ninja.command", "ninja".to_string()), "ninja");
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::ContextError;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Arc<Context>>> = const { RefCell::new(Vec::new()) };
}

/// A configuration value
#[derive(Debug, Clone)]
pub enum Value {
    /// Boolean flag
    Bool(bool),
    /// Integer
    Int(i64),
    /// String (also used for paths)
    Str(String),
    /// List of strings
    List(Vec<String>),
    /// Shared phase results collector
    Results(PhaseResults),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Results(a), Value::Results(b)) => Arc::ptr_eq(&a.inner, &b.inner),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
            Value::Results(results) => write!(f, "<{} phase results>", results.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&Path> for Value {
    fn from(value: &Path) -> Self {
        Value::Str(value.display().to_string())
    }
}

impl From<PathBuf> for Value {
    fn from(value: PathBuf) -> Self {
        Value::Str(value.display().to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

impl From<PhaseResults> for Value {
    fn from(value: PhaseResults) -> Self {
        Value::Results(value)
    }
}

/// Conversion out of a [`Value`] for typed reads
pub trait FromValue: Sized {
    /// Convert, or `None` if the value has a different type
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for usize {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => usize::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for PathBuf {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(PathBuf::from(s)),
            _ => None,
        }
    }
}

impl FromValue for Vec<String> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl FromValue for PhaseResults {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Results(results) => Some(results.clone()),
            _ => None,
        }
    }
}

/// Outputs produced per phase, shared with whoever orchestrates the build.
///
/// Stored in the context under `build._phase_results`. The Ninja generator
/// appends every output it computes; cleaning marks the project as cleaned.
#[derive(Debug, Clone, Default)]
pub struct PhaseResults {
    inner: Arc<Mutex<ResultsInner>>,
}

#[derive(Debug, Default)]
struct ResultsInner {
    phases: BTreeMap<String, Vec<String>>,
    cleaned: BTreeSet<String>,
}

impl PhaseResults {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a phase has an entry, even if it produces nothing
    pub fn touch(&self, phase: &str) {
        self.inner.lock().phases.entry(phase.to_string()).or_default();
    }

    /// Record one output of a phase
    pub fn record(&self, phase: &str, output: &str) {
        self.inner
            .lock()
            .phases
            .entry(phase.to_string())
            .or_default()
            .push(output.to_string());
    }

    /// Outputs recorded for a phase
    pub fn outputs(&self, phase: &str) -> Option<Vec<String>> {
        self.inner.lock().phases.get(phase).cloned()
    }

    /// Snapshot of all recorded phases
    pub fn all(&self) -> BTreeMap<String, Vec<String>> {
        self.inner.lock().phases.clone()
    }

    /// Mark a project as cleaned
    pub fn mark_cleaned(&self, project: &str) {
        self.inner.lock().cleaned.insert(project.to_string());
    }

    /// Whether a project was cleaned
    pub fn is_cleaned(&self, project: &str) -> bool {
        self.inner.lock().cleaned.contains(project)
    }

    /// Number of phases with recorded results
    pub fn len(&self) -> usize {
        self.inner.lock().phases.len()
    }

    /// Whether no phase has recorded results
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type NamespaceMap = BTreeMap<String, BTreeMap<String, Value>>;

/// A node in the configuration chain
#[derive(Debug, Default)]
pub struct Context {
    parent: Option<Arc<Context>>,
    immutable: bool,
    namespaces: RwLock<NamespaceMap>,
}

impl Context {
    /// Create a mutable root context
    pub fn new() -> Arc<Self> {
        Self::with_parent(None, false)
    }

    /// Create a context chained to `parent`
    pub fn with_parent(parent: Option<Arc<Context>>, immutable: bool) -> Arc<Self> {
        Arc::new(Self {
            parent,
            immutable,
            namespaces: RwLock::new(BTreeMap::new()),
        })
    }

    /// Parent context, if any
    pub fn parent(&self) -> Option<&Arc<Context>> {
        self.parent.as_ref()
    }

    /// Whether writes are rejected
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// View of one namespace
    pub fn namespace(&self, name: &str) -> Namespace<'_> {
        Namespace {
            context: self,
            name: name.to_string(),
        }
    }

    /// Strict read of a dotted `namespace.key` name
    pub fn lookup(&self, name: &str) -> Result<Value, ContextError> {
        let (namespace, key) = split_name(name)?;
        self.namespace(namespace).get(key)
    }

    /// Strict typed read
    pub fn require<T: FromValue>(&self, name: &str) -> Result<T, ContextError> {
        let value = self.lookup(name)?;
        T::from_value(&value).ok_or_else(|| ContextError::WrongType {
            name: name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
        })
    }

    /// Typed read returning `None` when undefined or of another type
    pub fn get_opt<T: FromValue>(&self, name: &str) -> Option<T> {
        self.lookup(name).ok().and_then(|v| T::from_value(&v))
    }

    /// Typed read returning `default` on any failure
    pub fn get<T: FromValue>(&self, name: &str, default: T) -> T {
        self.get_opt(name).unwrap_or(default)
    }

    /// `value` if set, otherwise the same as [`Context::get`]
    pub fn fallback<T: FromValue>(&self, value: Option<T>, name: &str, default: T) -> T {
        match value {
            Some(v) => v,
            None => self.get(name, default),
        }
    }

    /// Write a dotted `namespace.key` attribute on this context
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), ContextError> {
        let (namespace, key) = split_name(name)?;
        self.namespace(namespace).set(key, value)
    }

    /// Write only when `value` is `Some`; `None` leaves the attribute untouched
    pub fn set_opt<V: Into<Value>>(&self, name: &str, value: Option<V>) -> Result<(), ContextError> {
        match value {
            Some(v) => self.set(name, v),
            None => {
                split_name(name)?;
                Ok(())
            }
        }
    }

    /// Push this context on the current thread's stack
    pub fn enter(self: &Arc<Self>) -> ContextGuard {
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(Arc::clone(self)));
        ContextGuard {
            context: Arc::clone(self),
            _not_send: PhantomData,
        }
    }

    /// All attributes of the chain, parent first so children shadow
    pub fn flatten(&self) -> BTreeMap<(String, String), Value> {
        let mut all = match &self.parent {
            Some(parent) => parent.flatten(),
            None => BTreeMap::new(),
        };
        for (namespace, attributes) in self.namespaces.read().iter() {
            for (key, value) in attributes {
                all.insert((namespace.clone(), key.clone()), value.clone());
            }
        }
        all
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ((namespace, key), value) in self.flatten() {
            if namespace.starts_with('_') || key.starts_with('_') {
                continue;
            }
            writeln!(f, "{namespace}.{key}={value}")?;
        }
        Ok(())
    }
}

fn split_name(name: &str) -> Result<(&str, &str), ContextError> {
    match name.split_once('.') {
        Some((namespace, key)) if !namespace.is_empty() && !key.is_empty() => {
            Ok((namespace, key))
        }
        _ => Err(ContextError::IncorrectUse {
            name: name.to_string(),
        }),
    }
}

/// Named attribute group of one context
#[derive(Debug)]
pub struct Namespace<'a> {
    context: &'a Context,
    name: String,
}

impl Namespace<'_> {
    /// Namespace name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read a key, delegating to the parent chain when not set here
    pub fn get(&self, key: &str) -> Result<Value, ContextError> {
        if let Some(value) = self
            .context
            .namespaces
            .read()
            .get(&self.name)
            .and_then(|attributes| attributes.get(key))
        {
            return Ok(value.clone());
        }
        match &self.context.parent {
            Some(parent) => parent.namespace(&self.name).get(key),
            None => Err(ContextError::NotInContext {
                name: format!("{}.{key}", self.name),
            }),
        }
    }

    /// Typed read with a default
    pub fn get_or<T: FromValue>(&self, key: &str, default: T) -> T {
        self.get(key)
            .ok()
            .and_then(|v| T::from_value(&v))
            .unwrap_or(default)
    }

    /// Write a key on this namespace's own context
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), ContextError> {
        if self.context.immutable {
            return Err(ContextError::ImmutableContext {
                name: format!("{}.{key}", self.name),
            });
        }
        self.context
            .namespaces
            .write()
            .entry(self.name.clone())
            .or_default()
            .insert(key.to_string(), value.into());
        Ok(())
    }

    /// Merged attributes visible through this namespace
    pub fn all(&self) -> BTreeMap<String, Value> {
        let mut all = match &self.context.parent {
            Some(parent) => parent.namespace(&self.name).all(),
            None => BTreeMap::new(),
        };
        if let Some(attributes) = self.context.namespaces.read().get(&self.name) {
            for (key, value) in attributes {
                all.insert(key.clone(), value.clone());
            }
        }
        all
    }
}

/// Keeps a context active on the current thread; pops it on drop
#[derive(Debug)]
pub struct ContextGuard {
    context: Arc<Context>,
    // The stack is thread-local, so the guard must be dropped on the same thread.
    _not_send: PhantomData<*const ()>,
}

impl ContextGuard {
    /// The guarded context
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }
}

impl Deref for ContextGuard {
    type Target = Context;

    fn deref(&self) -> &Context {
        &self.context
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack
                .iter()
                .rposition(|ctx| Arc::ptr_eq(ctx, &self.context))
            {
                stack.remove(pos);
            }
        });
    }
}

fn peek() -> Option<Arc<Context>> {
    CONTEXT_STACK.with(|stack| stack.borrow().last().cloned())
}

/// Number of contexts active on this thread
pub fn depth() -> usize {
    CONTEXT_STACK.with(|stack| stack.borrow().len())
}

/// Create a new mutable context, chained to the active one if there is any
pub fn new_context() -> Arc<Context> {
    Context::with_parent(peek(), false)
}

/// Immutable view of the active context
pub fn current_context() -> Result<Arc<Context>, ContextError> {
    peek()
        .map(|top| Context::with_parent(Some(top), true))
        .ok_or(ContextError::NoContext)
}

/// The active context itself, for writing
pub fn current_context_mut() -> Result<Arc<Context>, ContextError> {
    peek().ok_or(ContextError::NoContext)
}

/// Run `f` with `context` active
pub fn with_context<R>(context: &Arc<Context>, f: impl FnOnce(&Context) -> R) -> R {
    let guard = context.enter();
    f(&guard)
}
