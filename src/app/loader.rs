//! Module loading.
//!
//! # Responsibilities
//! - Look up modules by dotted path, parent packages first
//! - Hand out module attributes as `Object`s
//! - Report the first missing path segment as an `ImportError`
//!
//! # Design Decisions
//! - `ModuleRegistry` is the default `Loader`: embedding programs register
//!   their modules up front instead of relying on runtime discovery
//! - Registering `a.b.c` registers the empty packages `a` and `a.b`
//! - A module can be registered as broken to model an import failure raised
//!   from inside user code

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app::application::Application;
use crate::args::ParsedArgs;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A module, or a module's dependency, could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No module named '{name}'")]
pub struct ImportError {
    /// Dotted name of the module that was not found.
    pub name: String,
}

impl ImportError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Failure raised by a factory.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("factory takes {expected} argument(s) but {given} were given")]
    Arity { expected: usize, given: usize },
    #[error("{0}")]
    Failed(#[source] BoxError),
}

/// A callable producing an application.
///
/// `call` receives `Some(args)` for the one-argument form and `None` for the
/// zero-argument form. Implementations report the form they do not accept
/// with `FactoryError::Arity`.
pub trait AppFactory: Send + Sync {
    fn call(&self, args: Option<&ParsedArgs>) -> Result<Object, FactoryError>;
}

/// A factory taking the parsed arguments.
pub struct ArgsFactory<F>(pub F);

impl<F> AppFactory for ArgsFactory<F>
where
    F: Fn(&ParsedArgs) -> Result<Object, BoxError> + Send + Sync,
{
    fn call(&self, args: Option<&ParsedArgs>) -> Result<Object, FactoryError> {
        match args {
            Some(args) => (self.0)(args).map_err(FactoryError::Failed),
            None => Err(FactoryError::Arity {
                expected: 1,
                given: 0,
            }),
        }
    }
}

/// A factory taking no arguments.
pub struct NullaryFactory<F>(pub F);

impl<F> AppFactory for NullaryFactory<F>
where
    F: Fn() -> Result<Object, BoxError> + Send + Sync,
{
    fn call(&self, args: Option<&ParsedArgs>) -> Result<Object, FactoryError> {
        match args {
            Some(_) => Err(FactoryError::Arity {
                expected: 0,
                given: 1,
            }),
            None => (self.0)().map_err(FactoryError::Failed),
        }
    }
}

/// A module attribute.
#[derive(Clone)]
pub enum Object {
    App(Application),
    Callable(Arc<dyn AppFactory>),
    /// Any other value, described by its kind name.
    Value(String),
}

impl Object {
    /// Wrap a factory that takes the parsed arguments.
    pub fn args_factory<F>(factory: F) -> Self
    where
        F: Fn(&ParsedArgs) -> Result<Object, BoxError> + Send + Sync + 'static,
    {
        Object::Callable(Arc::new(ArgsFactory(factory)))
    }

    /// Wrap a factory that takes no arguments.
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Object, BoxError> + Send + Sync + 'static,
    {
        Object::Callable(Arc::new(NullaryFactory(factory)))
    }

    pub fn value(kind: impl Into<String>) -> Self {
        Object::Value(kind.into())
    }

    /// Kind name used in diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            Object::App(_) => "Sanic",
            Object::Callable(_) => "function",
            Object::Value(kind) => kind,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::App(app) => f.debug_tuple("App").field(&app.name()).finish(),
            Object::Callable(_) => f.write_str("Callable"),
            Object::Value(kind) => f.debug_tuple("Value").field(kind).finish(),
        }
    }
}

/// A loaded module: a name and its attributes.
#[derive(Debug, Clone, Default)]
pub struct Module {
    name: String,
    attributes: BTreeMap<String, Object>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add or replace an attribute.
    pub fn with(mut self, attribute: impl Into<String>, object: Object) -> Self {
        self.attributes.insert(attribute.into(), object);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch an attribute; a missing attribute is `None`, not an error.
    pub fn get(&self, attribute: &str) -> Option<Object> {
        self.attributes.get(attribute).cloned()
    }
}

/// Source of importable modules.
pub trait Loader {
    /// Make `path` importable. Returns `true` when it was not already present.
    fn ensure_search_path(&mut self, path: &Path) -> bool;

    /// Import a module by dotted path.
    fn import(&self, module: &str) -> Result<Module, ImportError>;
}

#[derive(Debug, Clone)]
enum Entry {
    Loaded(Module),
    Broken(ImportError),
}

/// In-process module table.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, Entry>,
    search_paths: Vec<PathBuf>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module, creating empty parent packages as needed.
    pub fn register(&mut self, module: Module) -> &mut Self {
        self.register_parents(module.name());
        self.modules
            .insert(module.name().to_string(), Entry::Loaded(module));
        self
    }

    /// Register a module whose import fails with `error`.
    pub fn register_broken(&mut self, name: &str, error: ImportError) -> &mut Self {
        self.register_parents(name);
        self.modules.insert(name.to_string(), Entry::Broken(error));
        self
    }

    /// Directories made importable so far, in insertion order.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    fn register_parents(&mut self, name: &str) {
        let mut parent = String::new();
        let segments: Vec<&str> = name.split('.').collect();
        for segment in segments.iter().take(segments.len().saturating_sub(1)) {
            if !parent.is_empty() {
                parent.push('.');
            }
            parent.push_str(segment);
            self.modules
                .entry(parent.clone())
                .or_insert_with(|| Entry::Loaded(Module::new(parent.clone())));
        }
    }
}

impl Loader for ModuleRegistry {
    fn ensure_search_path(&mut self, path: &Path) -> bool {
        if self.search_paths.iter().any(|known| known == path) {
            return false;
        }
        tracing::debug!(path = %path.display(), "Search path added");
        self.search_paths.push(path.to_path_buf());
        true
    }

    fn import(&self, module: &str) -> Result<Module, ImportError> {
        let mut prefix = String::new();
        let mut found = None;
        for segment in module.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            match self.modules.get(&prefix) {
                Some(Entry::Loaded(loaded)) => found = Some(loaded),
                Some(Entry::Broken(error)) => return Err(error.clone()),
                None => return Err(ImportError::new(prefix)),
            }
        }
        found.cloned().ok_or_else(|| ImportError::new(module))
    }
}
