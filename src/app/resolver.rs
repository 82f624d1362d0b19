//! Application target resolution.
//!
//! # Responsibilities
//! - Make the working directory importable
//! - Delegate `--simple` targets to the static-server constructor
//! - Import the target module and fetch the attribute
//! - Call factories, retrying without arguments on an arity mismatch only
//! - Classify the result and explain every failure precisely

use std::path::{Path, PathBuf};

use crate::app::application::Application;
use crate::app::loader::{AppFactory, FactoryError, ImportError, Loader, Object};
use crate::app::target::{AppTarget, TargetError};
use crate::args::ParsedArgs;

/// Builds an application serving a directory of static files.
pub trait SimpleServer {
    fn build(&self, root: &Path) -> std::io::Result<Application>;
}

/// Inputs of one resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub target: &'a str,
    pub factory: bool,
    pub simple: bool,
    pub cwd: &'a Path,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(
        "No module named {name} found.\n  Example Module: project.server:app\n  Example Factory: project.server:create_app()"
    )]
    NotFound { name: String },

    /// An import failure inside the target module itself.
    #[error(transparent)]
    Import(ImportError),

    #[error(
        "Module is not a Sanic app, it is a {kind}\n  If this callable returns a Sanic instance try: \nsanic {target} --factory"
    )]
    Callable { kind: String, target: String },

    #[error("Module is not a Sanic app, it is a {kind}\n  Perhaps you meant {target}:app?")]
    WrongShape { kind: String, target: String },

    #[error("{target} is a {kind}, not a factory")]
    NotCallable { kind: String, target: String },

    #[error("factory {target} failed")]
    Factory {
        target: String,
        #[source]
        source: FactoryError,
    },

    #[error("failed to build a simple server for {}", .path.display())]
    SimpleServer {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Turns target strings into applications.
pub struct AppResolver {
    loader: Box<dyn Loader>,
    simple_server: Box<dyn SimpleServer>,
}

impl AppResolver {
    pub fn new(loader: impl Loader + 'static, simple_server: impl SimpleServer + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            simple_server: Box::new(simple_server),
        }
    }

    pub fn with_simple_server(mut self, simple_server: impl SimpleServer + 'static) -> Self {
        self.simple_server = Box::new(simple_server);
        self
    }

    /// Resolve `request` into an application.
    pub fn resolve(
        &mut self,
        request: &ResolveRequest<'_>,
        args: &ParsedArgs,
    ) -> Result<Application, ResolveError> {
        self.loader.ensure_search_path(request.cwd);

        if request.simple {
            let root = request.cwd.join(request.target);
            tracing::info!(root = %root.display(), "Starting simple server");
            return self
                .simple_server
                .build(&root)
                .map_err(|source| ResolveError::SimpleServer { path: root, source });
        }

        let target = AppTarget::parse(request.target, request.cwd)?;
        let factory = request.factory || target.factory;

        let module = self
            .loader
            .import(&target.module)
            .map_err(|error| classify_import_error(&target.module, error))?;
        let mut object = module.get(&target.attribute);

        if factory {
            object = Some(match object {
                Some(Object::Callable(callable)) => {
                    call_factory(callable.as_ref(), args).map_err(|source| ResolveError::Factory {
                        target: request.target.to_string(),
                        source,
                    })?
                }
                other => {
                    return Err(ResolveError::NotCallable {
                        kind: kind_of(other.as_ref()).to_string(),
                        target: request.target.to_string(),
                    })
                }
            });
        }

        match object {
            Some(Object::App(app)) => {
                tracing::debug!(app = %app.name(), target = %request.target, "Application resolved");
                Ok(app)
            }
            Some(Object::Callable(_)) => Err(ResolveError::Callable {
                kind: "function".to_string(),
                target: request.target.to_string(),
            }),
            other => Err(ResolveError::WrongShape {
                kind: kind_of(other.as_ref()).to_string(),
                target: request.target.to_string(),
            }),
        }
    }
}

/// Call with the parsed arguments first, then with none on an arity mismatch.
fn call_factory(factory: &dyn AppFactory, args: &ParsedArgs) -> Result<Object, FactoryError> {
    match factory.call(Some(args)) {
        Err(FactoryError::Arity { .. }) => factory.call(None),
        result => result,
    }
}

/// An import error naming the target (or one of its parents) means the
/// target does not exist; anything else is a failure inside user code.
fn classify_import_error(module: &str, error: ImportError) -> ResolveError {
    if module.starts_with(&error.name) {
        ResolveError::NotFound { name: error.name }
    } else {
        ResolveError::Import(error)
    }
}

fn kind_of(object: Option<&Object>) -> &str {
    object.map_or("none", Object::kind)
}
