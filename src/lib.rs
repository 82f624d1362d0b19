//! Sanic application launcher.
//!
//! Resolves an application target and a set of command-line flags into one
//! run configuration, then serves it or queries a running instance.
//!
//! Module targets resolve only against modules an embedding program has
//! registered; the bundled `sanic` binary registers none and serves
//! `--simple` directories.
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use sanic_cli::app::{Application, Module, ModuleRegistry, Object};
//! use sanic_cli::cli::{Environment, SanicCli};
//!
//! let app = Application::new("hello")
//!     .with_router(Router::new().route("/", get(|| async { "Hello, world." })));
//! let mut modules = ModuleRegistry::new();
//! modules.register(Module::new("project.server").with("app", Object::App(app)));
//!
//! let environment = Environment::from_process().unwrap();
//! let code = SanicCli::new(modules, environment).main(std::env::args());
//! ```

pub mod app;
pub mod args;
pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod runtime;

pub use app::{Application, ModuleRegistry};
pub use cli::{CliError, Environment, SanicCli};
pub use config::RunConfig;
pub use lifecycle::{Outcome, ServeMode};
