//! Application target subsystem.
//!
//! # Data Flow
//! ```text
//! target string + --factory/--simple + working directory
//!     → resolver.rs (search path, simple-server delegation)
//!     → target.rs (split module/attribute, `()` factory sugar, directory guard)
//!     → loader.rs (import module, fetch attribute)
//!     → resolver.rs (factory call with arity fallback, shape classification)
//!     → Application (handle the dispatcher prepares and serves)
//! ```
//!
//! # Design Decisions
//! - Modules are registered explicitly with a loader; nothing is discovered
//! - Classification is two-step: application, else callable, else other
//! - Factories are retried without arguments only on an arity mismatch

pub mod application;
pub mod loader;
pub mod resolver;
pub mod target;

pub use application::{AppConfig, Application, Binding};
pub use loader::{AppFactory, FactoryError, ImportError, Loader, Module, ModuleRegistry, Object};
pub use resolver::{AppResolver, ResolveError, ResolveRequest, SimpleServer};
pub use target::{AppTarget, TargetError};
