//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! parsed → (precheck fails)                        → aborted
//! parsed → InspectOnly → Inspector::inspect         → inspected
//! parsed → assemble RunConfig → prepare per version
//!        → SingleProcess | Legacy | ClusterDefault  → served
//! ```
//!
//! # Design Decisions
//! - Exactly one serve mode per run; single-process is checked before legacy
//! - Inspect mode never assembles a RunConfig and never binds a socket
//! - Runtimes stop on a broadcast shutdown signal

pub mod dispatch;
pub mod shutdown;

pub use dispatch::{Dispatcher, InspectRequest, Inspector, Outcome, Runtime, RuntimeError, ServeMode};
pub use shutdown::Shutdown;
