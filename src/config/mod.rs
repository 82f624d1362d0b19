//! Run configuration subsystem.
//!
//! # Data Flow
//! ```text
//! ParsedArgs
//!     → tls.rs (precheck, then collapse TLS flags into one TlsConfig)
//!     → assembler.rs (field mapping → group prepare → derived reload rules)
//!     → RunConfig (immutable once handed to the dispatcher)
//! ```
//!
//! # Design Decisions
//! - RunConfig is built once per run and never mutated after dispatch
//! - TLS merging is a pure function over the four TLS inputs
//! - An explicit reload directory always forces auto-reload on

pub mod assembler;
pub mod schema;
pub mod tls;

pub use assembler::assemble;
pub use schema::{HttpVersion, RunConfig};
pub use tls::{CertKey, TlsConfig, TlsEntry, TlsError, TlsSource};
