//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing macros with structured fields
//!     → logging.rs (registry + reloadable EnvFilter + fmt layer)
//!
//! The CLI adjusts the filter after parsing:
//!     → -v / --debug raise verbosity
//!     → --inspect / --inspect-raw keep errors only
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` always wins over command-line verbosity
//! - The filter is swapped in place, the subscriber is installed once

pub mod logging;

pub use logging::LogControl;
