//! Bundled runtime collaborators.
//!
//! # Data Flow
//! ```text
//! Application + bindings
//!     → server.rs (tokio runtime per serve mode, one task per binding)
//!     → tls.rs (PEM validation, rustls config)
//!     → axum::serve / axum-server (TCP, unix socket, or TLS)
//!
//! --simple DIR   → simple.rs (ServeDir router wrapped in an Application)
//! --inspect      → inspector.rs (HTTP query against a running instance)
//! ```
//!
//! # Design Decisions
//! - The launcher only talks to these through the Runtime, Inspector and
//!   SimpleServer traits; embedders can swap any of them
//! - HTTP/3 bindings and file watching are reported, not implemented

pub mod inspector;
pub mod server;
pub mod simple;
pub mod tls;

pub use inspector::HttpInspector;
pub use server::HttpRuntime;
pub use simple::StaticDirServer;
