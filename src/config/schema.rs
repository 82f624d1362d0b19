//! Run configuration schema.
//!
//! All types derive Serde traits so the assembled configuration can be
//! logged and handed to runtimes as structured data.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::tls::TlsConfig;

/// HTTP protocol version a binding is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HttpVersion {
    Http1,
    Http3,
}

impl HttpVersion {
    /// Map the command-line number (`1` or `3`) to a version.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Http1),
            3 => Some(Self::Http3),
            _ => None,
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpVersion::Http1 => write!(f, "HTTP/1.1"),
            HttpVersion::Http3 => write!(f, "HTTP/3"),
        }
    }
}

/// Final configuration handed to the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Host address to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Unix socket path; takes the place of host/port when set.
    pub unix: Option<PathBuf>,

    /// Resolved TLS configuration.
    pub ssl: TlsConfig,

    /// Number of worker processes.
    pub workers: usize,

    pub single_process: bool,
    pub legacy: bool,

    /// Restart on source changes.
    pub auto_reload: bool,

    /// Debug plus auto-reload.
    pub dev: bool,

    /// Extra directories watched when auto-reload is on.
    pub reload_dirs: Vec<PathBuf>,

    /// Logging noise, 0 by default.
    pub verbosity: u8,

    /// `None` leaves the decision to the runtime.
    pub access_log: Option<bool>,

    pub debug: bool,
    pub fast: bool,
    pub noisy_exceptions: bool,

    /// Show the startup display.
    pub motd: bool,

    /// Generate a local development certificate.
    pub auto_tls: bool,

    /// Protocol versions to prepare bindings for, newest first.
    pub http_versions: Vec<HttpVersion>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            unix: None,
            ssl: TlsConfig::None,
            workers: 1,
            single_process: false,
            legacy: false,
            auto_reload: false,
            dev: false,
            reload_dirs: Vec::new(),
            verbosity: 0,
            access_log: None,
            debug: false,
            fast: false,
            noisy_exceptions: false,
            motd: true,
            auto_tls: false,
            http_versions: vec![HttpVersion::Http1],
        }
    }
}

impl RunConfig {
    /// `host:port`, with IPv6 hosts bracketed.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Scheme the bindings will be reachable under.
    pub fn scheme(&self) -> &'static str {
        if self.ssl.is_enabled() || self.auto_tls {
            "https"
        } else {
            "http"
        }
    }
}
