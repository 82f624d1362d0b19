//! Application handle.

use std::fmt;

use axum::Router;
use serde::{Deserialize, Serialize};

use crate::config::schema::{HttpVersion, RunConfig};

/// Per-application settings consulted by the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Host the running instance's inspector listens on.
    pub inspector_host: String,

    /// Port the running instance's inspector listens on.
    pub inspector_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            inspector_host: "localhost".to_string(),
            inspector_port: 6457,
        }
    }
}

/// One prepared binding: a protocol version and the configuration it serves with.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub version: HttpVersion,
    pub config: RunConfig,
}

/// A servable application: a name, its settings and its router.
#[derive(Clone)]
pub struct Application {
    name: String,
    config: AppConfig,
    router: Router,
    bindings: Vec<Binding>,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: AppConfig::default(),
            router: Router::new(),
            bindings: Vec::new(),
        }
    }

    pub fn with_router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Bindings prepared so far, in preparation order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Record a binding for `version` served with `config`.
    pub fn prepare(&mut self, config: &RunConfig, version: HttpVersion) {
        tracing::debug!(
            app = %self.name,
            version = %version,
            address = %config.bind_address(),
            "Binding prepared"
        );
        self.bindings.push(Binding {
            version,
            config: config.clone(),
        });
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}
