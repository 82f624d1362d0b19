//! Shared fixtures for launcher integration tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use sanic_cli::app::{AppConfig, Application, ImportError, Module, ModuleRegistry, Object};
use sanic_cli::args::ParsedArgs;
use sanic_cli::lifecycle::{InspectRequest, Inspector, Runtime, RuntimeError};
use sanic_cli::{Environment, SanicCli};

/// What a recording runtime was asked to serve.
#[derive(Debug, Clone)]
pub struct Served {
    pub mode: &'static str,
    pub app: Application,
}

/// Runtime double that records instead of binding sockets.
#[derive(Clone, Default)]
pub struct RecordingRuntime {
    pub served: Arc<Mutex<Vec<Served>>>,
}

impl RecordingRuntime {
    fn record(&self, mode: &'static str, app: Application) -> Result<(), RuntimeError> {
        self.served.lock().unwrap().push(Served { mode, app });
        Ok(())
    }

    pub fn calls(&self) -> Vec<Served> {
        self.served.lock().unwrap().clone()
    }
}

impl Runtime for RecordingRuntime {
    fn serve(&self, app: Application) -> Result<(), RuntimeError> {
        self.record("cluster", app)
    }

    fn serve_single(&self, app: Application) -> Result<(), RuntimeError> {
        self.record("single", app)
    }

    fn serve_legacy(&self, app: Application) -> Result<(), RuntimeError> {
        self.record("legacy", app)
    }
}

/// Inspector double that records every request.
#[derive(Clone, Default)]
pub struct RecordingInspector {
    pub requests: Arc<Mutex<Vec<InspectRequest>>>,
}

impl RecordingInspector {
    pub fn calls(&self) -> Vec<InspectRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Inspector for RecordingInspector {
    fn inspect(&self, request: &InspectRequest) {
        self.requests.lock().unwrap().push(request.clone());
    }
}

/// Modules used across the integration tests.
pub fn modules() -> ModuleRegistry {
    let inspected = Application::new("inspected").with_config(AppConfig {
        inspector_host: "10.0.0.5".to_string(),
        inspector_port: 7000,
    });

    let mut registry = ModuleRegistry::new();
    registry
        .register(
            Module::new("project.server")
                .with("app", Object::App(Application::new("server")))
                .with("inspected", Object::App(inspected))
                .with(
                    "create_app",
                    Object::args_factory(|args: &ParsedArgs| {
                        let name = args.extra("name").unwrap_or("factory").to_string();
                        Ok(Object::App(Application::new(name)))
                    }),
                )
                .with("config", Object::value("dict")),
        )
        .register_broken("project.broken", ImportError::new("missing_dependency"));
    registry
}

/// A launcher wired to recording doubles.
pub fn launcher(main_process: bool, cwd: &Path) -> (SanicCli, RecordingRuntime, RecordingInspector) {
    let runtime = RecordingRuntime::default();
    let inspector = RecordingInspector::default();
    let cli = SanicCli::new(
        modules(),
        Environment {
            main_process,
            cwd: cwd.to_path_buf(),
        },
    )
    .with_runtime(runtime.clone())
    .with_inspector(inspector.clone());
    (cli, runtime, inspector)
}
