//! Serve-mode selection and dispatch.

use serde::Serialize;

use crate::app::Application;
use crate::args::{flag, ParsedArgs};
use crate::config::schema::RunConfig;

/// How the run ends up being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServeMode {
    ClusterDefault,
    SingleProcess,
    Legacy,
    /// Query a running instance instead of serving.
    InspectOnly { raw: bool },
}

impl ServeMode {
    /// Inspect flags win over everything; `--single` is checked before `--legacy`.
    pub fn select(args: &ParsedArgs) -> Self {
        let inspect = args.flag(flag::INSPECT);
        let raw = args.flag(flag::INSPECT_RAW);
        if inspect || raw {
            ServeMode::InspectOnly { raw }
        } else if args.flag(flag::SINGLE) {
            ServeMode::SingleProcess
        } else if args.flag(flag::LEGACY) {
            ServeMode::Legacy
        } else {
            ServeMode::ClusterDefault
        }
    }

    pub fn is_inspect(&self) -> bool {
        matches!(self, ServeMode::InspectOnly { .. })
    }
}

/// Query sent to a running instance's inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectRequest {
    pub host: String,
    pub port: u16,
    /// Print the response body as-is instead of formatting it.
    pub raw: bool,
}

/// Client for the inspector of a running instance.
///
/// Transport failures are reported by the implementation and never returned.
pub trait Inspector {
    fn inspect(&self, request: &InspectRequest);
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TLS material {}: {reason}", .path.display())]
    Tls {
        path: std::path::PathBuf,
        reason: String,
    },
    #[error("unsupported by this runtime: {0}")]
    Unsupported(String),
    #[error("application {0} has no prepared bindings")]
    NoBindings(String),
    #[error("binding task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// The server runtime a prepared application is handed to.
pub trait Runtime {
    /// Default multi-worker mode.
    fn serve(&self, app: Application) -> Result<(), RuntimeError>;
    fn serve_single(&self, app: Application) -> Result<(), RuntimeError>;
    fn serve_legacy(&self, app: Application) -> Result<(), RuntimeError>;
}

/// Terminal state of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Served(ServeMode),
    Inspected,
}

/// Invokes exactly one serve mode, or the inspector.
pub struct Dispatcher<'a> {
    runtime: &'a dyn Runtime,
    inspector: &'a dyn Inspector,
}

impl<'a> Dispatcher<'a> {
    pub fn new(runtime: &'a dyn Runtime, inspector: &'a dyn Inspector) -> Self {
        Self { runtime, inspector }
    }

    /// Dispatch `app` in `mode`.
    ///
    /// `assemble` is only called for serving modes, so inspect mode never
    /// builds a run configuration.
    pub fn dispatch<F, E>(&self, mode: ServeMode, mut app: Application, assemble: F) -> Result<Outcome, E>
    where
        F: FnOnce() -> Result<RunConfig, E>,
        E: From<RuntimeError>,
    {
        if let ServeMode::InspectOnly { raw } = mode {
            let request = InspectRequest {
                host: app.config().inspector_host.clone(),
                port: app.config().inspector_port,
                raw,
            };
            self.inspector.inspect(&request);
            return Ok(Outcome::Inspected);
        }

        let config = assemble()?;
        for version in &config.http_versions {
            app.prepare(&config, *version);
        }

        tracing::debug!(mode = ?mode, app = %app.name(), "Dispatching");
        match mode {
            ServeMode::SingleProcess => self.runtime.serve_single(app)?,
            ServeMode::Legacy => self.runtime.serve_legacy(app)?,
            ServeMode::ClusterDefault | ServeMode::InspectOnly { .. } => self.runtime.serve(app)?,
        }
        Ok(Outcome::Served(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::args::{parse_from, GroupRegistry};
    use crate::config::schema::HttpVersion;

    #[derive(Default)]
    struct Recorder {
        served: RefCell<Vec<(&'static str, Vec<HttpVersion>)>>,
        inspected: RefCell<Vec<InspectRequest>>,
    }

    impl Recorder {
        fn record(&self, mode: &'static str, app: Application) -> Result<(), RuntimeError> {
            let versions = app.bindings().iter().map(|b| b.version).collect();
            self.served.borrow_mut().push((mode, versions));
            Ok(())
        }
    }

    impl Runtime for Recorder {
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

    impl Inspector for Recorder {
        fn inspect(&self, request: &InspectRequest) {
            self.inspected.borrow_mut().push(request.clone());
        }
    }

    fn mode(raw: &[&str]) -> ServeMode {
        let args = parse_from(GroupRegistry::with_defaults().command(), raw.iter().copied()).unwrap();
        ServeMode::select(&args)
    }

    #[test]
    fn test_mode_precedence() {
        assert_eq!(mode(&["sanic", "a:app"]), ServeMode::ClusterDefault);
        assert_eq!(mode(&["sanic", "a:app", "--legacy"]), ServeMode::Legacy);
        assert_eq!(mode(&["sanic", "a:app", "--single"]), ServeMode::SingleProcess);
        assert_eq!(mode(&["sanic", "a:app", "--single", "--legacy"]), ServeMode::SingleProcess);
        assert_eq!(mode(&["sanic", "a:app", "--legacy", "--single"]), ServeMode::SingleProcess);
        assert_eq!(
            mode(&["sanic", "a:app", "--single", "--legacy", "--inspect"]),
            ServeMode::InspectOnly { raw: false }
        );
        assert_eq!(mode(&["sanic", "a:app", "--inspect-raw"]), ServeMode::InspectOnly { raw: true });
    }

    #[test]
    fn test_inspect_never_assembles() {
        let recorder = Recorder::default();
        let dispatcher = Dispatcher::new(&recorder, &recorder);
        let outcome: Result<Outcome, RuntimeError> = dispatcher.dispatch(
            ServeMode::InspectOnly { raw: true },
            Application::new("demo"),
            || panic!("run configuration must not be assembled in inspect mode"),
        );

        assert_eq!(outcome.unwrap(), Outcome::Inspected);
        assert!(recorder.served.borrow().is_empty());
        assert_eq!(
            recorder.inspected.borrow().as_slice(),
            &[InspectRequest {
                host: "localhost".into(),
                port: 6457,
                raw: true
            }]
        );
    }

    #[test]
    fn test_serve_prepares_each_version() {
        let recorder = Recorder::default();
        let dispatcher = Dispatcher::new(&recorder, &recorder);
        let config = RunConfig {
            http_versions: vec![HttpVersion::Http3, HttpVersion::Http1],
            ..RunConfig::default()
        };

        let outcome: Result<Outcome, RuntimeError> =
            dispatcher.dispatch(ServeMode::Legacy, Application::new("demo"), || Ok(config));

        assert_eq!(outcome.unwrap(), Outcome::Served(ServeMode::Legacy));
        assert_eq!(
            recorder.served.borrow().as_slice(),
            &[("legacy", vec![HttpVersion::Http3, HttpVersion::Http1])]
        );
        assert!(recorder.inspected.borrow().is_empty());
    }

    #[test]
    fn test_assembly_failure_aborts_before_serving() {
        let recorder = Recorder::default();
        let dispatcher = Dispatcher::new(&recorder, &recorder);
        let outcome: Result<Outcome, RuntimeError> = dispatcher.dispatch(
            ServeMode::SingleProcess,
            Application::new("demo"),
            || Err(RuntimeError::Unsupported("test".into())),
        );

        assert!(outcome.is_err());
        assert!(recorder.served.borrow().is_empty());
    }
}
