//! The `sanic` command-line launcher.
//!
//! # Data Flow
//! ```text
//! argv
//!     → args (groups attach, parse, factory keyword flags)
//!     → TLS precheck (main process only; usage + exit 1 on contradiction)
//!     → ServeMode::select (inspect runs silence non-error logging)
//!     → AppResolver (target string → Application)
//!     → Dispatcher (inspect, or assemble RunConfig and serve)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use crate::app::{AppResolver, Loader, ResolveError, ResolveRequest, SimpleServer};
use crate::args::{flag, parse_from, GroupRegistry};
use crate::config::assembler::assemble;
use crate::config::tls::{TlsError, TlsSource, TLS_USAGE_HINT};
use crate::lifecycle::{Dispatcher, Inspector, Outcome, Runtime, RuntimeError, ServeMode};
use crate::observability::LogControl;
use crate::runtime::{HttpInspector, HttpRuntime, StaticDirServer};

/// Marks a process spawned by the reloader.
pub const RELOADER_ENV: &str = "SANIC_RELOADER_PROCESS";

/// Process facts read once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// `false` for reloader-spawned children, which skip the TLS precheck.
    pub main_process: bool,
    pub cwd: PathBuf,
}

impl Environment {
    pub fn from_process() -> std::io::Result<Self> {
        let reloader_child = std::env::var(RELOADER_ENV).is_ok_and(|value| value == "true");
        Ok(Self {
            main_process: !reloader_child,
            cwd: std::env::current_dir()?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Parse(#[from] clap::Error),

    #[error("{source}")]
    Tls {
        usage: String,
        #[source]
        source: TlsError,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Parse(e) => u8::try_from(e.exit_code()).unwrap_or(2),
            CliError::Tls { .. } | CliError::Resolve(_) | CliError::Runtime(_) => 1,
        }
    }

    /// Print the error the way each kind is surfaced to the user.
    pub fn report(&self) {
        match self {
            CliError::Parse(e) => {
                let _ = e.print();
            }
            CliError::Tls { usage, source } => {
                eprintln!("{}", usage.trim_end());
                tracing::error!(reason = %source, "{}", TLS_USAGE_HINT);
            }
            CliError::Resolve(ResolveError::NotFound { .. }) => {
                tracing::error!("{}", self);
            }
            CliError::Resolve(ResolveError::Import(e)) => {
                eprintln!("Error: {}", e);
                eprintln!("  raised while importing the application module");
            }
            CliError::Resolve(e) => {
                tracing::error!("Failed to run app: {}", e);
                let mut source = std::error::Error::source(e);
                while let Some(cause) = source {
                    tracing::error!("  caused by: {}", cause);
                    source = cause.source();
                }
            }
            CliError::Runtime(e) => {
                tracing::error!(error = %e, "Server failed");
            }
        }
    }
}

/// The launcher: argument groups, target resolver and collaborators.
pub struct SanicCli {
    groups: GroupRegistry,
    resolver: AppResolver,
    runtime: Box<dyn Runtime>,
    inspector: Box<dyn Inspector>,
    logging: LogControl,
    environment: Environment,
}

impl SanicCli {
    /// A launcher over `loader` with the bundled runtime, inspector and
    /// simple server.
    pub fn new(loader: impl Loader + 'static, environment: Environment) -> Self {
        Self {
            groups: GroupRegistry::with_defaults(),
            resolver: AppResolver::new(loader, StaticDirServer),
            runtime: Box::new(HttpRuntime),
            inspector: Box::new(HttpInspector::new()),
            logging: LogControl::detached(),
            environment,
        }
    }

    pub fn with_groups(mut self, groups: GroupRegistry) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_runtime(mut self, runtime: impl Runtime + 'static) -> Self {
        self.runtime = Box::new(runtime);
        self
    }

    pub fn with_inspector(mut self, inspector: impl Inspector + 'static) -> Self {
        self.inspector = Box::new(inspector);
        self
    }

    pub fn with_simple_server(mut self, simple_server: impl SimpleServer + 'static) -> Self {
        self.resolver = self.resolver.with_simple_server(simple_server);
        self
    }

    pub fn with_logging(mut self, logging: LogControl) -> Self {
        self.logging = logging;
        self
    }

    /// Run with `raw` (program name first) and map the result to an exit code.
    pub fn main<I, T>(&mut self, raw: I) -> ExitCode
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        match self.run(raw) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                e.report();
                ExitCode::from(e.exit_code())
            }
        }
    }

    /// Run with `raw` (program name first).
    pub fn run<I, T>(&mut self, raw: I) -> Result<Outcome, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let args = parse_from(self.groups.command(), raw)?;

        let tls = TlsSource::from_args(&args);
        if self.environment.main_process {
            tls.check().map_err(|source| self.usage_error(source))?;
        }

        let mode = ServeMode::select(&args);
        if mode.is_inspect() {
            self.logging.suppress();
        }

        let request = ResolveRequest {
            target: args.target().unwrap_or_default(),
            factory: args.flag(flag::FACTORY),
            simple: args.flag(flag::SIMPLE),
            cwd: &self.environment.cwd,
        };
        let app = self.resolver.resolve(&request, &args)?;

        let dispatcher = Dispatcher::new(self.runtime.as_ref(), self.inspector.as_ref());
        dispatcher.dispatch(mode, app, || {
            let ssl = tls.resolve().map_err(|source| self.usage_error(source))?;
            let config = assemble(&args, &self.groups, ssl);
            self.logging.apply_verbosity(config.verbosity, config.debug);
            if let Ok(json) = serde_json::to_string(&config) {
                tracing::debug!(config = %json, "Run configuration assembled");
            }
            Ok(config)
        })
    }

    fn usage_error(&self, source: TlsError) -> CliError {
        CliError::Tls {
            usage: self.groups.command().render_usage().to_string(),
            source,
        }
    }
}
