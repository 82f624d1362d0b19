//! HTTP runtime serving prepared applications.
//!
//! # Responsibilities
//! - Build a tokio runtime shaped by the serve mode
//! - Bind every prepared binding (TCP, unix socket, or TLS)
//! - Wire up middleware (request ID, access log tracing)
//! - Stop all bindings together on Ctrl-C

use std::time::Duration;

use axum::http::HeaderName;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::app::{Application, Binding};
use crate::config::schema::{HttpVersion, RunConfig};
use crate::lifecycle::shutdown::{self, Shutdown};
use crate::lifecycle::{Runtime, RuntimeError, ServeMode};
use crate::runtime::tls::{load_tls_config, primary_pair};

const X_REQUEST_ID: &str = "x-request-id";
const GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Runtime built on axum and tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRuntime;

impl Runtime for HttpRuntime {
    fn serve(&self, app: Application) -> Result<(), RuntimeError> {
        let workers = first_binding(&app)?.config.workers.max(1);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .enable_all()
            .build()?;
        runtime.block_on(serve_app(app, ServeMode::ClusterDefault))
    }

    fn serve_single(&self, app: Application) -> Result<(), RuntimeError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(serve_app(app, ServeMode::SingleProcess))
    }

    fn serve_legacy(&self, app: Application) -> Result<(), RuntimeError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(serve_app(app, ServeMode::Legacy))
    }
}

fn first_binding(app: &Application) -> Result<&Binding, RuntimeError> {
    app.bindings()
        .first()
        .ok_or_else(|| RuntimeError::NoBindings(app.name().to_string()))
}

async fn serve_app(app: Application, mode: ServeMode) -> Result<(), RuntimeError> {
    let first = first_binding(&app)?;
    if first.config.motd {
        announce(&app, mode);
    }
    if first.config.auto_reload {
        tracing::warn!(
            dirs = ?first.config.reload_dirs,
            "Auto-reload requested but this runtime does not watch files"
        );
    }
    if let Some(binding) = app.bindings().iter().find(|b| b.version == HttpVersion::Http3) {
        return Err(RuntimeError::Unsupported(format!(
            "{} binding on {}",
            binding.version,
            binding.config.bind_address()
        )));
    }

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let mut tasks = JoinSet::new();
    for binding in app.bindings() {
        let router = with_middleware(app.router().clone(), &binding.config);
        tasks.spawn(serve_binding(router, binding.config.clone(), shutdown.clone()));
    }

    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result? {
            shutdown.trigger();
            return Err(e);
        }
    }

    tracing::info!(app = %app.name(), "Server stopped");
    Ok(())
}

fn announce(app: &Application, mode: ServeMode) {
    for binding in app.bindings() {
        let config = &binding.config;
        let location = match &config.unix {
            Some(path) => format!("unix:{}", path.display()),
            None => format!("{}://{}", config.scheme(), config.bind_address()),
        };
        tracing::info!(
            app = %app.name(),
            mode = ?mode,
            version = %binding.version,
            location = %location,
            workers = config.workers,
            debug = config.debug,
            "Goin' Fast"
        );
    }
}

fn with_middleware(router: Router, config: &RunConfig) -> Router {
    let header = HeaderName::from_static(X_REQUEST_ID);
    let router = router
        .layer(PropagateRequestIdLayer::new(header.clone()))
        .layer(SetRequestIdLayer::new(header, MakeRequestUuid));

    if config.access_log.unwrap_or(config.debug) {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

async fn serve_binding(router: Router, config: RunConfig, shutdown: Shutdown) -> Result<(), RuntimeError> {
    if let Some(path) = &config.unix {
        return serve_unix(router, path, &config, shutdown).await;
    }

    match primary_pair(&config.ssl)? {
        Some(pair) => {
            let tls = load_tls_config(pair).await?;
            let addr = tokio::net::lookup_host(config.bind_address())
                .await?
                .next()
                .ok_or_else(|| {
                    RuntimeError::Io(std::io::Error::new(
                        std::io::ErrorKind::AddrNotAvailable,
                        format!("cannot resolve {}", config.bind_address()),
                    ))
                })?;

            let handle = axum_server::Handle::new();
            let stopper = handle.clone();
            let rx = shutdown.subscribe();
            tokio::spawn(async move {
                shutdown::wait(rx).await;
                stopper.graceful_shutdown(Some(GRACE_PERIOD));
            });

            tracing::info!(address = %addr, "Listening (TLS)");
            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(router.into_make_service())
                .await?;
        }
        None => {
            let listener = TcpListener::bind(config.bind_address()).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening");
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown::wait(shutdown.subscribe()))
                .await?;
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn serve_unix(
    router: Router,
    path: &std::path::Path,
    config: &RunConfig,
    shutdown: Shutdown,
) -> Result<(), RuntimeError> {
    use std::os::unix::fs::FileTypeExt;

    if config.ssl.is_enabled() {
        return Err(RuntimeError::Unsupported("TLS on a unix socket".to_string()));
    }
    if let Ok(meta) = std::fs::symlink_metadata(path) {
        if meta.file_type().is_socket() {
            std::fs::remove_file(path)?;
        }
    }

    let listener = tokio::net::UnixListener::bind(path)?;
    tracing::info!(path = %path.display(), "Listening on unix socket");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown::wait(shutdown.subscribe()))
        .await?;
    let _ = std::fs::remove_file(path);
    Ok(())
}

#[cfg(not(unix))]
async fn serve_unix(
    _router: Router,
    _path: &std::path::Path,
    _config: &RunConfig,
    _shutdown: Shutdown,
) -> Result<(), RuntimeError> {
    Err(RuntimeError::Unsupported("unix sockets on this platform".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tls::{TlsConfig, TlsEntry};

    fn prepared(config: RunConfig, version: HttpVersion) -> Application {
        let mut app = Application::new("demo");
        app.prepare(&config, version);
        app
    }

    #[test]
    fn test_unprepared_app_is_rejected() {
        let err = HttpRuntime.serve_single(Application::new("demo")).unwrap_err();
        assert!(matches!(err, RuntimeError::NoBindings(ref name) if name == "demo"));
    }

    #[test]
    fn test_http3_binding_is_unsupported() {
        let config = RunConfig {
            motd: false,
            ..RunConfig::default()
        };
        let err = HttpRuntime
            .serve_single(prepared(config, HttpVersion::Http3))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Unsupported(_)));
    }

    #[test]
    fn test_self_signed_only_is_unsupported() {
        let config = RunConfig {
            motd: false,
            port: 0,
            ssl: TlsConfig::Selector(vec![TlsEntry::SelfSigned]),
            ..RunConfig::default()
        };
        let err = HttpRuntime
            .serve_single(prepared(config, HttpVersion::Http1))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Unsupported(_)));
    }
}
