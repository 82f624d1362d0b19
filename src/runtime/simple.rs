//! Static-file simple server.

use std::io;
use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;

use crate::app::{Application, SimpleServer};

/// Serves a directory, answering directory requests with their `index.html`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDirServer;

impl SimpleServer for StaticDirServer {
    fn build(&self, root: &Path) -> io::Result<Application> {
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", root.display()),
            ));
        }
        let root = root.canonicalize()?;
        let files = ServeDir::new(&root).append_index_html_on_directories(true);
        let router = Router::new().fallback_service(files);

        tracing::debug!(root = %root.display(), "Simple server built");
        Ok(Application::new("SimpleServer").with_router(router))
    }
}
