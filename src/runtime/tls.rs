//! TLS configuration and certificate loading.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::tls::{CertKey, TlsConfig, TlsEntry};
use crate::lifecycle::RuntimeError;

fn tls_error(path: &Path, reason: impl Into<String>) -> RuntimeError {
    RuntimeError::Tls {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Check that `pair` points at a PEM chain with at least one certificate
/// and a PEM file holding a private key.
pub fn validate_pem(pair: &CertKey) -> Result<(), RuntimeError> {
    let file = File::open(&pair.cert).map_err(|e| tls_error(&pair.cert, e.to_string()))?;
    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| tls_error(&pair.cert, format!("failed to read certificates: {e}")))?;
    if certs.is_empty() {
        return Err(tls_error(&pair.cert, "no certificates found"));
    }

    let file = File::open(&pair.key).map_err(|e| tls_error(&pair.key, e.to_string()))?;
    match rustls_pemfile::private_key(&mut BufReader::new(file)) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(tls_error(&pair.key, "no private key found")),
        Err(e) => Err(tls_error(&pair.key, format!("failed to read private key: {e}"))),
    }
}

/// Pick the certificate to bind with.
///
/// A selector binds with its first concrete pair; host-based selection
/// between several pairs is not available in this runtime.
pub fn primary_pair(config: &TlsConfig) -> Result<Option<&CertKey>, RuntimeError> {
    match config {
        TlsConfig::None => Ok(None),
        TlsConfig::Single(pair) => Ok(Some(pair)),
        TlsConfig::Selector(entries) => {
            let mut pairs = entries.iter().filter_map(|entry| match entry {
                TlsEntry::Pair(pair) => Some(pair),
                TlsEntry::SelfSigned => None,
            });
            let first = pairs.next().ok_or_else(|| {
                RuntimeError::Unsupported("self-signed certificate generation".to_string())
            })?;
            let skipped = pairs.count();
            if skipped > 0 {
                tracing::warn!(
                    cert = %first.cert.display(),
                    skipped,
                    "Binding with the first certificate only"
                );
            }
            Ok(Some(first))
        }
    }
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(pair: &CertKey) -> Result<RustlsConfig, RuntimeError> {
    validate_pem(pair)?;
    RustlsConfig::from_pem_file(&pair.cert, &pair.key)
        .await
        .map_err(|e| tls_error(&pair.cert, e.to_string()))
}
