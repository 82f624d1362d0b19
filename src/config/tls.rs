//! TLS option merging.
//!
//! # Responsibilities
//! - Reject contradictory TLS flag combinations before any resolution work
//! - Collapse `--cert/--key`, repeated `--tls DIR` and `--tlshost` into one value
//!
//! # Design Decisions
//! - Pure functions over `TlsSource`; no filesystem access here
//! - One certificate unwraps to `TlsConfig::Single`; the selector shape is
//!   kept for several certificates or whenever the self-signed entry is present

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::args::{flag, ParsedArgs};

/// Certificate chain file expected inside a `--tls` directory.
pub const CHAIN_FILE: &str = "fullchain.pem";

/// Private key file expected inside a `--tls` directory.
pub const KEY_FILE: &str = "privkey.pem";

/// Remediation shown after a TLS contradiction.
pub const TLS_USAGE_HINT: &str = "TLS certificates must be specified by either of:\n  \
    --cert certdir/fullchain.pem --key certdir/privkey.pem\n  \
    --tls certdir  (equivalent to the above)";

/// A certificate chain and its private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertKey {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl CertKey {
    pub fn new(cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        Self {
            cert: cert.into(),
            key: key.into(),
        }
    }

    /// `DIR/fullchain.pem` and `DIR/privkey.pem`.
    pub fn from_dir(dir: &Path) -> Self {
        Self::new(dir.join(CHAIN_FILE), dir.join(KEY_FILE))
    }
}

/// One entry of a TLS selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TlsEntry {
    /// Placeholder the runtime fills with a self-signed certificate at bind time.
    SelfSigned,
    Pair(CertKey),
}

/// Normalized TLS configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsConfig {
    #[default]
    None,
    Single(CertKey),
    /// Several certificates selected by host name at bind time.
    Selector(Vec<TlsEntry>),
}

impl TlsConfig {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, TlsConfig::None)
    }
}

/// Contradictory TLS flag combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TlsError {
    #[error("--cert and --key must be given together")]
    IncompletePair,
    #[error("--tls cannot be combined with --cert/--key")]
    MixedSources,
    #[error("--tlshost requires a certificate from --tls or --cert/--key")]
    HostWithoutCertificate,
}

/// Every TLS input present on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsSource {
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub tls_dirs: Vec<PathBuf>,
    pub tlshost: bool,
}

impl TlsSource {
    pub fn from_args(args: &ParsedArgs) -> Self {
        Self {
            cert: args.value(flag::CERT),
            key: args.value(flag::KEY),
            tls_dirs: args.values(flag::TLS),
            tlshost: args.flag(flag::TLSHOST),
        }
    }

    /// Reject the contradictory combinations.
    pub fn check(&self) -> Result<(), TlsError> {
        if self.cert.is_some() != self.key.is_some() {
            return Err(TlsError::IncompletePair);
        }
        if !self.tls_dirs.is_empty() && self.cert.is_some() {
            return Err(TlsError::MixedSources);
        }
        if self.tlshost && self.tls_dirs.is_empty() && self.cert.is_none() {
            return Err(TlsError::HostWithoutCertificate);
        }
        Ok(())
    }

    /// Collapse the inputs into `None`, a single pair, or a selector list.
    pub fn resolve(&self) -> Result<TlsConfig, TlsError> {
        self.check()?;

        let mut entries = Vec::new();
        if self.tlshost {
            entries.push(TlsEntry::SelfSigned);
        }
        if let (Some(cert), Some(key)) = (&self.cert, &self.key) {
            entries.push(TlsEntry::Pair(CertKey::new(cert, key)));
        }
        entries.extend(
            self.tls_dirs
                .iter()
                .map(|dir| TlsEntry::Pair(CertKey::from_dir(dir))),
        );

        if entries.is_empty() {
            return Ok(TlsConfig::None);
        }
        if let [TlsEntry::Pair(pair)] = entries.as_slice() {
            return Ok(TlsConfig::Single(pair.clone()));
        }
        Ok(TlsConfig::Selector(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(cert: bool, key: bool, tls: bool, tlshost: bool) -> TlsSource {
        TlsSource {
            cert: cert.then(|| PathBuf::from("C")),
            key: key.then(|| PathBuf::from("K")),
            tls_dirs: if tls { vec![PathBuf::from("D")] } else { Vec::new() },
            tlshost,
        }
    }

    #[test]
    fn test_every_flag_combination() {
        let pair = TlsEntry::Pair(CertKey::new("C", "K"));
        let dir = CertKey::from_dir(Path::new("D"));
        let incomplete = Err(TlsError::IncompletePair);

        // (cert, key, tls, tlshost) -> outcome
        let table: Vec<((bool, bool, bool, bool), Result<TlsConfig, TlsError>)> = vec![
            ((false, false, false, false), Ok(TlsConfig::None)),
            ((false, false, false, true), Err(TlsError::HostWithoutCertificate)),
            ((false, false, true, false), Ok(TlsConfig::Single(dir.clone()))),
            (
                (false, false, true, true),
                Ok(TlsConfig::Selector(vec![TlsEntry::SelfSigned, TlsEntry::Pair(dir.clone())])),
            ),
            ((false, true, false, false), incomplete.clone()),
            ((false, true, false, true), incomplete.clone()),
            ((false, true, true, false), incomplete.clone()),
            ((false, true, true, true), incomplete.clone()),
            ((true, false, false, false), incomplete.clone()),
            ((true, false, false, true), incomplete.clone()),
            ((true, false, true, false), incomplete.clone()),
            ((true, false, true, true), incomplete.clone()),
            ((true, true, false, false), Ok(TlsConfig::Single(CertKey::new("C", "K")))),
            (
                (true, true, false, true),
                Ok(TlsConfig::Selector(vec![TlsEntry::SelfSigned, pair.clone()])),
            ),
            ((true, true, true, false), Err(TlsError::MixedSources)),
            ((true, true, true, true), Err(TlsError::MixedSources)),
        ];

        assert_eq!(table.len(), 16);
        for ((cert, key, tls, tlshost), expected) in table {
            let source = source(cert, key, tls, tlshost);
            assert_eq!(
                source.resolve(),
                expected,
                "cert={cert} key={key} tls={tls} tlshost={tlshost}"
            );
            assert_eq!(source.check().is_err(), expected.is_err());
        }
    }

    #[test]
    fn test_tls_dirs_keep_command_line_order() {
        let source = TlsSource {
            tls_dirs: vec![PathBuf::from("A"), PathBuf::from("B")],
            ..TlsSource::default()
        };
        assert_eq!(
            source.resolve(),
            Ok(TlsConfig::Selector(vec![
                TlsEntry::Pair(CertKey::new("A/fullchain.pem", "A/privkey.pem")),
                TlsEntry::Pair(CertKey::new("B/fullchain.pem", "B/privkey.pem")),
            ]))
        );
    }

    #[test]
    fn test_standalone_pair_is_unwrapped() {
        let source = TlsSource {
            cert: Some("C".into()),
            key: Some("K".into()),
            ..TlsSource::default()
        };
        assert_eq!(source.resolve(), Ok(TlsConfig::Single(CertKey::new("C", "K"))));
    }

    #[test]
    fn test_selector_serializes_with_entry_kinds() {
        let config = TlsConfig::Selector(vec![TlsEntry::SelfSigned, TlsEntry::Pair(CertKey::new("C", "K"))]);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["selector"][0]["kind"], "self_signed");
        assert_eq!(json["selector"][1]["cert"], "C");
    }
}
