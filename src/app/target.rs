//! Application target parsing.
//!
//! A target is `module[.submodule]*{:|.}attribute[()]`. The split happens on
//! the last `:` when one is present, otherwise on the last `.`.

use std::path::Path;

/// A parsed module/attribute target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppTarget {
    pub module: String,
    pub attribute: String,
    /// Set when the attribute carried the `()` suffix.
    pub factory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error(
        "App not found.\n   Please use --simple if you are passing a directory to sanic.\n   eg. sanic {0} --simple"
    )]
    Directory(String),
    #[error("Invalid target {0:?}: expected module:attribute or module.attribute")]
    Malformed(String),
}

impl AppTarget {
    /// Parse `raw`; `cwd` is only consulted to detect directory targets.
    pub fn parse(raw: &str, cwd: &Path) -> Result<Self, TargetError> {
        if raw.is_empty() {
            return Err(TargetError::Malformed(raw.to_string()));
        }
        let delimiter = if raw.contains(':') { ':' } else { '.' };
        let split = raw
            .rsplit_once(delimiter)
            .filter(|(module, _)| !module.is_empty());

        let Some((module, attribute)) = split else {
            if cwd.join(raw).is_dir() {
                return Err(TargetError::Directory(raw.to_string()));
            }
            return Err(TargetError::Malformed(raw.to_string()));
        };

        let (attribute, factory) = match attribute.strip_suffix("()") {
            Some(stripped) => (stripped, true),
            None => (attribute, false),
        };
        if attribute.is_empty() {
            return Err(TargetError::Malformed(raw.to_string()));
        }

        Ok(Self {
            module: module.to_string(),
            attribute: attribute.to_string(),
            factory,
        })
    }
}
