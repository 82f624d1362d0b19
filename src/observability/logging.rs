//! Structured logging.
//!
//! # Responsibilities
//! - Install the global tracing subscriber
//! - Map `-v` counts and `--debug` to a filter
//! - Silence non-error output for inspect runs

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "sanic_cli=info,tower_http=info";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Handle for adjusting the log filter after start-up.
#[derive(Clone, Default)]
pub struct LogControl {
    handle: Option<FilterHandle>,
    env_override: bool,
}

impl LogControl {
    /// Install the global subscriber. Falls back to a detached control when
    /// a subscriber is already installed.
    pub fn init() -> Self {
        let env_filter = EnvFilter::try_from_default_env().ok();
        let env_override = env_filter.is_some();
        let filter = env_filter.unwrap_or_else(|| DEFAULT_FILTER.into());
        let (layer, handle) = reload::Layer::new(filter);

        let installed = tracing_subscriber::registry()
            .with(layer)
            .with(fmt::layer().with_target(false))
            .try_init()
            .is_ok();

        if installed {
            Self {
                handle: Some(handle),
                env_override,
            }
        } else {
            Self::detached()
        }
    }

    /// A control that changes nothing.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Raise verbosity to match the run configuration.
    pub fn apply_verbosity(&self, verbosity: u8, debug: bool) {
        if self.env_override {
            return;
        }
        self.set(filter_for(verbosity, debug));
    }

    /// Keep errors only for the rest of the run.
    pub fn suppress(&self) {
        self.set("error");
    }

    fn set(&self, directives: &str) {
        if let Some(handle) = &self.handle {
            if let Err(e) = handle.reload(EnvFilter::new(directives)) {
                tracing::warn!(error = %e, "Failed to update log filter");
            }
        }
    }
}

/// Filter directives for a verbosity level.
pub fn filter_for(verbosity: u8, debug: bool) -> &'static str {
    match (verbosity, debug) {
        (0, false) => DEFAULT_FILTER,
        (0, true) | (1, _) => "sanic_cli=debug,tower_http=debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_for_verbosity() {
        assert_eq!(filter_for(0, false), DEFAULT_FILTER);
        assert_eq!(filter_for(0, true), "sanic_cli=debug,tower_http=debug");
        assert_eq!(filter_for(1, false), "sanic_cli=debug,tower_http=debug");
        assert_eq!(filter_for(2, true), "trace");
    }

    #[test]
    fn test_detached_control_is_inert() {
        let control = LogControl::detached();
        control.suppress();
        control.apply_verbosity(3, true);
    }
}
