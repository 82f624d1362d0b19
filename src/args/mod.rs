//! Command-line argument subsystem.
//!
//! # Data Flow
//! ```text
//! raw argv
//!     → legacy `-v` rewrite (lone `-v` means `--version`)
//!     → groups.rs (every ArgumentGroup attaches its flags to one Command)
//!     → factory keyword scan (unknown `--name` tokens become extra flags)
//!     → clap parse
//!     → ParsedArgs (read-only view shared by every later stage)
//! ```
//!
//! # Design Decisions
//! - Groups are enumerated explicitly in a registry, never discovered
//! - Unknown flags are only tolerated when `--factory` is present
//! - ParsedArgs accessors never panic on unknown ids

pub mod groups;

use std::any::Any;

use clap::{Arg, ArgMatches, Command};

pub use groups::{flag, ArgumentGroup, GroupRegistry};

/// Prefix for ids of forwarded factory keyword flags.
const EXTRA_PREFIX: &str = "extra:";

/// Immutable view over the parsed command line.
#[derive(Debug, Clone)]
pub struct ParsedArgs {
    matches: ArgMatches,
    extras: Vec<String>,
}

impl ParsedArgs {
    /// Whether a boolean flag was set. Unknown ids read as `false`.
    pub fn flag(&self, id: &str) -> bool {
        self.matches
            .try_get_one::<bool>(id)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false)
    }

    /// Single value of an option, if present.
    pub fn value<T>(&self, id: &str) -> Option<T>
    where
        T: Any + Clone + Send + Sync + 'static,
    {
        self.matches.try_get_one::<T>(id).ok().flatten().cloned()
    }

    /// Every value of a repeatable option, in command-line order.
    pub fn values<T>(&self, id: &str) -> Vec<T>
    where
        T: Any + Clone + Send + Sync + 'static,
    {
        self.matches
            .try_get_many::<T>(id)
            .ok()
            .flatten()
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    }

    /// Occurrence count of a counting flag such as `-vv`.
    pub fn count(&self, id: &str) -> u8 {
        self.value::<u8>(id).unwrap_or(0)
    }

    /// The positional application target.
    pub fn target(&self) -> Option<&str> {
        self.matches
            .try_get_one::<String>(flag::TARGET)
            .ok()
            .flatten()
            .map(String::as_str)
    }

    /// Value of a forwarded factory keyword flag (`--name=value`).
    pub fn extra(&self, name: &str) -> Option<&str> {
        self.matches
            .try_get_one::<String>(extra_id(name).as_str())
            .ok()
            .flatten()
            .map(String::as_str)
    }

    /// All forwarded factory keyword flags that received a value.
    pub fn extras(&self) -> Vec<(&str, &str)> {
        self.extras
            .iter()
            .filter_map(|name| self.extra(name).map(|value| (name.as_str(), value)))
            .collect()
    }
}

/// Parse `raw` (including the program name) against `command`.
///
/// A lone `-v` is rewritten to `--version`. When `--factory` is present,
/// every unknown `--name[=value]` flag is registered as a hidden string
/// option before parsing so it can be forwarded to the factory.
pub fn parse_from<I, T>(command: Command, raw: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut raw: Vec<String> = raw.into_iter().map(Into::into).collect();
    let legacy_version = raw.len() == 2 && raw[1] == "-v";
    if legacy_version {
        raw[1] = "--version".to_string();
    }

    let mut command = command;
    let mut extras = Vec::new();
    if !legacy_version && requests_factory(&raw) {
        for name in unknown_long_flags(&command, &raw) {
            command = command.arg(
                Arg::new(extra_id(&name))
                    .long(name.clone())
                    .value_name("VALUE")
                    .hide(true),
            );
            extras.push(name);
        }
        if !extras.is_empty() {
            tracing::debug!(extras = ?extras, "Forwarding keyword flags to factory");
        }
    }

    let matches = command.try_get_matches_from(raw)?;
    Ok(ParsedArgs { matches, extras })
}

fn extra_id(name: &str) -> String {
    format!("{EXTRA_PREFIX}{name}")
}

fn requests_factory(raw: &[String]) -> bool {
    raw.iter()
        .skip(1)
        .take_while(|arg| arg.as_str() != "--")
        .any(|arg| arg == "--factory")
}

/// Long flag names in `raw` that `command` does not define, first occurrence order.
fn unknown_long_flags(command: &Command, raw: &[String]) -> Vec<String> {
    let mut unknown: Vec<String> = Vec::new();
    for arg in raw.iter().skip(1).take_while(|arg| arg.as_str() != "--") {
        let Some(body) = arg.strip_prefix("--") else {
            continue;
        };
        let name = body.split('=').next().unwrap_or_default();
        if name.is_empty() || is_known(command, name) || unknown.iter().any(|u| u == name) {
            continue;
        }
        unknown.push(name.to_string());
    }
    unknown
}

fn is_known(command: &Command, name: &str) -> bool {
    if name == "help" || name == "version" {
        return true;
    }
    command.get_arguments().any(|arg| {
        arg.get_long() == Some(name)
            || arg
                .get_all_aliases()
                .is_some_and(|aliases| aliases.contains(&name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(raw: &[&str]) -> Result<ParsedArgs, clap::Error> {
        parse_from(GroupRegistry::with_defaults().command(), raw.iter().copied())
    }

    #[test]
    fn test_lone_v_means_version() {
        let err = parse(&["sanic", "-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_v_with_target_counts_verbosity() {
        let args = parse(&["sanic", "server:app", "-vv"]).unwrap();
        assert_eq!(args.count(flag::VERBOSITY), 2);
        assert_eq!(args.target(), Some("server:app"));
    }

    #[test]
    fn test_long_verbosity_counts_occurrences() {
        let args = parse(&["sanic", "server:app", "--verbosity", "--verbosity"]).unwrap();
        assert_eq!(args.count(flag::VERBOSITY), 2);
        assert!(parse(&["sanic", "server:app", "--verbosity=2"]).is_err());
    }

    #[test]
    fn test_unknown_flag_rejected_without_factory() {
        let err = parse(&["sanic", "server:app", "--color=blue"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_unknown_flags_forwarded_with_factory() {
        let args = parse(&[
            "sanic",
            "server:create",
            "--factory",
            "--color=blue",
            "--size",
            "large",
            "--port",
            "9000",
        ])
        .unwrap();

        assert!(args.flag(flag::FACTORY));
        assert_eq!(args.extra("color"), Some("blue"));
        assert_eq!(args.extra("size"), Some("large"));
        assert_eq!(args.extra("port"), None);
        assert_eq!(args.value::<u16>(flag::PORT), Some(9000));
        assert_eq!(args.extras(), vec![("color", "blue"), ("size", "large")]);
    }

    #[test]
    fn test_repeated_forwarded_flag_keeps_last_value() {
        let args = parse(&["sanic", "m:f", "--factory", "--tag", "a", "--tag=b"]).unwrap();
        assert_eq!(args.extra("tag"), Some("b"));
        assert_eq!(args.extras(), vec![("tag", "b")]);
    }

    #[test]
    fn test_repeated_option_keeps_last_value() {
        let args = parse(&["sanic", "m:app", "--port", "1", "--port", "2", "--debug", "--debug"]).unwrap();
        assert_eq!(args.value::<u16>(flag::PORT), Some(2));
        assert!(args.flag(flag::DEBUG));

        let args = parse(&["sanic", "m:app", "--http", "1", "--http", "3"]).unwrap();
        assert_eq!(args.values::<String>(flag::HTTP), vec!["1", "3"]);
    }

    #[test]
    fn test_unknown_ids_read_as_absent() {
        let args = parse(&["sanic", "server:app"]).unwrap();
        assert!(!args.flag("no-such-flag"));
        assert_eq!(args.value::<String>("no-such-flag"), None);
        assert!(args.values::<String>("no-such-flag").is_empty());
        assert_eq!(args.count("no-such-flag"), 0);
    }

    #[test]
    fn test_repeatable_tls_keeps_order() {
        let args = parse(&["sanic", "server:app", "--tls", "b", "--tls", "a"]).unwrap();
        let dirs: Vec<std::path::PathBuf> = args.values(flag::TLS);
        assert_eq!(dirs, vec![std::path::PathBuf::from("b"), "a".into()]);
    }
}
