//! Run configuration assembly.
//!
//! Field mapping first, then every argument group's `prepare`, then the
//! derived reload rules. The reload directory rule runs last so an explicit
//! path always wins over any other auto-reload state.

use std::path::PathBuf;

use crate::args::{flag, GroupRegistry, ParsedArgs};
use crate::config::schema::RunConfig;
use crate::config::tls::TlsConfig;

/// Build the final run configuration from parsed flags and resolved TLS.
pub fn assemble(args: &ParsedArgs, groups: &GroupRegistry, ssl: TlsConfig) -> RunConfig {
    let defaults = RunConfig::default();
    let mut config = RunConfig {
        host: args.value(flag::HOST).unwrap_or(defaults.host),
        port: args.value(flag::PORT).unwrap_or(defaults.port),
        unix: args.value(flag::UNIX),
        ssl,
        workers: args.value(flag::WORKERS).unwrap_or(defaults.workers),
        single_process: args.flag(flag::SINGLE),
        legacy: args.flag(flag::LEGACY),
        dev: args.flag(flag::DEV),
        verbosity: args.count(flag::VERBOSITY),
        debug: args.flag(flag::DEBUG),
        fast: args.flag(flag::FAST),
        noisy_exceptions: args.flag(flag::NOISY_EXCEPTIONS),
        motd: !args.flag(flag::NO_MOTD),
        auto_tls: args.flag(flag::AUTO_TLS),
        ..defaults
    };

    groups.prepare(args, &mut config);

    if args.flag(flag::RELOAD) || args.flag(flag::DEV) {
        config.auto_reload = true;
    }

    let reload_dirs: Vec<PathBuf> = args.values(flag::RELOAD_DIR);
    if !reload_dirs.is_empty() {
        config.auto_reload = true;
        config.reload_dirs = dedup_paths(reload_dirs);
    }

    config
}

fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut unique: Vec<PathBuf> = Vec::with_capacity(paths.len());
    for path in paths {
        if !unique.contains(&path) {
            unique.push(path);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::parse_from;
    use crate::config::schema::HttpVersion;
    use crate::config::tls::CertKey;

    fn assembled(raw: &[&str]) -> RunConfig {
        let groups = GroupRegistry::with_defaults();
        let args = parse_from(groups.command(), raw.iter().copied()).unwrap();
        assemble(&args, &groups, TlsConfig::None)
    }

    #[test]
    fn test_defaults() {
        let config = assembled(&["sanic", "server:app"]);
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_field_mapping() {
        let config = assembled(&[
            "sanic",
            "server:app",
            "-H",
            "0.0.0.0",
            "-p",
            "9999",
            "--unix",
            "/tmp/sanic.sock",
            "-w",
            "4",
            "--single",
            "--legacy",
            "--debug",
            "--noisy-exceptions",
            "--no-motd",
            "--auto-tls",
            "-vvv",
        ]);

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9999);
        assert_eq!(config.unix, Some(PathBuf::from("/tmp/sanic.sock")));
        assert_eq!(config.workers, 4);
        assert!(config.single_process);
        assert!(config.legacy);
        assert!(config.debug);
        assert!(config.noisy_exceptions);
        assert!(!config.motd);
        assert!(config.auto_tls);
        assert_eq!(config.verbosity, 3);
        assert!(!config.auto_reload);
    }

    #[test]
    fn test_ssl_is_passed_through() {
        let groups = GroupRegistry::with_defaults();
        let args = parse_from(groups.command(), ["sanic", "server:app"]).unwrap();
        let ssl = TlsConfig::Single(CertKey::new("c.pem", "k.pem"));
        assert_eq!(assemble(&args, &groups, ssl.clone()).ssl, ssl);
    }

    #[test]
    fn test_reload_and_dev_enable_auto_reload() {
        assert!(assembled(&["sanic", "server:app", "--reload"]).auto_reload);
        let dev = assembled(&["sanic", "server:app", "--dev"]);
        assert!(dev.auto_reload);
        assert!(dev.dev);
        assert!(dev.debug);
    }

    #[test]
    fn test_reload_dir_forces_auto_reload() {
        let config = assembled(&["sanic", "server:app", "-R", "src", "-R", "templates", "-R", "src"]);
        assert!(config.auto_reload);
        assert_eq!(
            config.reload_dirs,
            vec![PathBuf::from("src"), PathBuf::from("templates")]
        );
    }

    #[test]
    fn test_groups_prepare_runs_during_assembly() {
        let config = assembled(&["sanic", "server:app", "-3", "--access-logs"]);
        assert_eq!(config.http_versions, vec![HttpVersion::Http3]);
        assert_eq!(config.access_log, Some(true));
    }
}
