//! Argument groups.
//!
//! Each group owns one concern of the command line. It attaches its flags to
//! the shared `Command` under its own help heading and may normalize its
//! slice of the parsed values into the run configuration being assembled.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

use crate::args::ParsedArgs;
use crate::config::schema::{HttpVersion, RunConfig};

/// Argument ids shared by the groups, the resolver and the assembler.
pub mod flag {
    pub const TARGET: &str = "target";
    pub const FACTORY: &str = "factory";
    pub const SIMPLE: &str = "simple";
    pub const HOST: &str = "host";
    pub const PORT: &str = "port";
    pub const UNIX: &str = "unix";
    pub const CERT: &str = "cert";
    pub const KEY: &str = "key";
    pub const TLS: &str = "tls";
    pub const TLSHOST: &str = "tlshost";
    pub const HTTP: &str = "http";
    pub const HTTP1: &str = "http1";
    pub const HTTP3: &str = "http3";
    pub const WORKERS: &str = "workers";
    pub const FAST: &str = "fast";
    pub const SINGLE: &str = "single";
    pub const LEGACY: &str = "legacy";
    pub const ACCESS_LOG: &str = "access_log";
    pub const NO_ACCESS_LOG: &str = "no_access_log";
    pub const DEBUG: &str = "debug";
    pub const RELOAD: &str = "reload";
    pub const RELOAD_DIR: &str = "reload_dir";
    pub const DEV: &str = "dev";
    pub const AUTO_TLS: &str = "auto_tls";
    pub const MOTD: &str = "motd";
    pub const NO_MOTD: &str = "no_motd";
    pub const VERBOSITY: &str = "verbosity";
    pub const NOISY_EXCEPTIONS: &str = "noisy_exceptions";
    pub const INSPECT: &str = "inspect";
    pub const INSPECT_RAW: &str = "inspect_raw";
}

const DESCRIPTION: &str = "\
To start running a Sanic application, provide a path to the module, where
app is a registered application:

    $ sanic path.to.server:app

Or, a path to a callable that returns an application:

    $ sanic path.to.factory:create_app --factory

Or, a path to a directory to run as a simple HTTP server:

    $ sanic ./path/to/static --simple";

/// One concern of the command line.
pub trait ArgumentGroup: Send + Sync {
    /// Help heading the group's flags are listed under.
    fn name(&self) -> &'static str;

    /// Add the group's flags to the shared command.
    fn attach(&self, command: Command) -> Command;

    /// Normalize the group's parsed values into the configuration in progress.
    fn prepare(&self, _args: &ParsedArgs, _config: &mut RunConfig) {}
}

/// Ordered collection of argument groups.
///
/// Registration order fixes both help-text order and `prepare` order.
#[derive(Default)]
pub struct GroupRegistry {
    groups: Vec<Box<dyn ArgumentGroup>>,
}

impl GroupRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in groups in their canonical order.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(GeneralGroup)
            .register(ApplicationGroup)
            .register(SocketGroup)
            .register(TlsGroup)
            .register(HttpVersionGroup)
            .register(WorkerGroup)
            .register(DevelopmentGroup)
            .register(OutputGroup)
            .register(InspectorGroup);
        registry
    }

    /// Append a group.
    pub fn register(&mut self, group: impl ArgumentGroup + 'static) -> &mut Self {
        self.groups.push(Box::new(group));
        self
    }

    /// Group names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.groups.iter().map(|group| group.name()).collect()
    }

    /// Attach every group to `command`, each under its own heading.
    pub fn attach(&self, command: Command) -> Command {
        self.groups.iter().fold(command, |command, group| {
            group.attach(command.next_help_heading(group.name()))
        })
    }

    /// The `sanic` command with every group attached.
    pub fn command(&self) -> Command {
        self.attach(
            Command::new("sanic")
                .version(env!("CARGO_PKG_VERSION"))
                .about("Bootstrap and serve a Sanic application")
                .long_about(DESCRIPTION)
                .args_override_self(true),
        )
    }

    /// Run every group's `prepare` in registration order.
    pub fn prepare(&self, args: &ParsedArgs, config: &mut RunConfig) {
        for group in &self.groups {
            group.prepare(args, config);
        }
    }
}

fn switch(id: &'static str, long: &'static str) -> Arg {
    Arg::new(id).long(long).action(ArgAction::SetTrue)
}

pub struct GeneralGroup;

impl ArgumentGroup for GeneralGroup {
    fn name(&self) -> &'static str {
        "General"
    }

    fn attach(&self, command: Command) -> Command {
        command.arg(
            Arg::new(flag::TARGET)
                .value_name("MODULE")
                .required(true)
                .help(
                    "Path to your application, given as module:app, module.app, \
                     module:factory() or a directory with --simple",
                ),
        )
    }
}

pub struct ApplicationGroup;

impl ArgumentGroup for ApplicationGroup {
    fn name(&self) -> &'static str {
        "Application"
    }

    fn attach(&self, command: Command) -> Command {
        command
            .arg(
                switch(flag::FACTORY, "factory")
                    .help("Treat the target as a factory that returns the application"),
            )
            .arg(
                switch(flag::SIMPLE, "simple")
                    .help("Run a simple static server from the target directory"),
            )
    }
}

pub struct SocketGroup;

impl ArgumentGroup for SocketGroup {
    fn name(&self) -> &'static str {
        "Socket binding"
    }

    fn attach(&self, command: Command) -> Command {
        command
            .arg(
                Arg::new(flag::HOST)
                    .short('H')
                    .long("host")
                    .default_value("127.0.0.1")
                    .help("Host address"),
            )
            .arg(
                Arg::new(flag::PORT)
                    .short('p')
                    .long("port")
                    .value_parser(clap::value_parser!(u16))
                    .default_value("8000")
                    .help("Port to serve on"),
            )
            .arg(
                Arg::new(flag::UNIX)
                    .long("unix")
                    .value_name("PATH")
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("Location of a unix socket"),
            )
    }
}

pub struct TlsGroup;

impl ArgumentGroup for TlsGroup {
    fn name(&self) -> &'static str {
        "TLS certificate"
    }

    fn attach(&self, command: Command) -> Command {
        command
            .arg(
                Arg::new(flag::CERT)
                    .long("cert")
                    .value_name("FILE")
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("Location of fullchain.pem, bundle.crt or equivalent"),
            )
            .arg(
                Arg::new(flag::KEY)
                    .long("key")
                    .value_name("FILE")
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("Location of privkey.pem or equivalent .key file"),
            )
            .arg(
                Arg::new(flag::TLS)
                    .long("tls")
                    .value_name("DIR")
                    .action(ArgAction::Append)
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("TLS certificate folder with fullchain.pem and privkey.pem (repeatable)"),
            )
            .arg(
                switch(flag::TLSHOST, "tlshost")
                    .alias("tls-strict-host")
                    .help("Only allow clients that send an SNI matching a certificate"),
            )
    }
}

pub struct HttpVersionGroup;

impl ArgumentGroup for HttpVersionGroup {
    fn name(&self) -> &'static str {
        "HTTP version"
    }

    fn attach(&self, command: Command) -> Command {
        command
            .arg(
                Arg::new(flag::HTTP)
                    .long("http")
                    .value_name("VERSION")
                    .action(ArgAction::Append)
                    .value_parser(["1", "3"])
                    .help("Which HTTP version to use: 1 or 3 (repeatable)"),
            )
            .arg(
                Arg::new(flag::HTTP1)
                    .short('1')
                    .action(ArgAction::SetTrue)
                    .help("Run an HTTP/1.1 server (shorthand for --http=1)"),
            )
            .arg(
                Arg::new(flag::HTTP3)
                    .short('3')
                    .action(ArgAction::SetTrue)
                    .help("Run an HTTP/3 server (shorthand for --http=3)"),
            )
    }

    fn prepare(&self, args: &ParsedArgs, config: &mut RunConfig) {
        let mut versions: Vec<HttpVersion> = args
            .values::<String>(flag::HTTP)
            .iter()
            .filter_map(|value| value.parse::<u8>().ok())
            .filter_map(HttpVersion::from_number)
            .collect();
        if args.flag(flag::HTTP1) {
            versions.push(HttpVersion::Http1);
        }
        if args.flag(flag::HTTP3) {
            versions.push(HttpVersion::Http3);
        }
        if versions.is_empty() {
            versions.push(HttpVersion::Http1);
        }
        versions.sort_unstable_by(|a, b| b.cmp(a));
        versions.dedup();
        config.http_versions = versions;
    }
}

pub struct WorkerGroup;

impl ArgumentGroup for WorkerGroup {
    fn name(&self) -> &'static str {
        "Worker"
    }

    fn attach(&self, command: Command) -> Command {
        command
            .arg(
                Arg::new(flag::WORKERS)
                    .short('w')
                    .long("workers")
                    .value_parser(clap::value_parser!(usize))
                    .default_value("1")
                    .help("Number of worker processes"),
            )
            .arg(switch(flag::FAST, "fast").help("Set the number of workers to max allowed"))
            .arg(
                switch(flag::SINGLE, "single")
                    .alias("single-process")
                    .help("Do not use multiprocessing, run server in a single process"),
            )
            .arg(switch(flag::LEGACY, "legacy").help("Use the legacy server manager"))
            .arg(switch(flag::ACCESS_LOG, "access-logs").help("Display access logs"))
            .arg(
                switch(flag::NO_ACCESS_LOG, "no-access-logs")
                    .conflicts_with(flag::ACCESS_LOG)
                    .help("No display access logs"),
            )
    }

    fn prepare(&self, args: &ParsedArgs, config: &mut RunConfig) {
        if args.flag(flag::ACCESS_LOG) {
            config.access_log = Some(true);
        } else if args.flag(flag::NO_ACCESS_LOG) {
            config.access_log = Some(false);
        }
        if config.fast {
            config.workers = std::thread::available_parallelism()
                .map(usize::from)
                .unwrap_or(1);
        }
    }
}

pub struct DevelopmentGroup;

impl ArgumentGroup for DevelopmentGroup {
    fn name(&self) -> &'static str {
        "Development"
    }

    fn attach(&self, command: Command) -> Command {
        command
            .arg(switch(flag::DEBUG, "debug").help("Run the server in debug mode"))
            .arg(
                switch(flag::RELOAD, "reload")
                    .short('r')
                    .alias("auto-reload")
                    .help("Watch source directory for file changes and reload on changes"),
            )
            .arg(
                Arg::new(flag::RELOAD_DIR)
                    .short('R')
                    .long("reload-dir")
                    .value_name("PATH")
                    .action(ArgAction::Append)
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("Extra directories to watch and reload on changes"),
            )
            .arg(
                switch(flag::DEV, "dev")
                    .short('d')
                    .help("Debug + auto reload"),
            )
            .arg(
                switch(flag::AUTO_TLS, "auto-tls")
                    .help("Create a temporary TLS certificate for local development"),
            )
    }

    fn prepare(&self, _args: &ParsedArgs, config: &mut RunConfig) {
        if config.dev {
            config.debug = true;
        }
    }
}

pub struct OutputGroup;

impl ArgumentGroup for OutputGroup {
    fn name(&self) -> &'static str {
        "Output"
    }

    fn attach(&self, command: Command) -> Command {
        command
            .arg(switch(flag::MOTD, "motd").help("Show the startup display"))
            .arg(
                switch(flag::NO_MOTD, "no-motd")
                    .conflicts_with(flag::MOTD)
                    .help("No startup display"),
            )
            .arg(
                Arg::new(flag::VERBOSITY)
                    .short('v')
                    .long("verbosity")
                    .action(ArgAction::Count)
                    .help("Control logging noise, eg. -vv or --verbosity --verbosity"),
            )
            .arg(
                switch(flag::NOISY_EXCEPTIONS, "noisy-exceptions")
                    .help("Output stack traces for all exceptions"),
            )
    }
}

pub struct InspectorGroup;

impl ArgumentGroup for InspectorGroup {
    fn name(&self) -> &'static str {
        "Inspector"
    }

    fn attach(&self, command: Command) -> Command {
        command
            .arg(
                switch(flag::INSPECT, "inspect")
                    .help("Inspect the state of a running instance, human readable"),
            )
            .arg(
                switch(flag::INSPECT_RAW, "inspect-raw")
                    .help("Inspect the state of a running instance, JSON output"),
            )
    }
}
