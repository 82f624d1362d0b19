use std::process::ExitCode;

use sanic_cli::observability::LogControl;
use sanic_cli::{Environment, ModuleRegistry, SanicCli};

/// The stock binary starts with no registered modules, so only `--simple`
/// directory targets resolve. Module targets need an embedding program
/// that registers its modules with [`ModuleRegistry`] (see the crate docs).
fn main() -> ExitCode {
    let logging = LogControl::init();

    let environment = match Environment::from_process() {
        Ok(environment) => environment,
        Err(e) => {
            eprintln!("error: cannot read the working directory: {}", e);
            return ExitCode::FAILURE;
        }
    };

    SanicCli::new(ModuleRegistry::new(), environment)
        .with_logging(logging)
        .main(std::env::args())
}
