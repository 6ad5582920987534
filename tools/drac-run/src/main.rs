//! drac-run - executes a compiled Drac module
//!
//! Standard input and output belong to the running program. Logs and the
//! diagnostic for a fatal error go to stderr; a fatal error exits with
//! status 1, a module that cannot be loaded exits with status 2.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use drac_runtime::host;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if cli.print_imports {
        print!("{}", host::import_preamble());
        return ExitCode::SUCCESS;
    }

    let Some(path) = cli.module.as_deref() else {
        // clap enforces the module argument unless --print-imports is given
        return ExitCode::from(2);
    };

    info!("Running {}", path.display());
    match drac_runtime::execute_file(path, cli.runtime_config()) {
        Ok(()) => {
            debug!("{} finished", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    }
}
