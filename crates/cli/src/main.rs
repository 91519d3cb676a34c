//! tripstore command-line entry point.
//!
//! Loads a dataset, then runs a single command or an interactive shell.
//! A load failure exits before any command runs.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use tripstore_engine::{Database, LoadPolicy, Loader, StoreConfig};
use tripstore_executor::{Command, Executor};

mod args;
mod shell;

use args::Cli;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing init failed: {}", e);
    }
}

fn open(cli: &Cli) -> anyhow::Result<Executor> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_path(path)?,
        None => StoreConfig::default(),
    };
    if cli.lenient {
        config = config.load_policy(LoadPolicy::Lenient);
    }

    let db = Database::with_config(config)?;
    tracing::info!(data = %cli.data.display(), policy = ?db.config().load_policy, "loading dataset");
    Loader::new(&db)
        .load_path(&cli.data)
        .with_context(|| format!("loading {}", cli.data.display()))?;
    Ok(Executor::new(Arc::new(db)))
}

/// Run one command, printing its JSON or its error. Returns success.
pub(crate) fn run_one(executor: &Executor, cmd: Command) -> bool {
    match executor.execute(cmd).and_then(|out| out.to_json()) {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            eprintln!("error: {}: {}", e.status(), e);
            false
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let executor = match open(&cli) {
        Ok(executor) => executor,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.action.into_command() {
        Some(cmd) => {
            if run_one(&executor, cmd) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        None => match shell::run(&executor) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}
