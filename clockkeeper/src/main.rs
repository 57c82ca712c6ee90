//! clockkeeper - keeps the e-paper Spotify clock running.
//!
//! The supervisor:
//! - Accepts only `-v`/`--verbose`, `--clock` and `--local_run`
//! - Enters the clock checkout under the invoking user's home
//! - Launches `main.py` with the same flags, forever
//! - Appends a "crashed at" line to `failures.txt` after every exit
//! - Waits a fixed interval before relaunching
//!
//! SIGINT/SIGTERM stop the running child and end the loop.

mod args;
mod child;
mod config;
mod failure_log;
mod run;
mod util;
mod workdir;

use anyhow::{Context, Result};
use args::{Args, Flags};
use clap::Parser;
use config::SupervisorConfig;
use tracing_subscriber::EnvFilter;
use util::shutdown::{wait_for_termination, ShutdownCoordinator};

/// Exit code for usage errors and an unavailable working directory.
const FATAL_EXIT_CODE: i32 = 1;

/// Resolve the configuration and enter the working directory.
fn prepare(flags: Flags) -> Result<SupervisorConfig> {
    let mut config =
        SupervisorConfig::from_env(flags).context("failed to resolve working directory")?;
    config.workdir = workdir::enter(&config.workdir).context("failed to enter working directory")?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Nothing else happens before the flags are known to be valid
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(FATAL_EXIT_CODE);
        }
    };
    let flags = args.flags();

    let default_filter = if flags.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match prepare(flags) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{:#}", e);
            std::process::exit(FATAL_EXIT_CODE);
        }
    };

    let coordinator = ShutdownCoordinator::new();
    let shutdown = coordinator.signal();
    tokio::spawn(async move {
        let sig = wait_for_termination().await;
        coordinator.shutdown(sig);
    });

    let exit_code = match run::run(&config, shutdown).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("supervisor error: {:#}", e);
            FATAL_EXIT_CODE
        }
    };

    std::process::exit(exit_code);
}
