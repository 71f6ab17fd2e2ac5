//! Rivet entrypoint.
use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Once;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

mod cli;
mod commands;

use cli::Cli;

const LOG_FILE: &str = "rivet.log";

/// Route `tracing` output to `rivet.log` in the working directory, filtered
/// by `RUST_LOG`. The guard must live until exit so buffered lines flush.
fn configure_logging() -> Option<WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(Path::new("."), LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        // a subscriber is already installed
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();

    let cli = Cli::parse();
    info!(
        target: "runtime.startup",
        command = ?cli.command,
        config = ?cli.global.config,
        mode = cli.global.mode.as_deref(),
        "startup"
    );

    match commands::run(&cli.command, &cli.global).await {
        Ok(out) if out.ends_with('\n') => print!("{out}"),
        Ok(out) => println!("{out}"),
        Err(e) => {
            error!(target: "runtime", error = %format!("{e:#}"), "command_failed");
            return Err(e);
        }
    }
    info!(target: "runtime", "shutdown");
    Ok(())
}
