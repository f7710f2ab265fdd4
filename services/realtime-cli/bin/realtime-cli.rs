//! Main Entrypoint for the Realtime CLI
//!
//! This binary is responsible for:
//! 1. Parsing flags and loading configuration from the environment.
//! 2. Dialing the Realtime API.
//! 3. Running the session until input ends or the process is interrupted.

use anyhow::Context;
use clap::Parser;
use openai_realtime::{WriterConfig, connect, realtime_url};
use realtime_cli::{cli::Cli, config::Config, input::spawn_stdin_reader};
use realtime_core::{
    console::StdoutConsole,
    dispatcher::DispatchSettings,
    session::{Session, SessionSettings},
    tools::ToolRegistry,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, error, info};

/// Upper bound on the WebSocket handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(15);

/// Upper bound on a single frame write.
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Cancels `cancel` on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Received shutdown signal.");
    cancel.cancel();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Flags and Configuration ---
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    let log_level = if cli.debug { Level::DEBUG } else { config.log_level };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
    debug!(instructions = %config.instructions, path = %config.instructions_path.display(), "Loaded instructions.");

    // --- 3. Connect ---
    let url = realtime_url(&config.realtime_url, &cli.model);
    let (sink, source) = connect(&url, &config.api_key, HANDSHAKE_TIMEOUT)
        .await
        .context("dial failed")?;
    println!("Connected to {url}");
    debug!("WebSocket connected, ready to send session.");

    // --- 4. Run the Session ---
    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    let settings = SessionSettings {
        instructions: config.instructions,
        dispatch: DispatchSettings {
            debug: cli.debug,
            ..DispatchSettings::default()
        },
        writer: WriterConfig {
            write_timeout: WRITE_TIMEOUT,
            ..WriterConfig::default()
        },
    };
    let session = Session::new(settings, ToolRegistry::with_builtins(), StdoutConsole);

    println!("Type a message. Ctrl+C to exit.");
    session
        .run(source, sink, spawn_stdin_reader(), cancel)
        .await?;

    info!("Shutting down");
    Ok(())
}
