//! dockhand - entry point
//!
//! Parses CLI arguments, provisions the centrally declared servers, then
//! feeds console events into the control panel until EOF or a shutdown
//! signal.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use dockhand::config::{Args, Config};
use dockhand::console::{run_event_loop, ConsoleTransport};
use dockhand::engine::CliEngine;
use dockhand::error::Result;
use dockhand::panel::ControlPanel;
use dockhand::ssh::{RemoteExecutor, SshProvisioner, SshRunner};

#[tokio::main]
async fn main() -> Result<()> {
    // Menus go to stdout; logs stay on stderr
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::INFO.into())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_args(args)?;

    info!("dockhand v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        timeout_ms = config.timeout.as_millis() as u64,
        workers = config.workers,
        declared_servers = config.env_servers.len(),
        "configuration loaded"
    );

    let executor = Arc::new(RemoteExecutor::new());
    let provisioner = Arc::new(SshProvisioner::new(executor.clone(), config.timeout));
    let runner = Arc::new(SshRunner::new(executor, config.timeout));
    let engine = Arc::new(CliEngine::new());
    let transport = Arc::new(ConsoleTransport::new());

    let panel = Arc::new(ControlPanel::new(
        &config,
        provisioner,
        runner,
        engine,
        transport.clone(),
    ));

    // Sequential startup pass; failing entries are logged and skipped
    let declared = config.env_servers.clone();
    panel.bootstrap_environment(declared).await;
    let (environment, _) = panel.server_counts(0).await;
    info!(environment, "startup provisioning pass finished");

    tokio::select! {
        _ = run_event_loop(panel, transport) => {
            info!("event loop finished");
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
    }

    info!("dockhand stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            Ok(sigterm) => sigterm,
            Err(_) => {
                let _ = ctrl_c.await;
                return;
            }
        };
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
