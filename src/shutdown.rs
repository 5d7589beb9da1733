use crate::components::ComponentManager;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_break, ctrl_c};

/// Stop every countdown once the process is asked to exit, then release `start_page`
pub async fn handle_signals(
    shutdown_send: oneshot::Sender<()>,
    component_manager: Arc<ComponentManager>,
) {
    if let Some(signal_name) = wait_for_signal().await {
        info!("Received {}, initiating graceful shutdown", signal_name);
    }
    info!("Stopping {} countdown(s)", component_manager.len());

    match component_manager.shutdown_all().await {
        Ok(()) => info!("All countdowns stopped"),
        Err(e) => error!("Error stopping countdowns: {:?}", e),
    }

    let _ = shutdown_send.send(());
}

/// Name of the first termination signal received, `None` if no handler could be installed
#[cfg(unix)]
async fn wait_for_signal() -> Option<&'static str> {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to install signal handlers: {}", e);
            return None;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => Some("SIGTERM"),
        _ = sigint.recv() => Some("SIGINT"),
    }
}

#[cfg(windows)]
async fn wait_for_signal() -> Option<&'static str> {
    let (mut ctrlc, mut ctrlbreak) = match (ctrl_c(), ctrl_break()) {
        (Ok(ctrlc), Ok(ctrlbreak)) => (ctrlc, ctrlbreak),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to install signal handlers: {}", e);
            return None;
        }
    };

    tokio::select! {
        _ = ctrlc.recv() => Some("Ctrl+C"),
        _ = ctrlbreak.recv() => Some("Ctrl+Break"),
    }
}
