//! OS signal handling.
//!
//! SIGINT/SIGTERM stop the server gracefully without running the realm
//! shutdown countdown; the countdown is an operator action.

/// Completes when the process receives a termination signal.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = sigterm.recv() => {}
    }
    Ok(())
}

/// Completes when the process receives a termination signal.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Stop future for the server: resolves on a signal, never if none can be installed.
pub async fn stop_signal() {
    match wait_for_signal().await {
        Ok(()) => tracing::info!("Stop signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install signal handlers");
            std::future::pending::<()>().await;
        }
    }
}
