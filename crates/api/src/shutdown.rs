//! Process signal handling for graceful shutdown.

use std::future::Future;
use std::io;

use tracing::{error, info};

/// Resolves once Ctrl+C or SIGTERM arrives.
///
/// A listener that cannot be registered never resolves, so a registration
/// failure does not trigger an immediate shutdown.
pub async fn shutdown_signal() {
    let ctrl_c = wait_for("Ctrl+C", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = wait_for("SIGTERM", async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

async fn wait_for<F>(name: &str, listener: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = listener.await {
        error!(error = %e, "Failed to listen for {}", name);
        std::future::pending::<()>().await;
    }
}
