//! Termination signal handling.
//!
//! The signal only wakes the shutdown path; registry teardown then runs on
//! an ordinary task context, never inside a signal handler.

use tokio::signal;
use tracing::info;

/// Wait for a termination signal (Ctrl+C, plus SIGTERM on unix).
///
/// # Errors
/// Returns an error if a signal handler cannot be installed.
pub async fn wait_for_shutdown() -> crate::Result<()> {
    tokio::select! {
        result = wait_ctrl_c() => result?,
        result = wait_sigterm() => result?,
    }
    info!("shutdown signal received");
    Ok(())
}

async fn wait_ctrl_c() -> crate::Result<()> {
    signal::ctrl_c().await?;
    Ok(())
}

#[cfg(unix)]
async fn wait_sigterm() -> crate::Result<()> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    sigterm.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_sigterm() -> crate::Result<()> {
    std::future::pending::<()>().await;
    Ok(())
}
