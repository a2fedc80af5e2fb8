//! Graceful shutdown on process signals.
//!
//! A watcher task cancels the run's [`CancellationToken`] when SIGINT or
//! SIGTERM arrives. Every pending connect, read, write and backoff sleep
//! observes the token, so the run stops promptly and closes its socket.

use std::future::Future;

use tokio::{select, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Spawn a task that cancels `token` on SIGINT or SIGTERM.
///
/// The task ends on its own once `token` is cancelled by anyone else.
#[must_use]
pub fn spawn_signal_watcher(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(cancel_on(token, shutdown_signal()))
}

/// Cancel `token` when `signal` resolves, logging the signal name.
///
/// Returns early without logging if the token is cancelled first.
pub async fn cancel_on<F>(token: CancellationToken, signal: F)
where
    F: Future<Output = &'static str>,
{
    select! {
        biased;
        () = token.cancelled() => {}
        name = signal => {
            info!(action = "signal_received", result = "in_progress", signal = name);
            token.cancel();
        }
    }
}

async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(err) => {
                warn!(action = "signal_handler", result = "fail", error = %err);
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(err) => {
                warn!(action = "signal_handler", result = "fail", error = %err);
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    select! {
        name = ctrl_c => name,
        name = terminate => name,
    }
}
