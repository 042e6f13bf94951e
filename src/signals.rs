//! OS signal wiring for graceful shutdown

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Spawns listeners that flip `shutdown` to `true` on SIGINT (and SIGTERM on Unix)
///
/// Each listener owns a clone of the sender. The caller must keep `shutdown`
/// alive for the whole run: a listener that dies then drops only its clone,
/// and the poll loop keeps going instead of reading a closed channel as a
/// stop request. On Unix the handlers are registered before this returns.
pub fn spawn_signal_listeners(
    shutdown: &watch::Sender<bool>,
) -> std::io::Result<Vec<JoinHandle<()>>> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut handles = Vec::new();
        for (kind, name) in [
            (SignalKind::interrupt(), "SIGINT"),
            (SignalKind::terminate(), "SIGTERM"),
        ] {
            let mut stream = signal(kind)?;
            let tx = shutdown.clone();
            handles.push(tokio::spawn(async move {
                if stream.recv().await.is_some() {
                    tracing::info!(signal = name, "Shutdown signal received");
                    let _ = tx.send(true);
                }
            }));
        }
        Ok(handles)
    }

    #[cfg(not(unix))]
    {
        let tx = shutdown.clone();
        Ok(vec![tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!(signal = "ctrl_c", "Shutdown signal received");
                    let _ = tx.send(true);
                }
                Err(e) => tracing::warn!(error = %e, "Failed to listen for Ctrl+C"),
            }
        })])
    }
}
