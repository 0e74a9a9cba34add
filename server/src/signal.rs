use log::{debug, error};
use tokio::sync::watch;

/// Spawns a task that waits for ctrl-c (or SIGTERM on unix) and flips the
/// returned receiver once.
pub fn shutdown_channel() -> watch::Receiver<u8> {
    let (signal_tx, signal_rx) = watch::channel(0_u8);

    tokio::spawn(async move {
        wait_shutdown().await;
        if let Err(e) = signal_tx.send(1) {
            error!("error, shutdown signal, {:?}", e);
        }
    });

    signal_rx
}

#[cfg(windows)]
async fn wait_shutdown() {
    match tokio::signal::ctrl_c().await {
        Ok(_) => debug!("recv ctrl_c, shutdown"),
        Err(e) => debug!("error, ctrl_c, {:?}", e),
    }
}

#[cfg(unix)]
async fn wait_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(v) => v,
        Err(e) => {
            error!("error, install SIGTERM handler, {:?}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = terminate.recv() => {
            debug!("recv unix terminate signal");
        },
        s = tokio::signal::ctrl_c() => {
            debug!("recv unix ctrl_c signal, {:?}", s);
        }
    }
}
