//! Signal handling for graceful shutdown

use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use tokio::sync::watch;
use tracing::{info, warn};

/// Wait for shutdown signals (SIGTERM, SIGINT) or an operator quit
pub async fn shutdown_signal(mut quit: watch::Receiver<bool>) {
    let os_signal = async {
        let mut signals = match Signals::new([
            signal_hook::consts::SIGTERM,
            signal_hook::consts::SIGINT,
        ]) {
            Ok(signals) => signals,
            Err(e) => {
                warn!("Failed to create signal handler: {}", e);
                return std::future::pending::<()>().await;
            }
        };

        if let Some(signal) = signals.next().await {
            info!("Received signal: {}", signal);
        }
    };

    let quit_requested = async {
        if quit.wait_for(|quit| *quit).await.is_ok() {
            info!("Quit command received");
        } else {
            // Controller gone without a quit, leave it to OS signals
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = os_signal => {}
        _ = quit_requested => {}
    }
}
