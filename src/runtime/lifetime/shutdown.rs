use actix_web::dev::ServerHandle;
use tokio::signal;
use tracing::{error, warn};

/// 等待 Ctrl+C 或 SIGTERM
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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
}

/// 收到信号后停止接收新连接，进行中的请求在 `shutdown_timeout` 内完成
pub async fn listen_for_shutdown(handle: ServerHandle) {
    wait_for_signal().await;
    warn!("Shutdown signal received, initiating graceful shutdown...");
    handle.stop(true).await;
}
