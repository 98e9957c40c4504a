use tokio::signal;
use tracing::warn;

/// 等待 Ctrl+C（Unix 下还包括 SIGTERM）
///
/// 返回后进程直接退出，不等待进行中的上传完成。
pub async fn listen_for_shutdown() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = signal::ctrl_c() => res?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await?;

    warn!("Shutdown signal received, stopping...");
    Ok(())
}
