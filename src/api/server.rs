//! HTTP server lifecycle: bind → spawn → graceful shutdown.

use std::net::SocketAddr;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Handle to a running server. Dropping it does not stop the server; call
/// [`ServerHandle::shutdown`] and then await [`ServerHandle::finished`].
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Signal the server to stop accepting connections and drain.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Wait for the server task to exit.
    pub async fn finished(self) {
        let _ = self.task.await;
    }
}

/// Bind `addr` and serve the API in a background task.
pub async fn serve(ctx: ApiContext, addr: SocketAddr) -> std::io::Result<ServerHandle> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    let app = api_router(ctx);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("shutdown signal received");
        };

        tracing::info!(%addr, "listening");
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("server error: {e}");
        }
        tracing::info!("server stopped");
    });

    Ok(ServerHandle {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenKeys;
    use crate::db::Database;

    fn test_ctx(dir: &tempfile::TempDir) -> ApiContext {
        let db = Database::open(&dir.path().join("server-test.db")).unwrap();
        ApiContext::new(db, TokenKeys::from_secret(b"server-test-secret-0123456789abcd"))
    }

    #[tokio::test]
    async fn starts_on_ephemeral_port_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_ctx(&dir);

        let mut server = serve(ctx, "127.0.0.1:0".parse().unwrap()).await.unwrap();
        assert_ne!(server.addr.port(), 0);

        // The listener accepts while running.
        let probe = tokio::net::TcpStream::connect(server.addr).await;
        assert!(probe.is_ok());
        drop(probe);

        server.shutdown();
        server.finished().await;
    }
}
