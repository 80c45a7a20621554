//! HTTP server with graceful shutdown

use crate::api::build_router;
use crate::state::AppState;
use netforge_core::config::ServerConfig;
use std::future::{Future, IntoFuture};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

pub struct ApiServer {
    state: Arc<AppState>,
    addr: SocketAddr,
    shutdown_timeout: Duration,
}

impl ApiServer {
    pub fn new(state: Arc<AppState>, config: &ServerConfig) -> Self {
        Self {
            state,
            addr: config.bind_address,
            shutdown_timeout: config.shutdown_timeout,
        }
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn run(self) -> io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve(listener, ctrl_c()).await
    }

    /// Serve on `listener` until `signal` resolves.
    ///
    /// In-flight requests get `shutdown_timeout` to finish; whatever is still
    /// open after that is dropped.
    pub async fn serve<F>(self, listener: TcpListener, signal: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(addr = %listener.local_addr()?, "netforge API listening");

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
        let graceful = async move {
            signal.await;
            info!("shutdown signal received, draining connections");
            let _ = shutdown_tx.send(());
        };

        let server = axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(graceful)
            .into_future();

        let timeout = self.shutdown_timeout;
        tokio::select! {
            result = server => result?,
            _ = async {
                if shutdown_rx.recv().await.is_ok() {
                    tokio::time::sleep(timeout).await;
                } else {
                    std::future::pending::<()>().await;
                }
            } => {
                warn!(?timeout, "shutdown timeout elapsed, dropping open connections");
            }
        }

        info!("server stopped");
        Ok(())
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C; shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netforge_core::{Config, TopologyStore};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_serves_until_signalled() {
        let config = Config::default();
        let store = Arc::new(TopologyStore::memory().unwrap());
        let state = Arc::new(AppState::from_config(store, &config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = ApiServer::new(state, &config.server);
        let handle = tokio::spawn(server.serve(listener, async move {
            let _ = stop_rx.await;
        }));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.ends_with("ok"));

        stop_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
