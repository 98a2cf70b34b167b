//! Listener supervision.
//!
//! # Responsibilities
//! - Bind to the configured address, synchronously, before serving starts
//! - Run the accept/serve loop on its own task
//! - Report serve-loop exit through an explicit result channel
//! - Drive graceful stop with a forced close past the deadline
//!
//! # Design Decisions
//! - Binding happens inside `start`, so `Serving` is never observed before
//!   the port is live
//! - The serve task is supervised, never fire-and-forget: its exit is
//!   delivered over a oneshot the shutdown coordinator selects on
//! - Serve-loop exit during `ShuttingDown` is the benign "listener closed"
//!   case; any other exit is fatal

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use thiserror::Error;
use tokio::sync::{oneshot, watch};

use crate::config::schema::ServiceConfig;
use crate::net::tls::load_tls_config;

/// Error type for listener startup.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to load the TLS certificate/key pair.
    #[error("failed to load TLS configuration: {0}")]
    Tls(std::io::Error),

    /// Failed to bind the listen address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

/// Unexpected serve-loop termination while the listener should be serving.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The accept/serve loop failed with an I/O error.
    #[error("serve loop failed: {0}")]
    Io(std::io::Error),

    /// The serve loop returned without being asked to stop.
    #[error("serve loop exited unexpectedly")]
    UnexpectedExit,
}

/// Lifecycle state of the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Bound but not yet handed to the serve task.
    Starting,
    /// Accept loop running.
    Serving,
    /// No longer accepting; in-flight requests draining.
    ShuttingDown,
    /// Terminal. Never re-enters `Serving`.
    Stopped,
}

/// How a graceful stop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// All in-flight work finished within the deadline.
    Graceful,
    /// The deadline elapsed; remaining connections were aborted.
    Forced,
}

/// Handle to the serving listener.
///
/// Exactly one exists per service instance. It is owned by the lifecycle
/// while serving and consumed by `shutdown`, so the stopped listener cannot
/// be restarted.
pub struct ListenerHandle {
    addr: SocketAddr,
    server: Handle,
    state_tx: watch::Sender<ListenerState>,
    serve_result: oneshot::Receiver<std::io::Result<()>>,
}

/// Bind the configured address and start serving `app` on a background task.
///
/// The bind is synchronous: once this returns, the port is live and the
/// handle reports `Serving`. TLS material is loaded before the socket is
/// bound so certificate problems fail startup outright.
pub async fn start(config: &ServiceConfig, app: Router) -> Result<ListenerHandle, ListenerError> {
    let ssl = &config.application.ssl;

    let tls = if ssl.enabled {
        let tls = load_tls_config(Path::new(&ssl.cert_path), Path::new(&ssl.key_path))
            .await
            .map_err(ListenerError::Tls)?;
        Some(tls)
    } else {
        None
    };

    let addr = config.application.bind_address();
    let listener = bind(&addr)?;
    let local_addr = listener.local_addr().map_err(|e| ListenerError::Bind {
        addr: addr.clone(),
        source: e,
    })?;

    let (state_tx, _) = watch::channel(ListenerState::Starting);
    let (result_tx, serve_result) = oneshot::channel();
    let server = Handle::new();

    let service = app.into_make_service();
    match tls {
        Some(tls) => {
            let serve = axum_server::from_tcp_rustls(listener, tls)
                .handle(server.clone())
                .serve(service);
            tokio::spawn(async move {
                let _ = result_tx.send(serve.await);
            });
        }
        None => {
            let serve = axum_server::from_tcp(listener)
                .handle(server.clone())
                .serve(service);
            tokio::spawn(async move {
                let _ = result_tx.send(serve.await);
            });
        }
    }

    // send_replace: plain send() is a no-op when no receiver is subscribed yet.
    state_tx.send_replace(ListenerState::Serving);

    let scheme = if ssl.enabled { "https" } else { "http" };
    tracing::info!(address = %local_addr, tls = ssl.enabled, "server listening");
    tracing::info!("health check at {scheme}://{local_addr}/health");
    tracing::info!("press Ctrl+C to shut down");

    Ok(ListenerHandle {
        addr: local_addr,
        server,
        state_tx,
        serve_result,
    })
}

fn bind(addr: &str) -> Result<std::net::TcpListener, ListenerError> {
    let listener = std::net::TcpListener::bind(addr).map_err(|e| ListenerError::Bind {
        addr: addr.to_string(),
        source: e,
    })?;
    // axum-server converts to a tokio listener internally.
    listener
        .set_nonblocking(true)
        .map_err(|e| ListenerError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
    Ok(listener)
}

impl ListenerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ListenerState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ListenerState> {
        self.state_tx.subscribe()
    }

    /// Wait for the serve task to exit while the listener should still be
    /// serving. Resolves only on unexpected termination.
    pub async fn serve_exited(&mut self) -> ServeError {
        match (&mut self.serve_result).await {
            Ok(Err(e)) => ServeError::Io(e),
            // A clean return without a stop request is still unexpected,
            // as is the serve task dropping its channel.
            Ok(Ok(())) | Err(_) => ServeError::UnexpectedExit,
        }
    }

    /// Graceful stop: stop accepting, let in-flight requests finish, and
    /// force-close whatever remains once `deadline` elapses.
    ///
    /// Consumes the handle; the listener ends in `Stopped` on both paths.
    pub async fn shutdown(mut self, deadline: Duration) -> ShutdownOutcome {
        self.state_tx.send_replace(ListenerState::ShuttingDown);
        self.server.graceful_shutdown(None);

        let outcome = match tokio::time::timeout(deadline, &mut self.serve_result).await {
            Ok(_) => ShutdownOutcome::Graceful,
            Err(_) => {
                self.server.shutdown();
                let _ = (&mut self.serve_result).await;
                ShutdownOutcome::Forced
            }
        };

        self.state_tx.send_replace(ListenerState::Stopped);
        tracing::info!(outcome = ?outcome, "listener stopped");
        outcome
    }
}

#[cfg(test)]
impl ListenerHandle {
    /// Handle wired to a caller-controlled serve result, already `Serving`.
    /// Lets tests end the serve task without a stop request.
    pub(crate) fn with_serve_result(
        serve_result: oneshot::Receiver<std::io::Result<()>>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ListenerState::Serving);
        Self {
            addr: ([127, 0, 0, 1], 0).into(),
            server: Handle::new(),
            state_tx,
            serve_result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_config() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.application.host = "127.0.0.1".to_string();
        config.application.port = 0;
        config
    }

    #[tokio::test]
    async fn start_binds_and_reports_serving() {
        let handle = start(&loopback_config(), Router::new()).await.unwrap();
        assert_eq!(handle.state(), ListenerState::Serving);
        assert_ne!(handle.local_addr().port(), 0);

        // Port is live before start returns.
        tokio::net::TcpStream::connect(handle.local_addr())
            .await
            .unwrap();

        handle.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn idle_shutdown_is_graceful_and_terminal() {
        let handle = start(&loopback_config(), Router::new()).await.unwrap();
        let addr = handle.local_addr();
        let mut states = handle.watch_state();

        let outcome = handle.shutdown(Duration::from_secs(1)).await;
        assert_eq!(outcome, ShutdownOutcome::Graceful);
        assert_eq!(*states.borrow_and_update(), ListenerState::Stopped);

        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn tls_with_bad_certificate_fails_before_bind() {
        let mut config = loopback_config();
        config.application.ssl.enabled = true;
        config.application.ssl.cert_path = "/nonexistent/cert.pem".to_string();
        config.application.ssl.key_path = "/nonexistent/key.pem".to_string();

        let result = start(&config, Router::new()).await;
        assert!(matches!(result, Err(ListenerError::Tls(_))));
    }

    #[tokio::test]
    async fn serve_task_error_is_unexpected() {
        let (result_tx, result_rx) = oneshot::channel();
        let mut handle = ListenerHandle::with_serve_result(result_rx);

        result_tx
            .send(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "accept failed",
            )))
            .unwrap();

        assert!(matches!(handle.serve_exited().await, ServeError::Io(_)));
    }

    #[tokio::test]
    async fn clean_serve_exit_without_stop_request_is_unexpected() {
        let (result_tx, result_rx) = oneshot::channel();
        let mut handle = ListenerHandle::with_serve_result(result_rx);

        result_tx.send(Ok(())).unwrap();

        assert!(matches!(
            handle.serve_exited().await,
            ServeError::UnexpectedExit
        ));
    }

    #[tokio::test]
    async fn dropped_serve_task_is_unexpected() {
        let (result_tx, result_rx) = oneshot::channel();
        let mut handle = ListenerHandle::with_serve_result(result_rx);

        drop(result_tx);

        assert!(matches!(
            handle.serve_exited().await,
            ServeError::UnexpectedExit
        ));
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let first = start(&loopback_config(), Router::new()).await.unwrap();

        let mut config = loopback_config();
        config.application.port = first.local_addr().port();
        let result = start(&config, Router::new()).await;
        assert!(matches!(result, Err(ListenerError::Bind { .. })));

        first.shutdown(Duration::from_secs(1)).await;
    }
}
