//! HTTP server start-up and lifecycle.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::{Result, ServerError, shutdown_signal};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

type GracefulSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Binds the configured address and serves `app` until a shutdown signal.
///
/// After the signal, in-flight requests get `shutdown_timeout` to finish
/// before the remaining connections are dropped.
pub async fn serve(app: Router, config: &ServerConfig) -> Result<()> {
    let server_addr = config.server_addr();

    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        let error = ServerError::bind_error(server_addr, err);
        if let Some(suggestion) = error.suggestion() {
            tracing::info!(
                target: TRACING_TARGET_SERVER_STARTUP,
                suggestion,
                "Recovery suggestion"
            );
        }
        error
    })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "Server is ready and listening for connections"
    );

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server bound to all interfaces (0.0.0.0), ensure firewall is configured"
        );
    }

    serve_with_shutdown(config, shutdown_signal(), |signal| {
        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .into_future()
    })
    .await
}

/// Runs the server future built by `serve_fn`, bounding the drain that
/// follows `signal` by the configured shutdown timeout.
pub(crate) async fn serve_with_shutdown<S, F>(
    config: &ServerConfig,
    signal: S,
    serve_fn: impl FnOnce(GracefulSignal) -> F,
) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
    F: Future<Output = std::io::Result<()>>,
{
    let start_time = Instant::now();
    let shutdown_timeout = config.shutdown_timeout();

    let notify = Arc::new(Notify::new());
    let signalled = Arc::clone(&notify);
    let graceful: GracefulSignal = Box::pin(async move {
        signal.await;
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            timeout_secs = shutdown_timeout.as_secs(),
            "Graceful shutdown initiated"
        );
        signalled.notify_one();
    });

    let deadline = async {
        notify.notified().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    let result = tokio::select! {
        result = serve_fn(graceful) => result.map_err(ServerError::Runtime),
        () = deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                "Shutdown timeout elapsed, dropping remaining connections"
            );
            Ok(())
        }
    };

    match &result {
        Ok(()) => tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            uptime_secs = start_time.elapsed().as_secs(),
            "Shutdown completed"
        ),
        Err(err) => tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %err,
            uptime_secs = start_time.elapsed().as_secs(),
            "Server encountered an error"
        ),
    }

    result
}
