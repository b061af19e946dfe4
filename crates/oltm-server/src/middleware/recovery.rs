//! Request timeouts and panic recovery.
//!
//! Both failures answer with the regular JSON error body, so clients never
//! see an empty `408` or a dropped connection.

use std::any::Any;
use std::future::ready;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::Args;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handler::{Error, ErrorKind};

const TRACING_TARGET_ERROR: &str = "oltm_server::recovery::error";

const TRACING_TARGET_PANIC: &str = "oltm_server::recovery::panic";

type ResponseFut = BoxFuture<'static, Response>;
type Panic = Box<dyn Any + Send + 'static>;

/// Recovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Seconds a request may take before it is answered with `408`.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REQUEST_TIMEOUT", default_value = "30")
    )]
    pub request_timeout: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            request_timeout: 30,
        }
    }
}

impl RecoveryConfig {
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            request_timeout: secs,
        }
    }

    #[inline]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Extension trait for [`Router`] adding timeout and panic recovery.
pub trait RouterRecoveryExt<S> {
    /// Wraps the router so that slow requests answer `408 request_timeout`
    /// and panics answer `500 internal_server_error`.
    fn with_recovery(self, config: &RecoveryConfig) -> Self;

    fn with_default_recovery(self) -> Self;
}

impl<S> RouterRecoveryExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, config: &RecoveryConfig) -> Self {
        let middlewares = ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .layer(CatchPanicLayer::custom(catch_panic))
            .layer(TimeoutLayer::new(config.request_timeout()));

        self.layer(middlewares)
    }

    fn with_default_recovery(self) -> Self {
        self.with_recovery(&RecoveryConfig::default())
    }
}

fn handle_error(err: tower::BoxError) -> ResponseFut {
    let error = if err.is::<Elapsed>() {
        tracing::warn!(
            target: TRACING_TARGET_ERROR,
            error = %err,
            "request timeout exceeded"
        );

        Error::new(ErrorKind::RequestTimeout)
    } else {
        tracing::error!(
            target: TRACING_TARGET_ERROR,
            error = %err,
            "unknown middleware error"
        );

        Error::new(ErrorKind::InternalServerError).with_context(err.to_string())
    };

    ready(error.into_response()).boxed()
}

fn catch_panic(err: Panic) -> Response {
    let message = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic type");

    tracing::error!(
        target: TRACING_TARGET_PANIC,
        message = %message,
        "service panic"
    );

    ErrorKind::InternalServerError.into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum_test::TestServer;
    use serde_json::Value;

    use super::*;

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "late"
    }

    async fn boom() -> &'static str {
        panic!("handler exploded")
    }

    async fn fine() -> &'static str {
        "ok"
    }

    fn server(timeout: Duration) -> anyhow::Result<TestServer> {
        let config = RecoveryConfig {
            request_timeout: timeout.as_secs(),
        };

        let router = Router::new()
            .route("/slow", get(slow))
            .route("/boom", get(boom))
            .route("/fine", get(fine))
            .with_recovery(&config);

        Ok(TestServer::new(router)?)
    }

    #[tokio::test]
    async fn slow_request_is_request_timeout() -> anyhow::Result<()> {
        let server = server(Duration::from_secs(1))?;

        let response = server.get("/slow").await;
        response.assert_status(StatusCode::REQUEST_TIMEOUT);

        let body: Value = response.json();
        assert_eq!(body["name"], "request_timeout");
        Ok(())
    }

    #[tokio::test]
    async fn panic_is_internal_server_error() -> anyhow::Result<()> {
        let server = server(Duration::from_secs(30))?;

        let response = server.get("/boom").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = response.json();
        assert_eq!(body["name"], "internal_server_error");
        Ok(())
    }

    #[tokio::test]
    async fn passes_through_fast_requests() -> anyhow::Result<()> {
        let server = server(Duration::from_secs(30))?;

        let response = server.get("/fine").await;
        response.assert_status_ok();
        response.assert_text("ok");
        Ok(())
    }

    #[test]
    fn timeout_in_seconds() {
        let config = RecoveryConfig::with_timeout_secs(12);
        assert_eq!(config.request_timeout(), Duration::from_secs(12));
    }
}
