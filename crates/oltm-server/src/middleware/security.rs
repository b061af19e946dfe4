//! Cross-origin access for the browser client.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

/// Origin allowed when nothing is configured.
pub const DEFAULT_CLIENT_ORIGIN: &str = "http://localhost:3000";

const TRACING_TARGET: &str = "oltm_server::security::cors";

/// CORS configuration.
///
/// Credentials are always allowed, so the session cookie reaches the API
/// from the configured origins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// Origins allowed to call the API, comma separated.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "client-origin",
            env = "CLIENT_ORIGIN",
            value_delimiter = ',',
            default_value = DEFAULT_CLIENT_ORIGIN
        )
    )]
    pub allowed_origins: Vec<String>,

    /// How long browsers may cache a preflight response, in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_MAX_AGE", default_value = "3600")
    )]
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_CLIENT_ORIGIN.to_owned()],
            max_age_seconds: 3600,
        }
    }
}

impl CorsConfig {
    /// Creates a configuration allowing the given origins.
    pub fn new<I, T>(origins: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            allowed_origins: origins.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Parses the configured origins, skipping the ones that are not valid
    /// header values. Falls back to [`DEFAULT_CLIENT_ORIGIN`] when none is left.
    pub fn to_header_values(&self) -> Vec<HeaderValue> {
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(target: TRACING_TARGET, origin, "ignoring invalid origin");
                    None
                }
            })
            .collect();

        if origins.is_empty() {
            vec![HeaderValue::from_static(DEFAULT_CLIENT_ORIGIN)]
        } else {
            origins
        }
    }

    /// Builds the [`CorsLayer`].
    pub fn into_layer(self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(self.to_header_values())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true)
            .max_age(self.max_age())
    }
}

/// Extension trait for [`Router`] adding the CORS layer.
pub trait RouterSecurityExt<S> {
    fn with_security(self, cors: CorsConfig) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, cors: CorsConfig) -> Self {
        self.layer(cors.into_layer())
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    #[test]
    fn default_allows_local_client() {
        let origins = CorsConfig::default().to_header_values();
        assert_eq!(origins, vec![HeaderValue::from_static("http://localhost:3000")]);
    }

    #[test]
    fn skips_blank_origins() {
        let config = CorsConfig::new(["https://oltimemuscle.com", " ", ""]);
        let origins = config.to_header_values();
        assert_eq!(origins, vec![HeaderValue::from_static("https://oltimemuscle.com")]);
    }

    #[test]
    fn falls_back_when_nothing_valid() {
        let config = CorsConfig::new(["bad\norigin"]);
        let origins = config.to_header_values();
        assert_eq!(origins, vec![HeaderValue::from_static(DEFAULT_CLIENT_ORIGIN)]);
    }

    #[tokio::test]
    async fn allows_client_origin_with_credentials() -> anyhow::Result<()> {
        let router = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .with_security(CorsConfig::default());
        let server = TestServer::new(router)?;

        let response = server
            .get("/ping")
            .add_header(header::ORIGIN, HeaderValue::from_static(DEFAULT_CLIENT_ORIGIN))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            DEFAULT_CLIENT_ORIGIN
        );
        assert_eq!(
            response.header(header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
            "true"
        );
        Ok(())
    }
}
