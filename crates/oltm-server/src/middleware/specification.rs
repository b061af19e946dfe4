//! OpenAPI document and Scalar UI.
//!
//! The document is generated from the `aide` annotations on every
//! [`ApiRouter`] route, so the comment and monitor handlers describe their
//! own inputs, outputs and error bodies.
//!
//! [`ApiRouter`]: aide::axum::ApiRouter

use aide::axum::ApiRouter;
use aide::openapi::{Info, OpenApi, Tag};
use aide::scalar::Scalar;
use axum::routing::{Router, get};
use axum::{Extension, Json};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// OpenAPI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Path which exposes the OpenAPI JSON document.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_JSON_PATH", default_value = "/api/openapi.json")
    )]
    pub open_api_json: String,

    /// Path which exposes the Scalar API reference UI.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_SCALAR_PATH", default_value = "/api/scalar")
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: "/api/openapi.json".to_owned(),
            scalar_ui: "/api/scalar".to_owned(),
        }
    }
}

/// Extension trait for [`ApiRouter`] serving its own OpenAPI document.
///
/// [`ApiRouter`]: aide::axum::ApiRouter
pub trait RouterOpenApiExt<S> {
    /// Finishes the router, adding the JSON document and the Scalar UI.
    fn with_open_api(self, config: &OpenApiConfig) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: &OpenApiConfig) -> Router<S> {
        async fn serve_openapi(Extension(api): Extension<OpenApi>) -> Json<OpenApi> {
            Json(api)
        }

        let mut api = OpenApi {
            info: api_info(),
            tags: vec![
                tag("Comments", "Threaded comments on vehicles and posts."),
                tag("Monitors", "Liveness and database probes."),
            ],
            ..OpenApi::default()
        };

        let scalar = Scalar::new(&config.open_api_json).with_title("Ol' Time Muscle API");
        let router = self
            .route(&config.scalar_ui, scalar.axum_route())
            .route(&config.open_api_json, get(serve_openapi));

        router.finish_api(&mut api).layer(Extension(api))
    }
}

fn api_info() -> Info {
    Info {
        title: "Ol' Time Muscle API".to_owned(),
        summary: Some("Comments for classic vehicle listings and posts".to_owned()),
        description: Some(
            "Read flat or threaded comment lists for a vehicle or a post, fetch single \
            comments and their replies, and post new comments as an authenticated user."
                .to_owned(),
        ),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        ..Info::default()
    }
}

fn tag(name: &str, description: &str) -> Tag {
    Tag {
        name: name.to_owned(),
        description: Some(description.to_owned()),
        ..Tag::default()
    }
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use oltm_core::mock::MemoryStore;
    use serde_json::Value;

    use super::*;
    use crate::handler::routes;
    use crate::handler::test::create_test_state;

    #[tokio::test]
    async fn serves_document_with_comment_routes() -> anyhow::Result<()> {
        let state = create_test_state(MemoryStore::new())?;
        let app: Router = routes()
            .with_open_api(&OpenApiConfig::default())
            .with_state(state);
        let server = TestServer::new(app)?;

        let response = server.get("/api/openapi.json").await;
        response.assert_status_ok();

        let document: Value = response.json();
        assert_eq!(document["info"]["title"], "Ol' Time Muscle API");
        assert!(document["paths"]["/api/comments"]["post"].is_object());
        assert!(document["paths"]["/api/comments/{commentId}/replies"]["get"].is_object());
        assert!(document["paths"]["/api/health/db"]["get"].is_object());
        Ok(())
    }

    #[tokio::test]
    async fn serves_scalar_ui() -> anyhow::Result<()> {
        let state = create_test_state(MemoryStore::new())?;
        let app: Router = routes()
            .with_open_api(&OpenApiConfig::default())
            .with_state(state);
        let server = TestServer::new(app)?;

        server.get("/api/scalar").await.assert_status_ok();
        Ok(())
    }
}
