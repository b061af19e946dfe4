//! All `aide::axum::`[`ApiRouter`]s with related handlers.
//!
//! Every route is mounted under `/api`. Unknown paths answer with a
//! `not_found` JSON error.
//!
//! [`ApiRouter`]: aide::axum::ApiRouter

mod comments;
mod error;
mod monitors;
pub mod request;
pub mod response;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns the complete API router.
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(comments::routes())
        .merge(monitors::routes())
        .fallback(fallback)
}

#[cfg(test)]
pub(crate) mod test {
    use aide::axum::ApiRouter;
    use axum::Router;
    use axum_test::TestServer;
    use oltm_core::mock::MemoryStore;
    use oltm_core::{CommentService, UserId};

    use crate::extract::AuthClaims;
    use crate::service::{ServiceState, SessionKeys};

    /// Secret used to sign tokens in tests.
    pub const TEST_SECRET: &str = "test-secret";

    /// Returns a state over `store` with [`TEST_SECRET`] keys.
    pub fn create_test_state(store: MemoryStore) -> anyhow::Result<ServiceState> {
        let keys = SessionKeys::from_secret(TEST_SECRET)?;
        Ok(ServiceState::new(CommentService::new(store), keys))
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub fn create_test_server_with_state(
        router: ApiRouter<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app: Router = router.with_state(state).into();
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with every route over `store`.
    pub fn create_test_server_with_store(store: MemoryStore) -> anyhow::Result<TestServer> {
        let state = create_test_state(store)?;
        create_test_server_with_state(super::routes(), state)
    }

    /// Returns a bearer token for `user_id`.
    pub fn bearer_token(user_id: i64) -> anyhow::Result<String> {
        let keys = SessionKeys::from_secret(TEST_SECRET)?;
        Ok(keys.sign(&AuthClaims::new(UserId(user_id)))?)
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() -> anyhow::Result<()> {
        let server = create_test_server_with_store(MemoryStore::new())?;

        let response = server.get("/api/nope").await;
        response.assert_status_not_found();

        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }
}
