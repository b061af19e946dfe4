//! Authenticated caller extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::extract::CookieJar;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use derive_more::Deref;
use oltm_core::UserId;

use super::AuthClaims;
use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::SessionKeys;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Verified session of the caller.
///
/// The token is read from `Authorization: Bearer` first and from the
/// [`SESSION_COOKIE`] cookie second. Verified claims are cached in the request
/// extensions.
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct AuthState(pub AuthClaims);

impl AuthState {
    #[inline]
    #[must_use]
    pub const fn from_verified_claims(claims: AuthClaims) -> Self {
        Self(claims)
    }

    #[inline]
    pub fn user_id(&self) -> UserId {
        self.0.user_id
    }

    /// Returns the raw token of the request, if any.
    async fn find_token<S>(parts: &mut Parts, state: &S) -> Option<String>
    where
        S: Send + Sync,
    {
        type BearerHeader = TypedHeader<Authorization<Bearer>>;

        // A malformed Authorization header falls through to the cookie.
        if let Ok(TypedHeader(Authorization(bearer))) =
            <BearerHeader as FromRequestParts<S>>::from_request_parts(parts, state).await
        {
            let token = bearer.token().trim();
            if !token.is_empty() {
                return Some(token.to_owned());
            }
        }

        let jar = CookieJar::from_headers(&parts.headers);
        jar.get(SESSION_COOKIE)
            .map(|cookie| cookie.value().trim())
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send,
    SessionKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        let Some(token) = Self::find_token(parts, state).await else {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                path = %parts.uri.path(),
                "Request without session token"
            );

            return Err(ErrorKind::Unauthorized
                .with_message("Not authenticated")
                .with_resource("authentication"));
        };

        let keys = SessionKeys::from_ref(state);
        let claims = AuthClaims::decode(&token, &keys)?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            user_id = %claims.user_id,
            "Session verified"
        );

        let auth_state = Self::from_verified_claims(claims);
        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}

impl aide::OperationInput for AuthState {}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use axum::http::header::{AUTHORIZATION, COOKIE};
    use oltm_core::mock::MemoryStore;

    use super::*;
    use crate::handler::test::{bearer_token, create_test_state};

    fn parts(headers: &[(axum::http::HeaderName, String)]) -> anyhow::Result<Parts> {
        let mut builder = Request::builder().uri("/api/comments");
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        let (parts, ()) = builder.body(())?.into_parts();
        Ok(parts)
    }

    #[tokio::test]
    async fn reads_bearer_header() -> anyhow::Result<()> {
        let state = create_test_state(MemoryStore::new())?;
        let token = bearer_token(7)?;
        let mut parts = parts(&[(AUTHORIZATION, format!("Bearer {token}"))])?;

        let auth_state = AuthState::from_request_parts(&mut parts, &state).await?;
        assert_eq!(auth_state.user_id(), UserId(7));
        assert!(parts.extensions.get::<AuthState>().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_header_falls_back_to_cookie() -> anyhow::Result<()> {
        let state = create_test_state(MemoryStore::new())?;
        let token = bearer_token(3)?;
        let mut parts = parts(&[
            (AUTHORIZATION, "Basic Zm9vOmJhcg==".to_owned()),
            (COOKIE, format!("{SESSION_COOKIE}={token}")),
        ])?;

        let auth_state = AuthState::from_request_parts(&mut parts, &state).await?;
        assert_eq!(auth_state.user_id(), UserId(3));
        Ok(())
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() -> anyhow::Result<()> {
        let state = create_test_state(MemoryStore::new())?;
        let mut parts = parts(&[])?;

        let Err(error) = AuthState::from_request_parts(&mut parts, &state).await else {
            anyhow::bail!("request without a token was accepted");
        };
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        Ok(())
    }
}
