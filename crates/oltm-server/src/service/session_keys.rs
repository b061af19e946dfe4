//! Shared-secret keys for session tokens.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, encode};

use crate::extract::AuthClaims;
use crate::{Error, Result};

/// Tracing target for key management.
const TRACING_TARGET: &str = "oltm_server::service::session_keys";

/// HS256 keys derived from `JWT_SECRET`.
///
/// Cheap to clone; clones share the same keys.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
}

impl SessionKeys {
    /// Algorithm every session token must be signed with.
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Derives both keys from a shared secret.
    ///
    /// Fails when the secret is empty or whitespace.
    pub fn from_secret(secret: &str) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(Error::config("JWT_SECRET must not be empty"));
        }

        let inner = SessionKeysInner {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        };

        tracing::debug!(target: TRACING_TARGET, "Session keys initialized");
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Validation rules for incoming tokens.
    ///
    /// Only the signature algorithm is enforced; `exp` is checked when the
    /// token carries one.
    pub fn validation() -> Validation {
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.validate_aud = false;
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation
    }

    /// Signs `claims` into a compact token.
    pub fn sign(&self, claims: &AuthClaims) -> Result<String> {
        encode(&Header::new(Self::ALGORITHM), claims, self.encoding_key())
            .map_err(|e| Error::auth("failed to sign session token").with_source(e))
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}
