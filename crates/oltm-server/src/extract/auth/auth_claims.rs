//! Session token claims.

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::decode;
use oltm_core::UserId;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::SessionKeys;

/// Claims carried by a session token.
///
/// `sub` may be a JSON number or a numeric string and must be a positive
/// integer; `exp` is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthClaims {
    #[serde(rename = "sub", with = "subject")]
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Expiry as seconds since the Unix epoch.
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl AuthClaims {
    /// Creates non-expiring claims for `user_id`.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            username: None,
            expires_at: None,
        }
    }

    /// Sets the expiry relative to now.
    pub fn expires_in(mut self, lifetime: SignedDuration) -> Self {
        let expires_at = Timestamp::now()
            .checked_add(lifetime)
            .unwrap_or(Timestamp::MAX);
        self.expires_at = Some(expires_at.as_second());
        self
    }

    /// Verifies `token` and returns its claims.
    ///
    /// Every failure maps to `401 Invalid session`.
    pub fn decode(token: &str, keys: &SessionKeys) -> Result<Self> {
        let validation = SessionKeys::validation();
        match decode::<Self>(token, keys.decoding_key(), &validation) {
            Ok(data) => Ok(data.claims),
            Err(error) => {
                tracing::debug!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    error = %error,
                    "Session token rejected"
                );
                Err(invalid_session())
            }
        }
    }
}

fn invalid_session() -> Error<'static> {
    ErrorKind::Unauthorized
        .with_message("Invalid session")
        .with_resource("authentication")
}

/// (De)serializes the `sub` claim.
mod subject {
    use oltm_core::UserId;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(user_id: &UserId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&user_id.0.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UserId, D::Error> {
        let id = match Raw::deserialize(deserializer)? {
            Raw::Number(id) => id,
            Raw::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| D::Error::custom("subject is not an integer"))?,
        };

        if id <= 0 {
            return Err(D::Error::custom("subject must be positive"));
        }

        Ok(UserId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_accepts_numbers_and_strings() -> anyhow::Result<()> {
        let claims: AuthClaims = serde_json::from_str(r#"{"sub": 7}"#)?;
        assert_eq!(claims.user_id, UserId(7));

        let claims: AuthClaims = serde_json::from_str(r#"{"sub": "42", "exp": 10}"#)?;
        assert_eq!(claims.user_id, UserId(42));
        assert_eq!(claims.expires_at, Some(10));
        Ok(())
    }

    #[test]
    fn subject_must_be_positive_integer() {
        for raw in [r#"{"sub": 0}"#, r#"{"sub": "-3"}"#, r#"{"sub": "abc"}"#, "{}"] {
            assert!(serde_json::from_str::<AuthClaims>(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn expired_token_is_rejected() -> anyhow::Result<()> {
        let keys = SessionKeys::from_secret("secret")?;
        let token = keys.sign(&AuthClaims::new(UserId(1)).expires_in(SignedDuration::from_secs(-60)))?;
        let error = AuthClaims::decode(&token, &keys).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        assert_eq!(error.message(), Some("Invalid session"));
        Ok(())
    }

    #[test]
    fn wrong_secret_is_rejected() -> anyhow::Result<()> {
        let token = SessionKeys::from_secret("one")?.sign(&AuthClaims::new(UserId(1)))?;
        let keys = SessionKeys::from_secret("two")?;
        assert!(AuthClaims::decode(&token, &keys).is_err());
        Ok(())
    }
}
