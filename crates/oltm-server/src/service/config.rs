//! Service configuration.

#[cfg(feature = "config")]
use clap::Args;
use oltm_core::CommentService;
use oltm_postgres::{PgClient, PgClientMigrationExt, PgConfig};
use serde::{Deserialize, Serialize};

use crate::service::{PgCommentStore, SessionKeys};
use crate::{Error, Result};

/// Tracing target for service start-up.
const TRACING_TARGET: &str = "oltm_server::service::config";

/// Configuration of the services behind the HTTP API.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres_config: PgConfig,

    /// Shared secret used to verify HS256 session tokens.
    #[cfg_attr(
        feature = "config",
        arg(long = "jwt-secret", env = "JWT_SECRET", hide_env_values = true)
    )]
    pub jwt_secret: String,
}

impl ServiceConfig {
    /// Creates a configuration from a database URL and a token secret.
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            postgres_config: PgConfig::new(database_url),
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Connects to Postgres and applies pending migrations.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = self.postgres_config.clone().build().map_err(|e| {
            Error::config("Invalid database configuration").with_source(e)
        })?;

        let result = pg_client.run_pending_migrations().await.map_err(|e| {
            Error::external("Failed to apply database migrations").with_source(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            database = %self.postgres_config.database_url_masked(),
            applied = result.applied_count(),
            "Database ready"
        );

        Ok(pg_client)
    }

    /// Builds the comment service over Postgres.
    pub async fn comment_service(&self) -> Result<CommentService> {
        let pg_client = self.connect_postgres().await?;
        Ok(CommentService::new(PgCommentStore::new(pg_client)))
    }

    /// Derives the session keys from the configured secret.
    pub fn session_keys(&self) -> Result<SessionKeys> {
        SessionKeys::from_secret(&self.jwt_secret)
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("postgres_config", &self.postgres_config)
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_secret() {
        let config = ServiceConfig::new("postgresql://localhost/oltm", "hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn empty_secret_fails() {
        let config = ServiceConfig::new("postgresql://localhost/oltm", "");
        assert!(config.session_keys().is_err());
    }
}
