//! Extension trait adding migration support to [`PgClient`].

use super::run_migration::{migration_status, run_pending_migrations};
use super::{MigrationResult, MigrationStatus};
use crate::{PgClient, PgResult};

/// Migration operations on a [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every embedded migration that has not run yet.
    ///
    /// Safe to call on every start-up.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>> + Send;

    /// Reports applied and pending migrations.
    fn migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>> + Send;
}

impl PgClientMigrationExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }

    async fn migration_status(&self) -> PgResult<MigrationStatus> {
        migration_status(self).await
    }
}
