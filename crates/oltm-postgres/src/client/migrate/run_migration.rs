use std::time::Instant;

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use super::{MigrationResult, MigrationStatus};
use crate::error::BoxError;
use crate::{
    MIGRATIONS, PgClient, PgError, PgResult, PooledConnection, TRACING_TARGET_MIGRATION,
};

type HarnessConnection = AsyncConnectionWrapper<PooledConnection>;

/// Applies all pending migrations.
///
/// The diesel harness is synchronous, so it runs on the blocking pool through
/// an [`AsyncConnectionWrapper`].
#[tracing::instrument(skip(pg), target = TRACING_TARGET_MIGRATION)]
pub async fn run_pending_migrations(pg: &PgClient) -> PgResult<MigrationResult> {
    let start = Instant::now();
    let mut conn: HarnessConnection = pg.get_pooled_connection().await?.into();
    let result = spawn_blocking(move || {
        conn.run_pending_migrations(MIGRATIONS).map(|versions| {
            versions
                .into_iter()
                .map(|version| version.to_string())
                .collect::<Vec<_>>()
        })
    })
    .await
    .map_err(|err| {
        tracing::error!(target: TRACING_TARGET_MIGRATION, error = %err, "Migration task failed to complete");
        PgError::Migration(err.into())
    })?;

    let duration = start.elapsed();
    let applied_versions = result.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?duration,
            error = %err,
            "Database migration failed"
        );
        PgError::Migration(err)
    })?;

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        duration = ?duration,
        migrations_count = applied_versions.len(),
        "Database migrations applied"
    );

    Ok(MigrationResult {
        duration,
        applied_versions,
    })
}

/// Lists applied and pending migrations.
#[tracing::instrument(skip(pg), target = TRACING_TARGET_MIGRATION)]
pub async fn migration_status(pg: &PgClient) -> PgResult<MigrationStatus> {
    let mut conn: HarnessConnection = pg.get_pooled_connection().await?.into();

    let status = spawn_blocking(move || {
        let applied = conn
            .applied_migrations()?
            .into_iter()
            .map(|version| version.to_string())
            .collect();
        let pending = conn
            .pending_migrations(MIGRATIONS)?
            .into_iter()
            .map(|migration| migration.name().to_string())
            .collect();
        Ok::<_, BoxError>(MigrationStatus::new(applied, pending))
    })
    .await
    .map_err(|err| PgError::Migration(err.into()))?
    .map_err(PgError::Migration)?;

    tracing::debug!(
        target: TRACING_TARGET_MIGRATION,
        applied = status.applied_versions.len(),
        pending = status.pending_versions.len(),
        "Migration status retrieved"
    );

    Ok(status)
}
