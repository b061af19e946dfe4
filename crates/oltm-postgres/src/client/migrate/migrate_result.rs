//! Migration status and outcome types.

use std::time::Duration;

/// Applied and pending migrations of a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Applied migration versions in chronological order.
    pub applied_versions: Vec<String>,
    /// Names of embedded migrations not yet applied.
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    /// Creates a new migration status.
    pub fn new(applied_versions: Vec<String>, pending_versions: Vec<String>) -> Self {
        Self {
            applied_versions,
            pending_versions,
        }
    }

    /// Returns the last applied migration version, if any.
    pub fn last_applied_version(&self) -> Option<&str> {
        self.applied_versions.last().map(String::as_str)
    }

    /// Returns true if all migrations have been applied.
    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Wall-clock time spent.
    pub duration: Duration,
    /// Versions applied by this run.
    pub applied_versions: Vec<String>,
}

impl MigrationResult {
    /// Returns the number of migrations applied by this run.
    #[inline]
    pub fn applied_count(&self) -> usize {
        self.applied_versions.len()
    }
}
