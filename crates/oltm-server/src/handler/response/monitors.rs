//! Health check response types.

use jiff::Timestamp;
use oltm_core::{ServiceHealth, ServiceStatus};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name reported by the liveness probe.
pub const SERVICE_NAME: &str = "ol-time-muscle-api";

/// Liveness response.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    pub ok: bool,
    /// Service name.
    pub service: String,
    /// Application version.
    pub version: String,
    /// Timestamp when this status was generated.
    pub checked_at: Timestamp,
}

impl Default for MonitorStatus {
    fn default() -> Self {
        Self {
            ok: true,
            service: SERVICE_NAME.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            checked_at: Timestamp::now(),
        }
    }
}

/// Database health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl From<ServiceStatus> for DatabaseStatus {
    fn from(status: ServiceStatus) -> Self {
        match status {
            ServiceStatus::Healthy => Self::Healthy,
            ServiceStatus::Degraded => Self::Degraded,
            ServiceStatus::Unhealthy => Self::Unhealthy,
        }
    }
}

/// Database probe response.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    /// `true` unless the database is unhealthy.
    pub ok: bool,
    pub status: DatabaseStatus,
    /// Probe round-trip in milliseconds.
    pub response_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub checked_at: Timestamp,
}

impl From<ServiceHealth> for DatabaseHealth {
    fn from(health: ServiceHealth) -> Self {
        Self {
            ok: health.is_operational(),
            status: health.status.into(),
            response_time_ms: health
                .response
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            message: health.message,
            checked_at: health.checked_at,
        }
    }
}
