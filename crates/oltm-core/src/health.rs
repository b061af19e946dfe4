//! Health reporting for storage backends.

use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Represents the operational status of a service.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Service is operating normally.
    #[default]
    Healthy,
    /// Service answers but slower than expected.
    Degraded,
    /// Service is not operational.
    Unhealthy,
}

/// Result of a single health probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Current service status.
    pub status: ServiceStatus,
    /// Round-trip time of the probe.
    pub response: Option<Duration>,
    /// Optional message describing the current state.
    pub message: Option<String>,
    /// Timestamp when the probe was performed.
    pub checked_at: Timestamp,
}

impl ServiceHealth {
    /// Creates a healthy report.
    pub fn healthy() -> Self {
        Self {
            status: ServiceStatus::Healthy,
            response: None,
            message: None,
            checked_at: Timestamp::now(),
        }
    }

    /// Creates a degraded report.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Degraded,
            message: Some(message.into()),
            ..Self::healthy()
        }
    }

    /// Creates an unhealthy report.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Unhealthy,
            message: Some(message.into()),
            ..Self::healthy()
        }
    }

    /// Sets the response time for this probe.
    pub fn with_response_time(mut self, response_time: Duration) -> Self {
        self.response = Some(response_time);
        self
    }

    /// Returns `true` unless the service is unhealthy.
    pub fn is_operational(&self) -> bool {
        !matches!(self.status, ServiceStatus::Unhealthy)
    }
}
