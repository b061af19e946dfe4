//! Liveness and database health handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use oltm_core::{CommentService, ServiceHealth};

use crate::extract::Json;
use crate::handler::Result;
use crate::handler::response::{DatabaseHealth, MonitorStatus};
use crate::service::ServiceState;

const TRACING_TARGET: &str = "oltm_server::handler::monitors";

#[tracing::instrument(skip_all)]
async fn health_status() -> Result<Json<MonitorStatus>> {
    Ok(Json(MonitorStatus::default()))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Liveness")
        .description("Reports that the API process is up. Does not touch the database.")
        .response::<200, Json<MonitorStatus>>()
}

#[tracing::instrument(skip_all)]
async fn database_status(
    State(service): State<CommentService>,
) -> Result<(StatusCode, Json<DatabaseHealth>)> {
    let health = service
        .health()
        .await
        .unwrap_or_else(|error| ServiceHealth::unhealthy(error.to_string()));

    let status_code = if health.is_operational() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        status = ?health.status,
        response_time = ?health.response,
        status_code = status_code.as_u16(),
        "Database health checked"
    );

    Ok((status_code, Json(DatabaseHealth::from(health))))
}

fn database_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Database health")
        .description("Runs a round-trip against the database and reports its latency.")
        .response::<200, Json<DatabaseHealth>>()
        .response::<503, Json<DatabaseHealth>>()
}

pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/api/health", get_with(health_status, health_status_docs))
        .api_route("/api/health/db", get_with(database_status, database_status_docs))
        .with_path_items(|item| item.tag("Monitors"))
}

#[cfg(test)]
mod tests {
    use oltm_core::mock::MemoryStore;
    use serde_json::Value;

    use super::*;
    use crate::handler::test::create_test_server_with_store;

    #[tokio::test]
    async fn liveness_reports_service() -> anyhow::Result<()> {
        let server = create_test_server_with_store(MemoryStore::new())?;

        let response = server.get("/api/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["ok"], true);
        assert_eq!(body["service"], "ol-time-muscle-api");
        assert!(body["checkedAt"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn database_probe_reports_latency() -> anyhow::Result<()> {
        let server = create_test_server_with_store(MemoryStore::new())?;

        let response = server.get("/api/health/db").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["ok"], true);
        assert_eq!(body["status"], "healthy");
        Ok(())
    }

    #[tokio::test]
    async fn offline_database_is_unavailable() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.set_offline(true);
        let server = create_test_server_with_store(store)?;

        let response = server.get("/api/health/db").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = response.json();
        assert_eq!(body["ok"], false);
        assert_eq!(body["status"], "unhealthy");
        Ok(())
    }
}
