//! HTTP handlers.

use crate::api::AppState;
use crate::error::ScanError;
use crate::models::{Domain, NewScan, ScanRecord};
use crate::report::{export_filename, export_xlsx, XLSX_MIME};
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{field, info, info_span, Instrument, Span};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/health", get(health_handler))
        .route("/api/scan", post(scan_handler))
        .route("/api/scans", get(list_scans_handler))
        .route("/api/scan/:id", get(get_scan_handler))
        .route("/api/scan/:id/export", get(export_scan_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ScanRequest {
    domain: String,
}

async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Welcome to the OSINT scan API" }))
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn scan_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanRecord>, ScanError> {
    let domain = Domain::parse(&request.domain)?;

    let span = info_span!("scan", domain = %domain, scan_id = field::Empty);
    let record = run_and_store(&state, domain).instrument(span).await?;

    Ok(Json(record))
}

/// Run a scan and persist it. Runs inside the request's `scan` span.
async fn run_and_store(state: &AppState, domain: Domain) -> Result<ScanRecord, ScanError> {
    let started_at = Utc::now();
    let outcome = state.orchestrator.run_scan(&domain).await?;
    let finished_at = Utc::now();

    let record = state
        .store
        .insert(NewScan {
            domain,
            started_at,
            finished_at,
            outcome,
        })
        .await?;

    Span::current().record("scan_id", record.id);
    info!(
        subdomains = record.summary.subdomain_count,
        emails = record.summary.email_count,
        "Scan stored"
    );

    Ok(record)
}

async fn list_scans_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ScanRecord>>, ScanError> {
    Ok(Json(state.store.list().await?))
}

async fn get_scan_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ScanRecord>, ScanError> {
    Ok(Json(state.store.get(id).await?))
}

async fn export_scan_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ScanError> {
    let record = state.store.get(id).await.map_err(|e| match e {
        ScanError::NotFound(id) => ScanError::NotFound(id),
        other => ScanError::Export(other.to_string()),
    })?;

    let data = export_xlsx(&record.artifacts)?;
    let filename = export_filename(&record);

    info!(scan_id = record.id, bytes = data.len(), "Exported {}", filename);

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        data,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::tools::ToolDescriptor;
    use crate::scanner::{ProcessRunner, ScanOrchestrator};
    use crate::storage::ScanStore;
    use axum::http::StatusCode;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn state_with_tools(tmp: &TempDir, tools: Vec<ToolDescriptor>) -> Arc<AppState> {
        let orchestrator =
            ScanOrchestrator::new(tools, ProcessRunner::new(Duration::from_secs(10)), 2);
        let store = ScanStore::open(tmp.path()).await.unwrap();
        Arc::new(AppState::new(orchestrator, store))
    }

    async fn echo_state(tmp: &TempDir) -> Arc<AppState> {
        state_with_tools(
            tmp,
            vec![
                ToolDescriptor::new("harvester", "echo", &["www.{domain} api.{domain}"]),
                ToolDescriptor::new("amass", "echo", &["api.{domain}"]),
            ],
        )
        .await
    }

    fn request(domain: &str) -> Json<ScanRequest> {
        Json(ScanRequest {
            domain: domain.to_string(),
        })
    }

    #[tokio::test]
    async fn test_scan_then_fetch() {
        let tmp = TempDir::new().unwrap();
        let state = echo_state(&tmp).await;

        let Json(record) = scan_handler(State(state.clone()), request("  Example.com "))
            .await
            .unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(record.domain, "example.com");
        assert_eq!(
            record.artifacts.subdomains,
            vec!["api.example.com", "www.example.com"]
        );
        assert_eq!(record.summary.subdomain_count, 2);
        assert_eq!(record.raw.len(), 2);
        assert!(record.finished_at >= record.started_at);

        let Json(fetched) = get_scan_handler(State(state.clone()), Path(1))
            .await
            .unwrap();
        assert_eq!(fetched, record);

        let Json(all) = list_scans_handler(State(state)).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_domain_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let state = echo_state(&tmp).await;

        let err = scan_handler(State(state.clone()), request("localhost"))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        // Nothing was run or stored.
        let Json(all) = list_scans_handler(State(state)).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_scan_with_missing_tools_still_succeeds() {
        let tmp = TempDir::new().unwrap();
        let state = state_with_tools(
            &tmp,
            vec![
                ToolDescriptor::harvester("/nonexistent/theHarvester"),
                ToolDescriptor::amass("/nonexistent/amass"),
            ],
        )
        .await;

        let Json(record) = scan_handler(State(state), request("example.com"))
            .await
            .unwrap();

        assert!(record.artifacts.subdomains.is_empty());
        assert!(record.artifacts.emails.is_empty());
        assert_eq!(record.raw[0].tool, "theHarvester");
        assert_eq!(record.raw[1].tool, "amass");
    }

    #[tokio::test]
    async fn test_unknown_scan_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let state = echo_state(&tmp).await;

        let err = get_scan_handler(State(state.clone()), Path(99))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let response = export_scan_handler(State(state), Path(99))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_download() {
        let tmp = TempDir::new().unwrap();
        let state = echo_state(&tmp).await;
        let Json(record) = scan_handler(State(state.clone()), request("example.com"))
            .await
            .unwrap();
        assert_eq!(record.id, 1);

        let response = export_scan_handler(State(state), Path(1))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_MIME);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"scan_1_example.com.xlsx\""
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_export_of_corrupt_record_fails_cleanly() {
        let tmp = TempDir::new().unwrap();
        let state = echo_state(&tmp).await;
        std::fs::write(tmp.path().join("5.json"), "garbage").unwrap();

        let response = export_scan_handler(State(state), Path(5))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // The stored file is left as it was.
        let content = std::fs::read_to_string(tmp.path().join("5.json")).unwrap();
        assert_eq!(content, "garbage");
    }

    #[tokio::test]
    async fn test_health() {
        let response = health_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
