use super::ApiClient;
use super::types::{GenerateReportRequest, Page, Report};
use crate::error::ApiResult;
use reqwest::Method;
use std::path::{Path, PathBuf};

pub(crate) trait ReportsApi {
    async fn get_reports(&self, page: u32) -> ApiResult<Page<Report>>;
    async fn generate_report(&self, incident_id: i64, observations: &str) -> ApiResult<Report>;
    /// Raw PDF bytes.
    async fn download_report(&self, id: i64) -> ApiResult<Vec<u8>>;
}

impl ReportsApi for ApiClient {
    async fn get_reports(&self, page: u32) -> ApiResult<Page<Report>> {
        self.page(
            self.request(Method::GET, "rapports")
                .query(&[("page", page.to_string())]),
        )
        .await
    }

    async fn generate_report(&self, incident_id: i64, observations: &str) -> ApiResult<Report> {
        tracing::info!(incident_id, "generating report");
        let body = GenerateReportRequest {
            observations: observations.to_string(),
        };
        self.data(
            self.request(Method::POST, &format!("rapports/incidents/{incident_id}"))
                .json(&body),
        )
        .await
    }

    async fn download_report(&self, id: i64) -> ApiResult<Vec<u8>> {
        self.bytes(
            self.request(Method::GET, &format!("rapports/{id}/download"))
                .header("Accept", "application/pdf"),
        )
        .await
    }
}

/// Downloads the PDF into `dir` as `rapport-<id>.pdf` and returns its path.
pub async fn download_to(client: &ApiClient, id: i64, dir: &Path) -> ApiResult<PathBuf> {
    let bytes = client.download_report(id).await?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("rapport-{id}.pdf"));
    tokio::fs::write(&path, &bytes).await?;
    tracing::info!(id, path = %path.display(), size = bytes.len(), "report saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock;
    use crate::error::ApiError;
    use assert_matches::assert_matches;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    #[tokio::test]
    async fn download_returns_raw_bytes() {
        let router = Router::new().route(
            "/api/rapports/{id}/download",
            get(|| async { (StatusCode::OK, b"%PDF-1.7 rapport".to_vec()) }),
        );
        let client = mock::serve(router).await;
        let bytes = client.download_report(2).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn download_to_writes_named_pdf() {
        let router = Router::new().route(
            "/api/rapports/{id}/download",
            get(|| async { (StatusCode::OK, b"%PDF-1.7".to_vec()) }),
        );
        let client = mock::serve(router).await;
        let dir = tempfile::tempdir().unwrap();

        let path = download_to(&client, 14, &dir.path().join("rapports"))
            .await
            .unwrap();

        assert!(path.ends_with("rapport-14.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn download_of_missing_report_is_not_found() {
        let router = Router::new().route(
            "/api/rapports/{id}/download",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"success": false, "message": "Rapport introuvable"})),
                )
            }),
        );
        let client = mock::serve(router).await;
        let err = client.download_report(2).await.unwrap_err();
        assert_matches!(err, ApiError::NotFound(m) if m == "Rapport introuvable");
    }
}
