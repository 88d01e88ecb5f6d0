//! API handlers for the compliance server
//!
//! Provides REST endpoints for:
//! - Health checks
//! - Catalog listing
//! - Document compliance scans (multipart upload)
//! - Prompt proxying to the generative-text provider

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use compliance_engine::{Catalog, ScanResult};
use shared_pdf::{extract_text, DocumentKind};

use crate::error::ServerError;
use crate::AppState;

/// Multipart field carrying the document
pub const UPLOAD_FIELD: &str = "file";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /api/health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "compliance-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Catalog listing response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub version: String,
    pub regulations: Vec<RegulationInfo>,
    pub total_clauses: usize,
}

#[derive(Serialize)]
pub struct RegulationInfo {
    pub name: String,
    pub clauses: Vec<ClauseInfo>,
}

#[derive(Serialize)]
pub struct ClauseInfo {
    pub id: String,
    pub title: String,
    pub remediation: String,
}

impl From<&Catalog> for CatalogResponse {
    fn from(catalog: &Catalog) -> Self {
        let regulations = catalog
            .regulations()
            .iter()
            .map(|r| RegulationInfo {
                name: r.name.clone(),
                clauses: r
                    .clauses
                    .iter()
                    .map(|c| ClauseInfo {
                        id: c.id.clone(),
                        title: c.title.clone(),
                        remediation: c.remediation.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            version: catalog.version().to_string(),
            regulations,
            total_clauses: catalog.clause_count(),
        }
    }
}

/// Handler: GET /api/compliance/catalog
pub async fn handle_list_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse::from(state.engine.catalog()))
}

/// An uploaded document as received
#[derive(Debug)]
struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// Handler: POST /api/compliance/scan
///
/// Expects a multipart form with the document in the `file` field.
pub async fn handle_scan_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ScanResult>, ServerError> {
    let mut multipart = multipart.map_err(|e| {
        ServerError::InvalidRequest(format!("Expected a multipart upload: {}", e.body_text()))
    })?;
    let upload = read_upload(&mut multipart, state.max_upload_bytes).await?;

    let kind = DocumentKind::detect(upload.file_name.as_deref(), upload.content_type.as_deref())?;
    info!(
        "Scan request: file={}, kind={:?}, bytes={}",
        upload.file_name.as_deref().unwrap_or("<unnamed>"),
        kind,
        upload.data.len()
    );

    // PDF parsing is CPU-bound; keep it off the async workers.
    let data = upload.data;
    let text = tokio::task::spawn_blocking(move || extract_text(&data, kind))
        .await
        .map_err(|e| ServerError::Internal(format!("Extraction task failed: {}", e)))??;

    if text.trim().is_empty() {
        return Err(ServerError::InvalidRequest(
            "No extractable text found in the uploaded document".to_string(),
        ));
    }

    let result = state.engine.scan(&text);
    info!(
        "Scan complete: findings={}, faults={}",
        result.total_findings,
        result.faults.len()
    );

    Ok(Json(result))
}

async fn read_upload(multipart: &mut Multipart, limit: usize) -> Result<Upload, ServerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limit))?
            .to_vec();

        if data.len() > limit {
            return Err(ServerError::PayloadTooLarge(limit));
        }

        return Ok(Upload {
            file_name,
            content_type,
            data,
        });
    }

    Err(ServerError::InvalidRequest(
        "No file uploaded. Send the document in the \"file\" form field".to_string(),
    ))
}

fn multipart_error(err: MultipartError, limit: usize) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(limit)
    } else {
        ServerError::InvalidRequest(format!("Malformed upload: {}", err.body_text()))
    }
}

/// Prompt proxy request body
#[derive(Deserialize)]
pub struct PromptRequest {
    pub prompt: Option<String>,
}

/// Prompt proxy response
#[derive(Serialize)]
pub struct PromptResponse {
    pub text: String,
    /// Unmodified provider response
    pub raw: Value,
}

/// Handler: POST /api/gemini
pub async fn handle_prompt(
    State(state): State<AppState>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, ServerError> {
    let prompt = body
        .ok()
        .and_then(|Json(req)| req.prompt)
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| {
            ServerError::InvalidRequest(
                "Invalid or missing \"prompt\" in request body.".to_string(),
            )
        })?;

    let client = state
        .gemini
        .as_ref()
        .ok_or_else(|| ServerError::Misconfigured("Missing GEMINI_API_KEY.".to_string()))?;

    info!("Prompt request: model={}, chars={}", client.model(), prompt.len());

    let completion = client.generate(&prompt).await?;

    Ok(Json(PromptResponse {
        text: completion.text,
        raw: completion.raw,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use compliance_engine::reference_catalog;

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = handle_health().await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.service, "compliance-server");
    }

    #[test]
    fn test_catalog_response_preserves_order() {
        let catalog = reference_catalog().unwrap();
        let response = CatalogResponse::from(&catalog);

        assert_eq!(response.total_clauses, 6);
        assert_eq!(response.regulations[0].name, "GDPR");
        assert_eq!(response.regulations[0].clauses[0].id, "GDPR-Article-5");
        assert_eq!(response.regulations[1].clauses[2].id, "HIPAA-Breach");
    }
}
