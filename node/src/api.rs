//! # REST API
//!
//! Builds the axum router that exposes the node's HTTP interface. All
//! endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                          | Description                               |
//! |--------|-------------------------------|-------------------------------------------|
//! | GET    | `/health`                     | Liveness probe                            |
//! | POST   | `/documents`                  | Ingest a raw document body                |
//! | GET    | `/document/:id`               | Stored record, without the QR image       |
//! | GET    | `/document/:id/verification`  | Signed verification payload (self-heals)  |
//! | POST   | `/document/:id/zk-verify`     | Check a holder's zero-knowledge proof     |
//!
//! The protocol library is synchronous and may touch disk, so every call
//! into it runs on the blocking pool.
//!
//! ## Errors
//!
//! Internal details never reach the client. Unknown documents are 404,
//! rejected input is 422 with the validation message, failed proofs are a
//! plain 400, and anything else is a bare 500 with the cause in the log.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use docseal_protocol::canonical::MediaType;
use docseal_protocol::clock::isoformat_utc;
use docseal_protocol::document::Ingestor;
use docseal_protocol::storage::DocumentRecord;
use docseal_protocol::verification::{ProofSubmission, Verdict, VerificationService};
use docseal_protocol::{DocSealError, DocSealResult};

use crate::metrics::SharedMetrics;

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Header carrying the uploaded file's original name.
const FILENAME_HEADER: &str = "x-filename";

/// Filename recorded when the client sends none.
const DEFAULT_FILENAME: &str = "document.pdf";

const INVALID_PROOF: &str = "Invalid or mismatched proof.";

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone, everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// Builds payloads and checks proofs.
    pub service: Arc<VerificationService>,
    /// Turns uploads into stored records.
    pub ingestor: Arc<Ingestor>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/documents",
            post(ingest_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/document/:id", get(document_handler))
        .route("/document/:id/verification", get(verification_handler))
        .route("/document/:id/zk-verify", post(zk_verify_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Returned by `POST /documents`.
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub id: String,
    pub name: String,
    pub file_hash: String,
    pub timestamp: Option<String>,
    pub status: String,
    pub size: String,
    pub zk_commitment: Option<String>,
}

impl From<DocumentRecord> for IngestResponse {
    fn from(record: DocumentRecord) -> Self {
        Self {
            timestamp: record.timestamp.as_ref().map(isoformat_utc),
            id: record.id,
            name: record.name,
            file_hash: record.file_hash,
            status: record.status,
            size: record.size,
            zk_commitment: record.zk_commitment,
        }
    }
}

/// Returned by `GET /document/:id`. The QR image is left out; it is large
/// and only meaningful inside the verification payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentView {
    pub id: String,
    pub name: String,
    pub original_filename: String,
    pub file_hash: String,
    pub timestamp: Option<String>,
    pub status: String,
    pub size: String,
    pub normalization_strategy: Option<String>,
    pub normalized_text_hash: Option<String>,
    pub zk_commitment: Option<String>,
    pub checksum: Option<String>,
    pub signature: Option<String>,
    pub qr_payload: Option<String>,
}

impl From<DocumentRecord> for DocumentView {
    fn from(record: DocumentRecord) -> Self {
        Self {
            timestamp: record.timestamp.as_ref().map(isoformat_utc),
            id: record.id,
            name: record.name,
            original_filename: record.original_filename,
            file_hash: record.file_hash,
            status: record.status,
            size: record.size,
            normalization_strategy: record.normalization_strategy,
            normalized_text_hash: record.normalized_text_hash,
            zk_commitment: record.zk_commitment,
            checksum: record.checksum,
            signature: record.signature,
            qr_payload: record.qr_payload,
        }
    }
}

/// Returned by `POST /document/:id/zk-verify` for an accepted proof.
#[derive(Debug, Serialize, Deserialize)]
pub struct ZkVerifyResponse {
    pub status: String,
    pub document_id: String,
    pub verified_at: String,
}

/// Standard error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Error Mapping
// ---------------------------------------------------------------------------

/// Everything a handler can fail with, already reduced to what the client
/// is allowed to see.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Unprocessable(String),
    InvalidProof,
    Internal,
}

impl From<DocSealError> for ApiError {
    fn from(err: DocSealError) -> Self {
        match err {
            DocSealError::NotFound(_) => ApiError::NotFound,
            DocSealError::Validation(msg) => ApiError::Unprocessable(msg),
            other => {
                tracing::error!(error = %other, "request failed");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Document not found".to_string()),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::InvalidProof => (StatusCode::BAD_REQUEST, INVALID_PROOF.to_string()),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Run a protocol call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> DocSealResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            tracing::error!(error = %e, "blocking task failed");
            Err(ApiError::Internal)
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` — returns 200 if the node is alive.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "version": state.version })),
    )
}

/// `POST /documents` — ingests the raw request body.
///
/// The media type comes from `Content-Type`, falling back to the
/// filename's extension; the filename comes from `X-Filename`.
async fn ingest_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if body.is_empty() {
        return Err(ApiError::Unprocessable("empty document".into()));
    }

    let filename = headers
        .get(FILENAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_FILENAME)
        .to_string();
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(MediaType::from_mime)
        .filter(|m| !matches!(m, MediaType::Other(s) if s == "application/octet-stream"))
        .unwrap_or_else(|| MediaType::from_path(std::path::Path::new(&filename)));

    let ingestor = Arc::clone(&state.ingestor);
    let record = blocking(move || ingestor.ingest(&body, &media_type, &filename)).await?;
    state.metrics.documents_ingested_total.inc();

    Ok((StatusCode::CREATED, Json(IngestResponse::from(record))))
}

/// `GET /document/:id` — returns the stored record.
async fn document_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DocumentView>, ApiError> {
    let service = Arc::clone(&state.service);
    let record = blocking(move || service.find_document(&id)).await?;
    Ok(Json(DocumentView::from(record)))
}

/// `GET /document/:id/verification` — builds, heals and returns the
/// verification payload.
///
/// When the healed fields could not be saved the payload is still served,
/// with a `Warning` header.
async fn verification_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let service = Arc::clone(&state.service);
    let report = blocking(move || service.build_payload(&id)).await?;

    state.metrics.payloads_built_total.inc();
    if !report.healed.is_empty() {
        state.metrics.payloads_healed_total.inc();
    }

    let mut response = Json(&report.payload).into_response();
    if report.has_warning() {
        state.metrics.persistence_warnings_total.inc();
        response.headers_mut().insert(
            header::WARNING,
            HeaderValue::from_static("199 docseal \"verification payload not persisted\""),
        );
    }
    Ok(response)
}

/// `POST /document/:id/zk-verify` — checks a holder's proof.
///
/// A body that is not a proof submission is treated the same as a proof
/// that fails to verify.
async fn zk_verify_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    submission: Result<Json<ProofSubmission>, JsonRejection>,
) -> Result<Json<ZkVerifyResponse>, ApiError> {
    let Json(submission) = submission.map_err(|rejection| {
        tracing::debug!(error = %rejection, "malformed proof submission");
        state.metrics.proofs_rejected_total.inc();
        ApiError::InvalidProof
    })?;

    let timer = state.metrics.proof_verification_seconds.start_timer();
    let service = Arc::clone(&state.service);
    let verdict = blocking(move || service.verify_document_proof(&id, &submission)).await;
    timer.observe_duration();

    match verdict? {
        Verdict::Valid {
            document_id,
            verified_at,
        } => {
            state.metrics.proofs_accepted_total.inc();
            Ok(Json(ZkVerifyResponse {
                status: "valid".into(),
                document_id,
                verified_at: isoformat_utc(&verified_at),
            }))
        }
        Verdict::Invalid => {
            state.metrics.proofs_rejected_total.inc();
            Err(ApiError::InvalidProof)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
