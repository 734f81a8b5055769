//! Axum route handlers for the Document Generation API.

use axum::{
    extract::State,
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::generation::generator::{
    generate_document, prepare_document, DocumentData, GenerateRequest, GeneratedDocument,
};
use crate::generation::statement::{transform_statement, StatementRequest};
use crate::pagination::{Page, PaginationReport};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub template_name: String,
    pub page_count: usize,
    pub pages: Vec<Page>,
    /// Present only when the request asked for pagination.
    pub report: Option<PaginationReport>,
}

const JOB_ID_HEADER: HeaderName = HeaderName::from_static("x-job-id");
const PAGE_COUNT_HEADER: HeaderName = HeaderName::from_static("x-page-count");
const DROPPED_VALUES_HEADER: HeaderName = HeaderName::from_static("x-dropped-values");

fn document_response(doc: GeneratedDocument) -> Response {
    let headers = [
        (header::CONTENT_TYPE, doc.content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", doc.filename),
        ),
        (JOB_ID_HEADER, doc.job_id.to_string()),
        (PAGE_COUNT_HEADER, doc.page_count.to_string()),
        (DROPPED_VALUES_HEADER, doc.dropped_values.to_string()),
    ];
    (headers, doc.bytes).into_response()
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents/preview
///
/// Runs template loading and pagination only. Returns the page records the
/// renderer would receive, with diagnostics, so callers can assert on data loss.
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let template_name = request.template_name.clone();
    let prepared =
        prepare_document(state.templates.as_ref(), &state.config.page_counters, request).await?;

    Ok(Json(PreviewResponse {
        template_name,
        page_count: prepared.pages.len(),
        pages: prepared.pages,
        report: prepared.report,
    }))
}

/// POST /api/v1/documents
///
/// Full pipeline: load template → paginate → render. Returns the artifact as a download.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    let doc = generate_document(
        state.templates.as_ref(),
        state.renderer.as_ref(),
        &state.config.page_counters,
        request,
    )
    .await?;

    Ok(document_response(doc))
}

/// POST /api/v1/documents/statement
///
/// Accepts parser output, maps it onto the organisation's template and generates.
pub async fn handle_generate_statement(
    State(state): State<AppState>,
    Json(statement): Json<StatementRequest>,
) -> Result<Response, AppError> {
    let transformed = transform_statement(
        &statement,
        &state.config.org_templates,
        state.config.default_items_per_page,
    )?;
    info!(
        "Statement for org {}: template '{}', {} transactions",
        statement.org_id, transformed.template_name, transformed.transaction_count
    );

    let request = GenerateRequest {
        template_name: transformed.template_name,
        data: DocumentData::Record(transformed.data),
        pagination: Some(transformed.pagination),
        filename_prefix: Some(format!("statement_{}", statement.org_id)),
    };
    let doc = generate_document(
        state.templates.as_ref(),
        state.renderer.as_ref(),
        &state.config.page_counters,
        request,
    )
    .await?;

    Ok(document_response(doc))
}
