//! Document Generation — orchestrates the full generation pipeline.
//!
//! Flow: validate pagination → load template → paginate (spawn_blocking) →
//!       render → return artifact.
//!
//! Pagination errors abort before the renderer is called. Renderer errors are
//! returned as-is; nothing here retries.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::pagination::{
    paginate, DataRecord, Page, PageCounterKeys, PaginationConfig, PaginationReport,
    PaginationRequest,
};
use crate::render::Renderer;
use crate::template::{Template, TemplateStore};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// The two accepted input shapes: one flat record (optionally paginated), or
/// an ordered list of records where each element is already one page.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DocumentData {
    Record(DataRecord),
    Pages(Vec<DataRecord>),
}

/// Request body for document generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(alias = "templateName")]
    pub template_name: String,
    pub data: DocumentData,
    pub pagination: Option<PaginationRequest>,
    /// Download name prefix; defaults to the template name.
    #[serde(default, alias = "filenamePrefix")]
    pub filename_prefix: Option<String>,
}

/// Pages ready for the renderer, plus pagination diagnostics when pagination ran.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub template: Arc<Template>,
    pub pages: Vec<Page>,
    pub report: Option<PaginationReport>,
}

/// A rendered artifact and the metadata handlers expose alongside it.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub job_id: Uuid,
    pub filename: String,
    pub content_type: &'static str,
    pub page_count: usize,
    pub dropped_values: usize,
    pub bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Loads the template and turns the request data into an ordered page list.
///
/// Steps:
/// 1. Validate the pagination block (ConfigError before any work)
/// 2. Load the template (TemplateNotFound aborts)
/// 3. Paginate on the blocking pool, or take the data as-is when unpaginated
pub async fn prepare_document(
    templates: &dyn TemplateStore,
    counters: &PageCounterKeys,
    request: GenerateRequest,
) -> Result<PreparedDocument, AppError> {
    if request.template_name.trim().is_empty() {
        return Err(AppError::Validation(
            "template_name cannot be empty".to_string(),
        ));
    }

    let config = request
        .pagination
        .map(|p| p.into_config(counters.clone()))
        .transpose()?;

    let template = templates.load(&request.template_name).await?;

    let (pages, report) = match (request.data, config) {
        (DocumentData::Record(data), Some(config)) => {
            let pagination = run_pagination(Arc::clone(&template), data, config).await?;
            (pagination.pages, Some(pagination.report))
        }
        (DocumentData::Pages(_), Some(_)) => {
            return Err(AppError::Validation(
                "pagination requires data to be a single record, not a page list".to_string(),
            ));
        }
        (DocumentData::Record(data), None) => (vec![data], None),
        (DocumentData::Pages(pages), None) => {
            if pages.is_empty() {
                return Err(AppError::Validation(
                    "data must contain at least one page".to_string(),
                ));
            }
            (pages, None)
        }
    };

    Ok(PreparedDocument {
        template,
        pages,
        report,
    })
}

/// CPU-bound pass, run on the blocking pool.
/// Inputs are owned so the closure satisfies the 'static bound.
async fn run_pagination(
    template: Arc<Template>,
    data: DataRecord,
    config: PaginationConfig,
) -> Result<crate::pagination::Pagination, AppError> {
    tokio::task::spawn_blocking(move || paginate(&template, &data, &config))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in pagination: {e}")))
}

/// Runs the full pipeline and renders the artifact.
pub async fn generate_document(
    templates: &dyn TemplateStore,
    renderer: &dyn Renderer,
    counters: &PageCounterKeys,
    request: GenerateRequest,
) -> Result<GeneratedDocument, AppError> {
    let job_id = Uuid::new_v4();
    let filename_prefix = request
        .filename_prefix
        .clone()
        .unwrap_or_else(|| request.template_name.clone());

    info!(
        "Generation job {job_id}: template '{}'",
        request.template_name
    );

    let prepared = prepare_document(templates, counters, request).await?;
    let bytes = renderer
        .render(&prepared.template, &prepared.pages)
        .await
        .map_err(AppError::Render)?;

    let filename = format!(
        "{}_{}.{}",
        filename_prefix,
        Utc::now().timestamp_millis(),
        renderer.extension()
    );
    info!(
        "Generation job {job_id}: {} page(s) rendered by '{}' backend ({} bytes)",
        prepared.pages.len(),
        renderer.backend(),
        bytes.len()
    );

    Ok(GeneratedDocument {
        job_id,
        filename,
        content_type: renderer.content_type(),
        page_count: prepared.pages.len(),
        dropped_values: prepared
            .report
            .as_ref()
            .map_or(0, PaginationReport::dropped_count),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ManifestRenderer;
    use crate::template::tests::STATEMENT_TEMPLATE;
    use crate::template::FsTemplateStore;

    fn store() -> (tempfile::TempDir, FsTemplateStore) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("statement.json"), STATEMENT_TEMPLATE).unwrap();
        let store = FsTemplateStore::new(dir.path());
        (dir, store)
    }

    fn request(body: serde_json::Value) -> GenerateRequest {
        serde_json::from_value(body).unwrap()
    }

    fn items(count: u32) -> serde_json::Value {
        let mut data = serde_json::Map::new();
        data.insert("Cname".to_string(), "Jane Doe".into());
        for i in 1..=count {
            data.insert(format!("Tr{i}Date"), format!("day-{i}").into());
        }
        serde_json::Value::Object(data)
    }

    #[tokio::test]
    async fn test_prepare_paginates_single_record() {
        let (_dir, store) = store();
        let req = request(serde_json::json!({
            "template_name": "statement",
            "data": items(7),
            "pagination": { "itemPrefix": "Tr", "itemsPerPage": 3 }
        }));
        let prepared = prepare_document(&store, &PageCounterKeys::default(), req)
            .await
            .unwrap();
        assert_eq!(prepared.pages.len(), 3);
        assert_eq!(prepared.pages[2]["Tr1Date"], "day-7");
        assert_eq!(prepared.report.unwrap().total_items, 7);
    }

    #[tokio::test]
    async fn test_prepare_without_pagination_keeps_record() {
        let (_dir, store) = store();
        let req = request(serde_json::json!({
            "template_name": "statement",
            "data": { "Cname": "Jane Doe" }
        }));
        let prepared = prepare_document(&store, &PageCounterKeys::default(), req)
            .await
            .unwrap();
        assert_eq!(prepared.pages.len(), 1);
        assert_eq!(prepared.pages[0].len(), 1);
        assert!(prepared.report.is_none());
    }

    #[tokio::test]
    async fn test_prepare_accepts_page_list() {
        let (_dir, store) = store();
        let req = request(serde_json::json!({
            "template_name": "statement",
            "data": [{ "Cname": "first" }, { "Cname": "second" }]
        }));
        let prepared = prepare_document(&store, &PageCounterKeys::default(), req)
            .await
            .unwrap();
        assert_eq!(prepared.pages.len(), 2);
        assert_eq!(prepared.pages[1]["Cname"], "second");
    }

    #[tokio::test]
    async fn test_prepare_rejects_paginated_page_list() {
        let (_dir, store) = store();
        let req = request(serde_json::json!({
            "template_name": "statement",
            "data": [{ "Cname": "first" }],
            "pagination": { "item_prefix": "Tr", "items_per_page": 3 }
        }));
        let err = prepare_document(&store, &PageCounterKeys::default(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_prepare_rejects_zero_items_per_page() {
        let (_dir, store) = store();
        let req = request(serde_json::json!({
            "template_name": "statement",
            "data": items(2),
            "pagination": { "item_prefix": "Tr", "items_per_page": 0 }
        }));
        let err = prepare_document(&store, &PageCounterKeys::default(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_prepare_missing_template_is_not_found() {
        let (_dir, store) = store();
        let req = request(serde_json::json!({
            "template_name": "invoice",
            "data": { "Cname": "Jane Doe" }
        }));
        let err = prepare_document(&store, &PageCounterKeys::default(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TemplateNotFound(_)));
    }

    #[tokio::test]
    async fn test_generate_document_renders_manifest() {
        let (_dir, store) = store();
        let req = request(serde_json::json!({
            "template_name": "statement",
            "data": items(4),
            "pagination": { "item_prefix": "Tr", "items_per_page": 3 },
            "filename_prefix": "statement_266"
        }));
        let doc = generate_document(&store, &ManifestRenderer, &PageCounterKeys::default(), req)
            .await
            .unwrap();
        assert_eq!(doc.page_count, 2);
        assert_eq!(doc.content_type, "application/json");
        assert!(doc.filename.starts_with("statement_266_"));
        assert!(doc.filename.ends_with(".json"));
        let manifest: serde_json::Value = serde_json::from_slice(&doc.bytes).unwrap();
        assert_eq!(manifest["page_count"], 2);
    }
}
