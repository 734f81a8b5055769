//! Manifest renderer — default `Renderer` backend.
//!
//! Produces a JSON document manifest: template resources plus, for every page,
//! each template field with its resolved value. Fields a page does not fill
//! render empty. The manifest is what the downstream rasteriser consumes.

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::pagination::Page;
use crate::render::{RenderError, Renderer};
use crate::template::{Position, Template};

pub struct ManifestRenderer;

#[derive(Serialize)]
struct Manifest<'a> {
    template: &'a str,
    page_count: usize,
    fonts: Vec<&'a str>,
    resources: &'a Map<String, Value>,
    pages: Vec<ManifestPage<'a>>,
}

#[derive(Serialize)]
struct ManifestPage<'a> {
    page: usize,
    fields: Vec<ManifestField<'a>>,
}

#[derive(Serialize)]
struct ManifestField<'a> {
    name: &'a str,
    position: Position,
    #[serde(flatten)]
    attrs: &'a Map<String, Value>,
    value: &'a str,
}

impl ManifestRenderer {
    /// Font blobs are opaque to pagination, but a renderer cannot embed a blob
    /// that does not decode.
    fn check_fonts(template: &Template) -> Result<(), RenderError> {
        for (font, blob) in &template.fonts {
            let encoded = blob.as_str().ok_or_else(|| RenderError::InvalidFont {
                font: font.clone(),
                reason: "expected a base64 string".to_string(),
            })?;
            base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| RenderError::InvalidFont {
                    font: font.clone(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}

#[async_trait]
impl Renderer for ManifestRenderer {
    async fn render(&self, template: &Template, pages: &[Page]) -> Result<Bytes, RenderError> {
        if pages.is_empty() {
            return Err(RenderError::NoPages);
        }
        Self::check_fonts(template)?;

        let manifest = Manifest {
            template: &template.name,
            page_count: pages.len(),
            fonts: template.fonts.keys().map(String::as_str).collect(),
            resources: &template.resources,
            pages: pages
                .iter()
                .enumerate()
                .map(|(i, record)| ManifestPage {
                    page: i + 1,
                    fields: template
                        .fields
                        .iter()
                        .map(|field| ManifestField {
                            name: &field.name,
                            position: field.position,
                            attrs: &field.attrs,
                            value: record.get(&field.name).map(String::as_str).unwrap_or(""),
                        })
                        .collect(),
                })
                .collect(),
        };

        let encoded = serde_json::to_vec(&manifest)?;
        debug!(
            "Rendered manifest for '{}': {} page(s), {} bytes",
            template.name,
            pages.len(),
            encoded.len()
        );
        Ok(Bytes::from(encoded))
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn backend(&self) -> &'static str {
        "manifest"
    }
}
