// Renderer seam: Template + ordered page records → one document artifact.
// Rasterisation happens downstream; the service only depends on this trait.

pub mod manifest;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::pagination::Page;
use crate::template::Template;

pub use manifest::ManifestRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Font '{font}' is not a valid base64 blob: {reason}")]
    InvalidFont { font: String, reason: String },

    #[error("Cannot render a document with no pages")]
    NoPages,

    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The renderer trait. Implement this to swap the output backend without
/// touching the pagination core or the handlers.
///
/// Carried in `AppState` as `Arc<dyn Renderer>`. The produced artifact has
/// exactly one page per record, in the order given.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, template: &Template, pages: &[Page]) -> Result<Bytes, RenderError>;

    /// MIME type of the produced artifact.
    fn content_type(&self) -> &'static str;

    /// File extension used when the artifact is downloaded.
    fn extension(&self) -> &'static str;

    /// Backend label, reported in responses for transparency.
    fn backend(&self) -> &'static str;
}
