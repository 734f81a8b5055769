// Template model: the Field Registry consumed by the pagination core.
// Templates are read-only once loaded and shared across requests as Arc<Template>.
#![allow(dead_code)]

pub mod store;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use store::{FsTemplateStore, TemplateStore};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid template name: {0}")]
    InvalidName(String),

    #[error("Malformed template '{name}': {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read template storage: {0}")]
    Io(#[from] std::io::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Field registry types
// ────────────────────────────────────────────────────────────────────────────

/// Declared page position of a field, in template units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One named, absolutely positioned template field.
///
/// `attrs` holds everything besides `position` (type, width, font, alignment...)
/// and is forwarded to the renderer without inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub position: Position,
    pub attrs: Map<String, Value>,
}

/// A loaded template: ordered fields plus opaque resources.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    /// Fields in the order they appear in the document's `fields` section.
    pub fields: Vec<Field>,
    /// Font name → base64 blob. Not inspected here.
    pub fonts: Map<String, Value>,
    /// Every other top-level section (`basePdf`, metadata...).
    pub resources: Map<String, Value>,
}

#[derive(Deserialize)]
struct FieldSpec {
    position: Position,
    #[serde(flatten)]
    attrs: Map<String, Value>,
}

#[derive(Deserialize)]
struct TemplateDocument {
    fields: Map<String, Value>,
    #[serde(default)]
    fonts: Map<String, Value>,
    #[serde(flatten)]
    resources: Map<String, Value>,
}

impl Template {
    /// Parses a template document. Field names are keys of the `fields` object,
    /// so uniqueness holds by construction.
    pub fn from_json(name: &str, raw: &str) -> Result<Self, TemplateError> {
        let malformed = |source| TemplateError::Malformed {
            name: name.to_string(),
            source,
        };

        let document: TemplateDocument = serde_json::from_str(raw).map_err(malformed)?;

        let mut fields = Vec::with_capacity(document.fields.len());
        for (field_name, spec) in document.fields {
            let spec: FieldSpec = serde_json::from_value(spec).map_err(malformed)?;
            fields.push(Field {
                name: field_name,
                position: spec.position,
                attrs: spec.attrs,
            });
        }

        Ok(Template {
            name: name.to_string(),
            fields,
            fonts: document.fonts,
            resources: document.resources,
        })
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
