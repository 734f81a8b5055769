//! Template Store — read-only lookup of template documents by name.
//!
//! Templates live as `<templates_dir>/<name>.json`. The store never writes;
//! authoring and persistence happen elsewhere.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::template::{Template, TemplateError};

const TEMPLATE_EXTENSION: &str = "json";

/// Pluggable template source. Carried in `AppState` as `Arc<dyn TemplateStore>`.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Loads and parses a template. Missing templates map to `TemplateError::NotFound`.
    async fn load(&self, name: &str) -> Result<Arc<Template>, TemplateError>;

    /// Returns the raw template document, unparsed beyond JSON.
    async fn load_raw(&self, name: &str) -> Result<Value, TemplateError>;

    /// Names of all available templates, sorted.
    async fn list(&self) -> Result<Vec<String>, TemplateError>;
}

pub struct FsTemplateStore {
    root: PathBuf,
}

impl FsTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, TemplateError> {
        validate_name(name)?;
        Ok(self.root.join(format!("{name}.{TEMPLATE_EXTENSION}")))
    }

    async fn read(&self, name: &str) -> Result<String, TemplateError> {
        let path = self.path_for(name)?;
        debug!("Reading template {}", path.display());
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TemplateError::NotFound(name.to_string()))
            }
            Err(e) => Err(TemplateError::Io(e)),
        }
    }
}

/// Template names are plain identifiers: no separators, no traversal.
fn validate_name(name: &str) -> Result<(), TemplateError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(TemplateError::InvalidName(name.to_string()))
    }
}

#[async_trait]
impl TemplateStore for FsTemplateStore {
    async fn load(&self, name: &str) -> Result<Arc<Template>, TemplateError> {
        let raw = self.read(name).await?;
        let template = Template::from_json(name, &raw)?;
        debug!(
            "Loaded template '{}' with {} fields",
            name,
            template.fields.len()
        );
        Ok(Arc::new(template))
    }

    async fn load_raw(&self, name: &str) -> Result<Value, TemplateError> {
        let raw = self.read(name).await?;
        serde_json::from_str(&raw).map_err(|source| TemplateError::Malformed {
            name: name.to_string(),
            source,
        })
    }

    async fn list(&self) -> Result<Vec<String>, TemplateError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
