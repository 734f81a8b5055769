use std::sync::Arc;

use crate::config::Config;
use crate::render::Renderer;
use crate::template::TemplateStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every collaborator is an explicit handle; nothing is process-global.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Read-only template source. Default: FsTemplateStore over TEMPLATES_DIR.
    pub templates: Arc<dyn TemplateStore>,
    /// Pluggable output backend. Default: ManifestRenderer.
    pub renderer: Arc<dyn Renderer>,
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;

    use super::*;
    use crate::generation::statement::OrgTemplateMap;
    use crate::pagination::PageCounterKeys;
    use crate::render::ManifestRenderer;
    use crate::template::FsTemplateStore;

    pub(crate) fn test_state(templates_dir: &Path) -> AppState {
        AppState {
            config: Config {
                port: 0,
                rust_log: "debug".to_string(),
                templates_dir: templates_dir.to_path_buf(),
                org_templates: OrgTemplateMap::parse("266=statement").unwrap(),
                default_items_per_page: 3,
                page_counters: PageCounterKeys::default(),
            },
            templates: Arc::new(FsTemplateStore::new(templates_dir)),
            renderer: Arc::new(ManifestRenderer),
        }
    }
}
