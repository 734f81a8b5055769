use std::path::PathBuf;

use anyhow::{ensure, Context, Result};

use crate::generation::statement::OrgTemplateMap;
use crate::pagination::{PageCounterKeys, DEFAULT_CURRENT_PAGE_KEY, DEFAULT_TOTAL_PAGES_KEY};

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding `<name>.json` template documents.
    pub templates_dir: PathBuf,
    /// Organisation id → template name, for parsed statements.
    pub org_templates: OrgTemplateMap,
    /// Page size applied to parsed statements.
    pub default_items_per_page: i64,
    /// Keys under which page counters are injected.
    pub page_counters: PageCounterKeys,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let default_items_per_page = std::env::var("DEFAULT_ITEMS_PER_PAGE")
            .unwrap_or_else(|_| "15".to_string())
            .parse::<i64>()
            .context("DEFAULT_ITEMS_PER_PAGE must be an integer")?;
        ensure!(
            default_items_per_page > 0,
            "DEFAULT_ITEMS_PER_PAGE must be positive, got {default_items_per_page}"
        );

        let org_templates = match std::env::var("ORG_TEMPLATE_MAP") {
            Ok(raw) => OrgTemplateMap::parse(&raw).context("ORG_TEMPLATE_MAP is malformed")?,
            Err(_) => OrgTemplateMap::default(),
        };

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            templates_dir: std::env::var("TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./templates")),
            org_templates,
            default_items_per_page,
            page_counters: PageCounterKeys {
                current: env_or("CURRENT_PAGE_KEY", DEFAULT_CURRENT_PAGE_KEY),
                total: env_or("TOTAL_PAGES_KEY", DEFAULT_TOTAL_PAGES_KEY),
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
