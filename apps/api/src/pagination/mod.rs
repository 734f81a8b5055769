// Positional pagination core.
// Implements: row detection from template layout, slot matching, per-page record assembly.
// Everything here is pure and synchronous; callers run it inside tokio::task::spawn_blocking.
#![allow(dead_code)]

pub mod item_key;
pub mod page_assembler;
pub mod paginator;
pub mod row_grouper;
pub mod slot_matcher;

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use paginator::{paginate, DropReason, DroppedKey, PageSummary, Pagination, PaginationReport};
pub use row_grouper::ClusterMode;

/// Flat application data: field key → value.
pub type DataRecord = BTreeMap<String, String>;

/// One page's input record. Same shape as `DataRecord`, owned per page.
pub type Page = BTreeMap<String, String>;

/// Default counter keys used by the statement templates.
pub const DEFAULT_CURRENT_PAGE_KEY: &str = "Cpage";
pub const DEFAULT_TOTAL_PAGES_KEY: &str = "Mpage";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("items_per_page must be a positive integer, got {0}")]
    ItemsPerPage(i64),

    #[error("item_prefix cannot be empty when pagination is requested")]
    EmptyPrefix,
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Literal keys under which page counters are injected into every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCounterKeys {
    pub current: String,
    pub total: String,
}

impl Default for PageCounterKeys {
    fn default() -> Self {
        Self {
            current: DEFAULT_CURRENT_PAGE_KEY.to_string(),
            total: DEFAULT_TOTAL_PAGES_KEY.to_string(),
        }
    }
}

/// Validated pagination settings. Only constructible through `new`, so an
/// instance always has a non-empty prefix and a positive page size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    item_prefix: String,
    items_per_page: NonZeroU32,
    clustering: ClusterMode,
    counters: PageCounterKeys,
}

impl PaginationConfig {
    pub fn new(item_prefix: impl Into<String>, items_per_page: i64) -> Result<Self, ConfigError> {
        let item_prefix = item_prefix.into();
        if item_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        let items_per_page = u32::try_from(items_per_page)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(ConfigError::ItemsPerPage(items_per_page))?;

        Ok(Self {
            item_prefix,
            items_per_page,
            clustering: ClusterMode::default(),
            counters: PageCounterKeys::default(),
        })
    }

    pub fn with_clustering(mut self, clustering: ClusterMode) -> Self {
        self.clustering = clustering;
        self
    }

    pub fn with_counters(mut self, counters: PageCounterKeys) -> Self {
        self.counters = counters;
        self
    }

    pub fn item_prefix(&self) -> &str {
        &self.item_prefix
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page.get()
    }

    pub fn clustering(&self) -> ClusterMode {
        self.clustering
    }

    pub fn counters(&self) -> &PageCounterKeys {
        &self.counters
    }
}

/// Wire form of the pagination block in a generation request.
/// `items_per_page` is signed so that zero and negative values reach validation
/// instead of failing deserialization with an opaque message.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationRequest {
    #[serde(alias = "itemPrefix")]
    pub item_prefix: String,
    #[serde(alias = "itemsPerPage")]
    pub items_per_page: i64,
    #[serde(default)]
    pub clustering: ClusterMode,
}

impl PaginationRequest {
    pub fn into_config(self, counters: PageCounterKeys) -> Result<PaginationConfig, ConfigError> {
        Ok(PaginationConfig::new(self.item_prefix, self.items_per_page)?
            .with_clustering(self.clustering)
            .with_counters(counters))
    }
}
