//! Paginator — splits flat application data into per-page input records.
//!
//! # Algorithm
//! 1. Detect the template's repeating rows (`group_rows`). No rows → one page.
//! 2. Collect the distinct global indices of prefixed data keys → `total_items`.
//! 3. `total_pages = ceil(total_items / items_per_page)`, at least 1.
//! 4. Page `p` takes indices `[(p-1)*P + 1, p*P]`; index `i` lands at local
//!    slot `i - window_start + 1`.
//! 5. Pages are returned in render order with a diagnostics report.
//!
//! The run is pure: identical inputs give identical pages. Data is a
//! `BTreeMap`, so iteration order never depends on hashing.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::pagination::item_key::ItemKey;
use crate::pagination::page_assembler::{assemble_page, ItemCell, PageItem};
use crate::pagination::row_grouper::group_rows;
use crate::pagination::slot_matcher::SlotMatcher;
use crate::pagination::{DataRecord, Page, PageCounterKeys, PaginationConfig};
use crate::template::Template;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Prefixed key without a usable 1-based index.
    NoIndex,
    /// No template field for the key's column at its local slot.
    NoMatchingSlot,
    /// Index beyond the last page window (sparse numbering).
    OutsidePageRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedKey {
    pub key: String,
    /// Page the value was destined for, when it got that far.
    pub page: Option<usize>,
    pub reason: DropReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub page_number: usize,
    /// Global indices of the items placed on this page, ascending.
    pub item_indices: Vec<u32>,
    pub placed_values: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationReport {
    pub rows_detected: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub pages: Vec<PageSummary>,
    pub dropped: Vec<DroppedKey>,
}

impl PaginationReport {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    /// Items assigned to some page window, summed over pages.
    pub fn assigned_items(&self) -> usize {
        self.pages.iter().map(|p| p.item_indices.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub pages: Vec<Page>,
    pub report: PaginationReport,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

pub fn paginate(template: &Template, data: &DataRecord, config: &PaginationConfig) -> Pagination {
    let prefix = config.item_prefix();
    let counters = config.counters();

    let rows = group_rows(&template.fields, prefix, config.clustering());
    if rows.is_empty() {
        info!(
            "Template '{}' has no '{}' fields; rendering a single page",
            template.name, prefix
        );
        return single_page(data, counters);
    }
    let matcher = SlotMatcher::new(&rows);

    // Split the data into header values and repeating items keyed by global index.
    let mut header = DataRecord::new();
    let mut dropped = Vec::new();
    let mut items: BTreeMap<u32, Vec<(&str, ItemKey, &str)>> = BTreeMap::new();
    for (key, value) in data {
        match ItemKey::parse(key, prefix) {
            None => {
                header.insert(key.clone(), value.clone());
            }
            Some(item_key) => match item_key.index {
                Some(index) if index > 0 => items.entry(index).or_default().push((
                    key.as_str(),
                    item_key,
                    value.as_str(),
                )),
                _ => dropped.push(DroppedKey {
                    key: key.clone(),
                    page: None,
                    reason: DropReason::NoIndex,
                }),
            },
        }
    }

    let per_page = u64::from(config.items_per_page());
    let total_items = items.len();
    let total_pages = (total_items as u64).div_ceil(per_page).max(1) as usize;

    info!(
        "Position-based pagination: template '{}' has {} rows ({} slots), data has {} items, creating {} page(s)",
        template.name,
        rows.len(),
        matcher.len(),
        total_items,
        total_pages
    );

    let mut pages = Vec::with_capacity(total_pages);
    let mut summaries = Vec::with_capacity(total_pages);
    for page_number in 1..=total_pages {
        let (start, end) = page_window(page_number, per_page);
        let page_items: Vec<PageItem<'_>> = items
            .range(start..=end)
            .map(|(&global_index, cells)| PageItem {
                global_index,
                local_slot: global_index - start + 1,
                cells: cells
                    .iter()
                    .map(|&(data_key, ref item_key, value)| ItemCell {
                        data_key,
                        column: &item_key.column,
                        value,
                    })
                    .collect(),
            })
            .collect();

        let assembled = assemble_page(
            &header,
            &matcher,
            &page_items,
            page_number,
            total_pages,
            counters,
        );

        dropped.extend(assembled.dropped_keys.into_iter().map(|key| DroppedKey {
            key,
            page: Some(page_number),
            reason: DropReason::NoMatchingSlot,
        }));
        summaries.push(PageSummary {
            page_number,
            item_indices: page_items.iter().map(|item| item.global_index).collect(),
            placed_values: assembled.placed_values,
        });
        pages.push(assembled.record);
    }

    // Sparse indices can run past the last window; surface them instead of losing them silently.
    let (_, last_end) = page_window(total_pages, per_page);
    if let Some(first_outside) = last_end.checked_add(1) {
        for (_, cells) in items.range(first_outside..) {
            dropped.extend(cells.iter().map(|(data_key, _, _)| DroppedKey {
                key: data_key.to_string(),
                page: None,
                reason: DropReason::OutsidePageRange,
            }));
        }
    }

    if !dropped.is_empty() {
        warn!(
            "Template '{}': {} data value(s) had no destination and were dropped",
            template.name,
            dropped.len()
        );
    }

    Pagination {
        pages,
        report: PaginationReport {
            rows_detected: rows.len(),
            total_items,
            total_pages,
            pages: summaries,
            dropped,
        },
    }
}

/// Inclusive global-index window of a 1-based page, clamped to `u32`.
fn page_window(page_number: usize, per_page: u64) -> (u32, u32) {
    let start = (page_number as u64 - 1) * per_page + 1;
    let end = page_number as u64 * per_page;
    (clamp_u32(start), clamp_u32(end))
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Degenerate path: the template has no repeating block, so the data is the page.
fn single_page(data: &DataRecord, counters: &PageCounterKeys) -> Pagination {
    let mut page = data.clone();
    page.insert(counters.current.clone(), "1".to_string());
    page.insert(counters.total.clone(), "1".to_string());

    Pagination {
        pages: vec![page],
        report: PaginationReport {
            rows_detected: 0,
            total_items: 0,
            total_pages: 1,
            pages: vec![PageSummary {
                page_number: 1,
                item_indices: Vec::new(),
                placed_values: 0,
            }],
            dropped: Vec::new(),
        },
    }
}
