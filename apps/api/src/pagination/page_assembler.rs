//! Page Assembler — builds one page's complete input record.
//!
//! Every page gets the header fields verbatim, the two page counters, and the
//! repeating values destined for it, renamed to the template's local slots.
//! Values with no matching template field are dropped and reported back.

use serde::Serialize;
use tracing::debug;

use crate::pagination::slot_matcher::SlotMatcher;
use crate::pagination::{DataRecord, Page, PageCounterKeys};

/// One value of a repeating item, borrowed from the input data.
#[derive(Debug, Clone, Copy)]
pub struct ItemCell<'d> {
    pub data_key: &'d str,
    pub column: &'d str,
    pub value: &'d str,
}

/// A repeating item assigned to a page.
#[derive(Debug, Clone)]
pub struct PageItem<'d> {
    pub global_index: u32,
    /// On-page position, 1-based.
    pub local_slot: u32,
    pub cells: Vec<ItemCell<'d>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssembledPage {
    pub record: Page,
    /// Number of repeating values written into template fields.
    pub placed_values: usize,
    /// Data keys whose column has no template field at the item's slot.
    pub dropped_keys: Vec<String>,
}

pub fn assemble_page(
    header: &DataRecord,
    matcher: &SlotMatcher<'_>,
    items: &[PageItem<'_>],
    page_number: usize,
    total_pages: usize,
    counters: &PageCounterKeys,
) -> AssembledPage {
    let mut record = header.clone();
    record.insert(counters.current.clone(), page_number.to_string());
    record.insert(counters.total.clone(), total_pages.to_string());

    let mut placed_values = 0;
    let mut dropped_keys = Vec::new();

    for item in items {
        for cell in &item.cells {
            match matcher.resolve(cell.column, item.local_slot) {
                Some(field) => {
                    record.insert(field.name.clone(), cell.value.to_string());
                    placed_values += 1;
                }
                None => {
                    debug!(
                        "Page {}: no template field for '{}' at slot {}",
                        page_number, cell.data_key, item.local_slot
                    );
                    dropped_keys.push(cell.data_key.to_string());
                }
            }
        }
    }

    AssembledPage {
        record,
        placed_values,
        dropped_keys,
    }
}
