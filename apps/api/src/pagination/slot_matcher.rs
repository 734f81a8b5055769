//! Slot Matcher — resolves where a repeating data value lands on a page.
//!
//! A data key matches a template field when both share a column and the
//! field's local slot equals the target slot chosen by the paginator (the
//! on-page position, not the item's global index).

use std::collections::BTreeMap;

use crate::pagination::item_key::ItemKey;
use crate::pagination::row_grouper::Row;
use crate::template::Field;

/// Lookup table over a row layout, keyed by (column, local slot).
///
/// Built once per pagination run. Template fields without a slot number
/// can never be targeted and are left out.
#[derive(Debug)]
pub struct SlotMatcher<'a> {
    columns: BTreeMap<String, BTreeMap<u32, &'a Field>>,
}

impl<'a> SlotMatcher<'a> {
    pub fn new(rows: &[Row<'a>]) -> Self {
        let mut columns: BTreeMap<String, BTreeMap<u32, &'a Field>> = BTreeMap::new();
        for row_field in rows.iter().flat_map(|row| row.fields.iter()) {
            if let Some(slot) = row_field.local_slot() {
                // Duplicate (column, slot) pairs are a template authoring defect;
                // the topmost one wins.
                columns
                    .entry(row_field.key.column.clone())
                    .or_default()
                    .entry(slot)
                    .or_insert(row_field.field);
            }
        }
        Self { columns }
    }

    /// Template field for `column` at on-page `slot`, if the template declares one.
    pub fn resolve(&self, column: &str, slot: u32) -> Option<&'a Field> {
        self.columns.get(column)?.get(&slot).copied()
    }

    /// Same as `resolve`, starting from an already-decomposed data key.
    pub fn resolve_key(&self, key: &ItemKey, slot: u32) -> Option<&'a Field> {
        self.resolve(&key.column, slot)
    }

    /// Number of addressable (column, slot) pairs.
    pub fn len(&self) -> usize {
        self.columns.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
