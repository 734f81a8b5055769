//! Row Grouper — detects the repeating rows of a template from field layout alone.
//!
//! Fields whose name starts with the item prefix are clustered by vertical
//! position. Two clustering strategies are available:
//!
//! - `SingleLinkage` (default): sort by y, open a new row whenever the gap to
//!   the previous field exceeds `Y_TOLERANCE`. Independent of field order.
//! - `Legacy`: greedy, in template order; a field joins the first row whose
//!   first-seen y is within tolerance. Kept for templates tuned against it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::pagination::item_key::ItemKey;
use crate::template::Field;

/// Fields within this many units of each other share a row.
pub const Y_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    #[default]
    SingleLinkage,
    Legacy,
}

/// A template field inside a row, with its decomposed name.
/// `key.index` is the field's local slot (1-based position within the block).
#[derive(Debug, Clone)]
pub struct RowField<'a> {
    pub field: &'a Field,
    pub key: ItemKey,
}

impl RowField<'_> {
    pub fn local_slot(&self) -> Option<u32> {
        self.key.index
    }
}

/// One visual line of the repeating block.
#[derive(Debug, Clone)]
pub struct Row<'a> {
    /// Representative y: the first-seen y (legacy) or the topmost y (single-linkage).
    pub y: f64,
    pub fields: Vec<RowField<'a>>,
}

/// Groups the fields starting with `prefix` into rows, top to bottom.
/// An empty result means the template has no repeating block.
pub fn group_rows<'a>(fields: &'a [Field], prefix: &str, mode: ClusterMode) -> Vec<Row<'a>> {
    let candidates: Vec<RowField<'a>> = fields
        .iter()
        .filter_map(|field| {
            ItemKey::parse(&field.name, prefix).map(|key| RowField { field, key })
        })
        .collect();

    if candidates.is_empty() {
        return Vec::new();
    }

    let mut rows = match mode {
        ClusterMode::SingleLinkage => single_linkage(candidates),
        ClusterMode::Legacy => greedy_first_seen(candidates),
    };
    rows.sort_by(|a, b| a.y.total_cmp(&b.y));
    rows
}

fn single_linkage(mut candidates: Vec<RowField<'_>>) -> Vec<Row<'_>> {
    candidates.sort_by(|a, b| layout_order(a.field, b.field));

    let mut rows: Vec<Row<'_>> = Vec::new();
    let mut previous_y = f64::NEG_INFINITY;
    for candidate in candidates {
        let y = candidate.field.position.y;
        match rows.last_mut() {
            Some(row) if y - previous_y <= Y_TOLERANCE => row.fields.push(candidate),
            _ => rows.push(Row {
                y,
                fields: vec![candidate],
            }),
        }
        previous_y = y;
    }
    rows
}

fn greedy_first_seen(candidates: Vec<RowField<'_>>) -> Vec<Row<'_>> {
    let mut rows: Vec<Row<'_>> = Vec::new();
    for candidate in candidates {
        let y = candidate.field.position.y;
        match rows.iter_mut().find(|row| (row.y - y).abs() <= Y_TOLERANCE) {
            Some(row) => row.fields.push(candidate),
            None => rows.push(Row {
                y,
                fields: vec![candidate],
            }),
        }
    }
    rows
}

/// Top-to-bottom, then left-to-right, then by name so ties stay deterministic.
fn layout_order(a: &Field, b: &Field) -> Ordering {
    a.position
        .y
        .total_cmp(&b.position.y)
        .then_with(|| a.position.x.total_cmp(&b.position.x))
        .then_with(|| a.name.cmp(&b.name))
}
