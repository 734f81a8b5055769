//! Structured decomposition of repeating field names.
//!
//! Repeating keys fold three things into one identifier: the zone prefix, the
//! item index and the column, e.g. `Tr12Details` → (`Tr`, 12, `Details`).
//! `ItemKey` is derived once at the boundary so the rest of the core compares
//! structured values instead of re-parsing strings.
//!
//! # Column identity
//! The column is the name after the prefix with *every* digit removed, not only
//! the index digits. `Tr1USD2` and `Tr1USD` therefore share a column. This is
//! the established template convention and is kept as-is.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemKey {
    /// The repeating-block prefix (e.g. `Tr`).
    pub zone: String,
    /// First run of digits in the full name. `None` when the name has no digits
    /// or the run does not fit in a `u32`.
    pub index: Option<u32>,
    /// Name after the prefix, all digits stripped.
    pub column: String,
}

impl ItemKey {
    /// Decomposes `name` if it belongs to `zone`; returns `None` otherwise.
    pub fn parse(name: &str, zone: &str) -> Option<Self> {
        let rest = name.strip_prefix(zone)?;
        Some(Self {
            zone: zone.to_string(),
            index: first_index(name),
            column: strip_digits(rest),
        })
    }
}

/// Parses the first maximal run of ASCII digits in `name`.
pub fn first_index(name: &str) -> Option<u32> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = &name[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Removes every ASCII digit from `s`.
pub fn strip_digits(s: &str) -> String {
    s.chars().filter(|c| !c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_zone_index_column() {
        let key = ItemKey::parse("Tr12Details", "Tr").unwrap();
        assert_eq!(key.zone, "Tr");
        assert_eq!(key.index, Some(12));
        assert_eq!(key.column, "Details");
    }

    #[test]
    fn test_parse_outside_zone_is_none() {
        assert!(ItemKey::parse("Cname", "Tr").is_none());
    }

    #[test]
    fn test_parse_without_digits_has_no_index() {
        let key = ItemKey::parse("TrTotal", "Tr").unwrap();
        assert_eq!(key.index, None);
        assert_eq!(key.column, "Total");
    }

    #[test]
    fn test_column_strips_every_digit() {
        // Digits inside the column collapse too; both map to the same column.
        let a = ItemKey::parse("Tr3USD2", "Tr").unwrap();
        let b = ItemKey::parse("Tr3USD", "Tr").unwrap();
        assert_eq!(a.index, Some(3));
        assert_eq!(a.column, b.column);
    }

    #[test]
    fn test_first_index_takes_first_run_only() {
        assert_eq!(first_index("Tr7Col42"), Some(7));
        assert_eq!(first_index("Details"), None);
    }

    #[test]
    fn test_first_index_overflow_is_none() {
        assert_eq!(first_index("Tr99999999999Date"), None);
    }

    #[test]
    fn test_strip_digits() {
        assert_eq!(strip_digits("Tr15Pdate"), "TrPdate");
        assert_eq!(strip_digits(""), "");
    }
}
