//! Case-insensitive substring search over opaque records.

use crate::models::{render_value, Record};

/// Which fields a screen searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFields {
    /// Every field of the record.
    All,
    /// Only the listed fields.
    Only(&'static [&'static str]),
}

/// True when `query` occurs in one of the searched fields. A blank query
/// matches everything.
pub fn matches(record: &Record, query: &str, fields: &SearchFields) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    match fields {
        SearchFields::All => record
            .fields()
            .any(|(_, value)| render_value(value).to_lowercase().contains(&needle)),
        SearchFields::Only(names) => names
            .iter()
            .any(|name| record.text(name).to_lowercase().contains(&needle)),
    }
}

/// Records matching `query`, in collection order.
pub fn filter<'a>(records: &'a [Record], query: &str, fields: &SearchFields) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| matches(record, query, fields))
        .collect()
}
