use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::coerce;

/// Query key that selects a head-limit instead of filtering.
pub const LIMIT_KEY: &str = "_limit";

/// Keeps the records where every criterion (except `_limit`) is a
/// case-insensitive substring of the record's field of the same name.
/// Relative order is preserved.
pub fn filter<T>(records: Vec<T>, criteria: &HashMap<String, String>) -> Vec<T>
where
    T: Serialize,
{
    let criteria: Vec<(&str, String)> = criteria
        .iter()
        .filter(|(key, _)| key.as_str() != LIMIT_KEY)
        .map(|(key, value)| (key.as_str(), value.to_lowercase()))
        .collect();
    if criteria.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| match serde_json::to_value(record) {
            Ok(value) => matches(&value, &criteria),
            Err(_) => false,
        })
        .collect()
}

fn matches(record: &Value, criteria: &[(&str, String)]) -> bool {
    criteria.iter().all(|(key, needle)| match record.get(*key) {
        Some(field) if coerce::is_truthy(field) => {
            coerce::text_form(field).to_lowercase().contains(needle.as_str())
        }
        _ => false,
    })
}

/// Parses `_limit`. Anything but a non-negative integer means "no limit".
pub fn parse_limit(query: &HashMap<String, String>) -> Option<usize> {
    query.get(LIMIT_KEY)?.trim().parse::<usize>().ok()
}

pub fn apply_limit<T>(mut records: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    records
}
