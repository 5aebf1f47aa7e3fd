//! Reduction of loosely-shaped provider output to displayable image references.
//!
//! Providers nest their payload differently: a bare URL, a list of URLs, an
//! object with `images`/`output`/... fields, an object with a `url` that may
//! be an accessor, or a raw base64 blob. Every caller goes through
//! [`normalize`] so identical input always yields identical references.

pub mod text;

pub use text::{collapse_whitespace, extract_text};

use crate::models::{CanonicalResult, MediaReference, RawValue};

/// Record keys searched for the payload, in order.
pub const PRIORITY_KEYS: [&str; 5] = ["images", "image", "output", "result", "data"];

/// Strings longer than this (in characters) are sniffed for bare base64.
pub const BASE64_MIN_LEN: usize = 1000;

/// Number of leading characters checked against the base64 alphabet.
pub const BASE64_SNIFF_LEN: usize = 120;

pub const DATA_URI_PNG_PREFIX: &str = "data:image/png;base64,";

/// Normalizes a raw provider response into ordered media references.
pub fn normalize(raw: &RawValue) -> CanonicalResult {
    extract_candidates(raw)
        .into_iter()
        .filter_map(normalize_item)
        .collect()
}

/// Picks the values to normalize individually, first rule that yields wins.
pub fn extract_candidates(raw: &RawValue) -> Vec<&RawValue> {
    if let RawValue::Record(map) = raw {
        for key in PRIORITY_KEYS {
            let Some(value) = map.get(key) else {
                continue;
            };
            let candidates = candidates_from_field(value);
            if !candidates.is_empty() {
                return candidates;
            }
        }
    }

    match raw {
        RawValue::Sequence(items) => items.iter().collect(),
        RawValue::String(s) if !s.trim().is_empty() => vec![raw],
        _ => Vec::new(),
    }
}

fn candidates_from_field(value: &RawValue) -> Vec<&RawValue> {
    match value {
        // A list holding records or nested lists is a single candidate that
        // picks its first element. Any other list is a list of outputs, with
        // nulls skipped.
        RawValue::Sequence(items) if items.iter().any(is_structured) => vec![value],
        RawValue::Sequence(items) => items.iter().filter(|item| !item.is_null()).collect(),
        RawValue::String(s) if !s.trim().is_empty() => vec![value],
        RawValue::Record(map) if !map.is_empty() => vec![value],
        _ => Vec::new(),
    }
}

fn is_structured(value: &RawValue) -> bool {
    matches!(value, RawValue::Record(_) | RawValue::Sequence(_))
}

/// Resolves one candidate to a reference, or `None` when it is unusable.
pub fn normalize_item(item: &RawValue) -> Option<MediaReference> {
    match item {
        RawValue::Record(_) => normalize_record(item),
        RawValue::Sequence(items) => items.first().and_then(normalize_item),
        RawValue::String(s) => normalize_str(s),
        _ => None,
    }
}

fn normalize_record(record: &RawValue) -> Option<MediaReference> {
    if let Some(found) = record.get("url").and_then(resolve_url_field) {
        return Some(found);
    }
    if let Some(found) = record.get("image").and_then(normalize_item) {
        return Some(found);
    }
    record
        .get("base64")
        .and_then(RawValue::as_str)
        .and_then(wrap_base64_field)
}

fn resolve_url_field(value: &RawValue) -> Option<MediaReference> {
    match value {
        RawValue::Accessor(accessor) => normalize_str(&accessor.call()),
        RawValue::Sequence(items) => items.first().and_then(resolve_url_field),
        other => normalize_item(other),
    }
}

fn wrap_base64_field(payload: &str) -> Option<MediaReference> {
    let trimmed = payload.trim();
    if trimmed.is_empty() || trimmed.starts_with("blob:") {
        return None;
    }
    if is_passthrough(trimmed) {
        return Some(MediaReference::new_unchecked(trimmed.to_string()));
    }
    Some(MediaReference::new_unchecked(format!(
        "{}{}",
        DATA_URI_PNG_PREFIX, trimmed
    )))
}

fn normalize_str(s: &str) -> Option<MediaReference> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if is_passthrough(trimmed) {
        return Some(MediaReference::new_unchecked(trimmed.to_string()));
    }
    if trimmed.starts_with("blob:") {
        log::debug!("Dropping browser-local reference: {}", trimmed);
        return None;
    }
    if looks_like_base64(trimmed) {
        return Some(MediaReference::new_unchecked(format!(
            "{}{}",
            DATA_URI_PNG_PREFIX, trimmed
        )));
    }
    Some(MediaReference::new_unchecked(trimmed.to_string()))
}

fn is_passthrough(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("data:image/")
}

fn looks_like_base64(s: &str) -> bool {
    if s.chars().count() <= BASE64_MIN_LEN {
        return false;
    }
    let prefix_ok = s
        .chars()
        .take(BASE64_SNIFF_LEN)
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/');
    let padding = s.len() - s.trim_end_matches('=').len();
    prefix_ok && padding <= 2
}
