use super::PRIORITY_KEYS;
use crate::models::RawValue;

/// Text answer from a loosely-shaped response: the first usable string in
/// the priority fields, else the whole value rendered as text. Surrounding
/// whitespace and quote characters are stripped.
pub fn extract_text(raw: &RawValue) -> String {
    let text = match raw {
        RawValue::Record(map) => PRIORITY_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(field_text)
            .unwrap_or_else(|| render(raw)),
        other => render(other),
    };
    strip_quotes(&text).to_string()
}

fn field_text(value: &RawValue) -> Option<String> {
    let text = match value {
        RawValue::String(s) => s.clone(),
        RawValue::Accessor(accessor) => accessor.call(),
        RawValue::Sequence(items) if items.iter().all(|item| item.as_str().is_some()) => {
            join_fragments(items)
        }
        _ => return None,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn render(raw: &RawValue) -> String {
    match raw {
        RawValue::Null => String::new(),
        RawValue::String(s) => s.clone(),
        RawValue::Accessor(accessor) => accessor.call(),
        // Streaming text models return token fragments.
        RawValue::Sequence(items) => join_fragments(items),
        other => other.to_json().to_string(),
    }
}

fn join_fragments(items: &[RawValue]) -> String {
    items.iter().map(render).collect()
}

fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
