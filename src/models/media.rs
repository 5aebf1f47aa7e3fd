use serde::Serialize;
use std::fmt;

/// A directly renderable image reference: an absolute URL, a
/// `data:image/...` URI, or a trimmed relative path / text fallback.
/// Never empty, never `blob:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MediaReference(String);

impl MediaReference {
    /// Only the normalizer builds references; it enforces the invariants.
    pub(crate) fn new_unchecked(value: String) -> Self {
        debug_assert!(!value.trim().is_empty());
        debug_assert!(!value.starts_with("blob:"));
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_url(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:image/")
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for MediaReference {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Ordered references derived from one provider response. Empty means the
/// provider produced nothing usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CanonicalResult(Vec<MediaReference>);

impl CanonicalResult {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MediaReference> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[MediaReference] {
        &self.0
    }

    pub fn into_urls(self) -> Vec<String> {
        self.0.into_iter().map(MediaReference::into_string).collect()
    }
}

impl FromIterator<MediaReference> for CanonicalResult {
    fn from_iter<I: IntoIterator<Item = MediaReference>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CanonicalResult {
    type Item = MediaReference;
    type IntoIter = std::vec::IntoIter<MediaReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
