use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::sequence::{Delimiters, parse_sequence};
use super::{Parsed, Rejected};

/// Insertion-ordered string map.
///
/// Re-inserting an existing key replaces its value but keeps the slot of
/// the first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedMap {
    entries: Vec<(String, String)>,
}

impl OrderedMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`. Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(existing, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Layer `other` on top of `self`: new keys are appended, colliding keys
    /// take `other`'s value.
    pub fn extend(&mut self, other: &Self) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for OrderedMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Parse `key=value` pairs separated by `delimiters` into an [`OrderedMap`].
///
/// Keys and values are trimmed. Pairs without `=` or with an empty key are
/// rejected.
#[must_use]
pub fn parse_ordered_map(raw: &str, delimiters: Delimiters) -> Parsed<OrderedMap> {
    let mut parsed = Parsed::clean(OrderedMap::new());
    for token in parse_sequence(raw, delimiters) {
        let Some((key, value)) = token.split_once('=') else {
            parsed
                .rejected
                .push(Rejected::new(token.clone(), "expected key=value"));
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            parsed
                .rejected
                .push(Rejected::new(token.clone(), "empty key"));
            continue;
        }
        parsed.value.insert(key, value.trim());
    }
    parsed
}

/// Parse a map in which the value is optional.
///
/// `key=value` behaves as in [`parse_ordered_map`]. A bare `key` (or one with
/// an empty value) maps to `prefix` followed by [`normalize_tag_name`] of
/// the key, or to the key itself when there is no prefix. With
/// `lowercase_keys`, keys are lower-cased (header names are
/// case-insensitive).
#[must_use]
pub fn parse_map_with_optional_mappings(
    raw: &str,
    prefix: Option<&str>,
    lowercase_keys: bool,
) -> Parsed<OrderedMap> {
    let mut parsed = Parsed::clean(OrderedMap::new());
    for token in parse_sequence(raw, Delimiters::Comma) {
        let (key, value) = match token.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (token.as_str(), ""),
        };
        if key.is_empty() {
            parsed.rejected.push(Rejected::new(token.clone(), "empty key"));
            continue;
        }
        let key = if lowercase_keys {
            key.to_lowercase()
        } else {
            key.to_owned()
        };
        let value = if value.is_empty() {
            match prefix {
                Some(p) => format!("{p}{}", normalize_tag_name(&key)),
                None => key.clone(),
            }
        } else {
            value.to_owned()
        };
        parsed.value.insert(key, value);
    }
    parsed
}

/// Lower-case `name` and replace anything other than ASCII alphanumerics,
/// `-` and `/` with `_`.
#[must_use]
pub fn normalize_tag_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '/' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
