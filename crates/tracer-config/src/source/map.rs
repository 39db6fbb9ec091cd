use std::collections::HashMap;

use super::{ConfigOrigin, PropertySource};

/// An in-memory source: explicit overrides, process properties, or captured
/// defaults.
#[derive(Debug, Clone)]
pub struct MapSource {
    origin: ConfigOrigin,
    values: HashMap<String, String>,
}

impl MapSource {
    /// Create a source of the given rank.
    pub fn new<K, V>(origin: ConfigOrigin, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            origin,
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Explicit programmatic overrides (highest priority).
    pub fn overrides<K: Into<String>, V: Into<String>>(
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self::new(ConfigOrigin::Override, values)
    }

    /// Process-level properties.
    pub fn process<K: Into<String>, V: Into<String>>(
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self::new(ConfigOrigin::Process, values)
    }

    /// Defaults captured from the running environment.
    pub fn captured<K: Into<String>, V: Into<String>>(
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self::new(ConfigOrigin::CapturedEnvironment, values)
    }
}

impl PropertySource for MapSource {
    fn origin(&self) -> ConfigOrigin {
        self.origin
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
