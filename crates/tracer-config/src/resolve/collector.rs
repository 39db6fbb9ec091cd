use std::collections::BTreeMap;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;

use crate::source::ConfigOrigin;

/// Rendering used for secret-shaped values wherever they leave the crate.
pub const MASK: &str = "****";

/// Whether a setting key names a credential whose value must never be shown.
#[must_use]
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    (key.contains("api-key") || key.contains("apikey") || key.contains("application-key"))
        && !key.ends_with("file")
}

/// One collected setting: the value used and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectedSetting {
    /// Raw value (masked for credentials).
    pub value: String,
    /// Source that supplied it.
    pub origin: ConfigOrigin,
}

/// Process-wide record of which source supplied each setting.
///
/// The first record for a key wins; later records are ignored. The map is
/// concurrent so one collector can be shared between snapshot builds.
#[derive(Debug, Default)]
pub struct ConfigCollector {
    entries: DashMap<String, CollectedSetting>,
}

impl ConfigCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` unless it has already been recorded.
    ///
    /// Returns `true` if this call inserted the entry.
    pub fn put(&self, key: &str, value: &str, origin: ConfigOrigin) -> bool {
        match self.entries.entry(key.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let value = if is_secret_key(key) {
                    MASK.to_owned()
                } else {
                    value.to_owned()
                };
                slot.insert(CollectedSetting { value, origin });
                true
            },
        }
    }

    /// Look up a collected setting.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<CollectedSetting> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Sorted copy of everything collected so far.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, CollectedSetting> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of collected settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
