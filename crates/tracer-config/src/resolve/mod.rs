//! Ranked, first-hit setting resolution.
//!
//! The [`Resolver`] owns the ordered source list for one snapshot build. A
//! lookup walks the sources from highest to lowest priority and, inside each
//! source, tries the canonical key before its aliases. The first non-empty
//! value wins and lower sources are never consulted. The merged variants
//! ([`Resolver::get_merged_map`] and friends) instead read every source and
//! layer the results, lowest priority first.

mod collector;
mod typed;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

pub use collector::{CollectedSetting, ConfigCollector, MASK, is_secret_key};

use crate::diagnostics::{Diagnostic, DiagnosticSink, Diagnostics};
use crate::grammar::{
    Delimiters, OrderedMap, Parsed, Rejected, parse_map_with_optional_mappings,
    parse_ordered_map, parse_ordered_set, push_unique,
};
use crate::source::{ConfigOrigin, PropertySource};

/// A value found in a source, with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    /// The trimmed raw value.
    pub value: String,
    /// Which source supplied it.
    pub origin: ConfigOrigin,
    /// Which name matched: the canonical key or one of its aliases.
    pub key: String,
}

/// First-hit lookup over a fixed, ranked list of sources.
pub struct Resolver {
    sources: Vec<Box<dyn PropertySource>>,
    diagnostics: Arc<dyn DiagnosticSink>,
    collector: Arc<ConfigCollector>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origins: Vec<ConfigOrigin> = self.sources.iter().map(|s| s.origin()).collect();
        f.debug_struct("Resolver")
            .field("sources", &origins)
            .field("collected", &self.collector.len())
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Create a resolver. Sources are ordered by [`ConfigOrigin`] rank; the
    /// relative order of sources sharing a rank is kept.
    #[must_use]
    pub fn new(
        mut sources: Vec<Box<dyn PropertySource>>,
        diagnostics: Arc<dyn DiagnosticSink>,
        collector: Arc<ConfigCollector>,
    ) -> Self {
        sources.sort_by_key(|source| source.origin());
        Self {
            sources,
            diagnostics,
            collector,
        }
    }

    /// Create a resolver with a fresh [`Diagnostics`] sink and collector.
    #[must_use]
    pub fn from_sources(sources: Vec<Box<dyn PropertySource>>) -> Self {
        Self::new(
            sources,
            Arc::new(Diagnostics::new()),
            Arc::new(ConfigCollector::new()),
        )
    }

    /// The collector receiving every resolved value.
    #[must_use]
    pub fn collector(&self) -> &Arc<ConfigCollector> {
        &self.collector
    }

    /// Record a diagnostic through the configured sink.
    pub fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.record(diagnostic);
    }

    /// The configured diagnostics sink.
    #[must_use]
    pub fn diagnostics(&self) -> &dyn DiagnosticSink {
        self.diagnostics.as_ref()
    }

    /// Origins of the configured sources, highest priority first.
    #[must_use]
    pub fn origins(&self) -> Vec<ConfigOrigin> {
        self.sources.iter().map(|s| s.origin()).collect()
    }

    /// Resolve `key` (then `aliases`) across every source.
    #[must_use]
    pub fn resolve(&self, key: &str, aliases: &[&str]) -> Option<ResolvedValue> {
        self.resolve_excluding(key, aliases, &[])
    }

    /// Resolve `key` (then `aliases`), skipping sources whose origin is in
    /// `excluded`.
    #[must_use]
    pub fn resolve_excluding(
        &self,
        key: &str,
        aliases: &[&str],
        excluded: &[ConfigOrigin],
    ) -> Option<ResolvedValue> {
        let found = self.find(key, aliases, |origin| !excluded.contains(&origin))?;
        self.collector.put(key, &found.value, found.origin);
        Some(found)
    }

    /// Whether any source sets `key` or one of its aliases.
    ///
    /// Does not record anything in the collector.
    #[must_use]
    pub fn is_set(&self, key: &str, aliases: &[&str]) -> bool {
        self.find(key, aliases, |_| true).is_some()
    }

    /// Look up a raw, source-specific name (such as an unprefixed
    /// environment variable) in the first source that knows it.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<String> {
        self.sources
            .iter()
            .find_map(|source| source.get_raw(name))
            .filter(|value| !value.trim().is_empty())
    }

    fn find(
        &self,
        key: &str,
        aliases: &[&str],
        accept: impl Fn(ConfigOrigin) -> bool,
    ) -> Option<ResolvedValue> {
        for source in &self.sources {
            let origin = source.origin();
            if !accept(origin) {
                continue;
            }
            if let Some((name, value)) = first_present(source.as_ref(), key, aliases) {
                debug!(key, matched = name, %origin, "resolved setting");
                return Some(ResolvedValue {
                    value,
                    origin,
                    key: name.to_owned(),
                });
            }
        }
        None
    }

    /// Collect `key` from every source and layer the maps, lowest priority
    /// first, so higher sources add entries and override colliding keys.
    #[must_use]
    pub fn get_merged_map(&self, key: &str, aliases: &[&str]) -> OrderedMap {
        let mut merged = OrderedMap::new();
        let mut top: Option<ConfigOrigin> = None;
        for source in self.sources.iter().rev() {
            let Some((name, value)) = first_present(source.as_ref(), key, aliases) else {
                continue;
            };
            let parsed = parse_ordered_map(&value, Delimiters::Comma);
            self.report_invalid(name, parsed.rejected);
            merged.extend(&parsed.value);
            top = Some(source.origin());
        }
        if let Some(origin) = top {
            self.collector.put(key, &render_map(&merged), origin);
        }
        merged
    }

    /// Merged map for header-tag style settings: a bare key maps to
    /// `prefix` plus the normalised key, or to itself without a prefix.
    ///
    /// Every key in `keys` is merged in turn, each one layered lowest source
    /// first.
    #[must_use]
    pub fn get_merged_map_with_optional_mappings(
        &self,
        prefix: Option<&str>,
        lowercase_keys: bool,
        keys: &[&str],
    ) -> OrderedMap {
        let mut merged = OrderedMap::new();
        for key in keys {
            let mut top: Option<ConfigOrigin> = None;
            for source in self.sources.iter().rev() {
                let Some(value) = present(source.as_ref(), key) else {
                    continue;
                };
                let parsed = parse_map_with_optional_mappings(&value, prefix, lowercase_keys);
                self.report_invalid(key, parsed.rejected);
                merged.extend(&parsed.value);
                top = Some(source.origin());
            }
            if let Some(origin) = top {
                self.collector.put(key, &render_map(&merged), origin);
            }
        }
        merged
    }

    /// Union of the set-valued `key` across every source, lowest priority
    /// entries first.
    #[must_use]
    pub fn get_merged_set(&self, key: &str, aliases: &[&str]) -> Vec<String> {
        let mut merged = Vec::new();
        let mut top: Option<ConfigOrigin> = None;
        for source in self.sources.iter().rev() {
            let Some((_, value)) = first_present(source.as_ref(), key, aliases) else {
                continue;
            };
            for item in parse_ordered_set(&value, Delimiters::Comma) {
                push_unique(&mut merged, item);
            }
            top = Some(source.origin());
        }
        if let Some(origin) = top {
            self.collector.put(key, &merged.join(","), origin);
        }
        merged
    }

    pub(crate) fn report_invalid(&self, setting: &str, rejected: Vec<Rejected>) {
        for Rejected { token, reason } in rejected {
            self.report(Diagnostic::InvalidValue {
                setting: setting.to_owned(),
                value: token,
                reason,
            });
        }
    }

    pub(crate) fn report_unrecognized(&self, setting: &str, rejected: Vec<Rejected>) {
        for Rejected { token, .. } in rejected {
            self.report(Diagnostic::UnrecognizedValue {
                setting: setting.to_owned(),
                value: token,
            });
        }
    }

    /// Report a parse's rejections against `setting` and return its value.
    pub(crate) fn accept<T>(&self, setting: &str, parsed: Parsed<T>) -> T {
        self.report_invalid(setting, parsed.rejected);
        parsed.value
    }
}

/// Non-empty, trimmed value of `key` in `source`.
fn present(source: &dyn PropertySource, key: &str) -> Option<String> {
    source
        .get(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// First of `key` and `aliases` that `source` sets, with its value.
fn first_present<'k>(
    source: &dyn PropertySource,
    key: &'k str,
    aliases: &[&'k str],
) -> Option<(&'k str, String)> {
    std::iter::once(key)
        .chain(aliases.iter().copied())
        .find_map(|name| present(source, name).map(|value| (name, value)))
}

fn render_map(map: &OrderedMap) -> String {
    map.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}
