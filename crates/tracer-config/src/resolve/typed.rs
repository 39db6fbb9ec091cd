use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use super::Resolver;
use crate::diagnostics::Diagnostic;
use crate::grammar::{
    ConfigEnum, Delimiters, OrderedMap, StatusSet, parse_bool, parse_enum_or, parse_enum_set,
    parse_ordered_map, parse_ordered_set, parse_sequence, parse_status_set,
};
use crate::source::ConfigOrigin;

impl Resolver {
    /// First-hit string value.
    #[must_use]
    pub fn get_string(&self, key: &str, aliases: &[&str]) -> Option<String> {
        self.resolve(key, aliases).map(|found| found.value)
    }

    /// First-hit string value, or `default` (recorded with origin
    /// [`ConfigOrigin::Default`]).
    #[must_use]
    pub fn get_string_or(&self, key: &str, default: &str, aliases: &[&str]) -> String {
        self.get_string(key, aliases)
            .unwrap_or_else(|| self.defaulted(key, default.to_owned()))
    }

    /// First-hit string value ignoring one source. Credentials use this to
    /// skip process properties, which are visible to other processes.
    #[must_use]
    pub fn get_string_excluding(
        &self,
        key: &str,
        excluded: ConfigOrigin,
        aliases: &[&str],
    ) -> Option<String> {
        self.resolve_excluding(key, aliases, &[excluded])
            .map(|found| found.value)
    }

    /// Value of `key` from the sources of one origin only.
    #[must_use]
    pub fn get_string_from(&self, origin: ConfigOrigin, key: &str) -> Option<String> {
        let others: Vec<ConfigOrigin> = self
            .origins()
            .into_iter()
            .filter(|o| *o != origin)
            .collect();
        self.resolve_excluding(key, &[], &others)
            .map(|found| found.value)
    }

    /// Boolean value (`true`/`false`/`1`/`0`).
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool, aliases: &[&str]) -> bool {
        self.get_optional_bool(key, aliases).unwrap_or_else(|| self.defaulted(key, default))
    }

    /// Boolean value, or `None` when unset or unparsable.
    #[must_use]
    pub fn get_optional_bool(&self, key: &str, aliases: &[&str]) -> Option<bool> {
        let found = self.resolve(key, aliases)?;
        let parsed = parse_bool(&found.value);
        if parsed.is_none() {
            self.report(Diagnostic::InvalidValue {
                setting: key.to_owned(),
                value: found.value,
                reason: "expected true, false, 1 or 0".to_owned(),
            });
        }
        parsed
    }

    /// 32-bit integer value.
    #[must_use]
    pub fn get_i32(&self, key: &str, default: i32, aliases: &[&str]) -> i32 {
        self.get_parsed(key, default, aliases)
    }

    /// 64-bit integer value.
    #[must_use]
    pub fn get_i64(&self, key: &str, default: i64, aliases: &[&str]) -> i64 {
        self.get_parsed(key, default, aliases)
    }

    /// 32-bit float value.
    #[must_use]
    pub fn get_f32(&self, key: &str, default: f32, aliases: &[&str]) -> f32 {
        self.get_parsed(key, default, aliases)
    }

    /// 64-bit float value.
    #[must_use]
    pub fn get_f64(&self, key: &str, default: f64, aliases: &[&str]) -> f64 {
        self.get_parsed(key, default, aliases)
    }

    /// Parse a scalar; a value that does not parse reports a diagnostic and
    /// yields `default`. Lower sources are not consulted.
    fn get_parsed<T>(&self, key: &str, default: T, aliases: &[&str]) -> T
    where
        T: FromStr + Display,
        T::Err: Display,
    {
        let Some(found) = self.resolve(key, aliases) else {
            return self.defaulted(key, default);
        };
        match found.value.parse::<T>() {
            Ok(value) => value,
            Err(e) => {
                self.report(Diagnostic::InvalidValue {
                    setting: key.to_owned(),
                    value: found.value,
                    reason: e.to_string(),
                });
                default
            },
        }
    }

    /// Single enum variant with fallback.
    #[must_use]
    pub fn get_enum<E: ConfigEnum>(&self, key: &str, default: E, aliases: &[&str]) -> E {
        let Some(found) = self.resolve(key, aliases) else {
            self.collector
                .put(key, default.config_name(), ConfigOrigin::Default);
            return default;
        };
        let parsed = parse_enum_or(&found.value, default);
        self.report_unrecognized(key, parsed.rejected);
        parsed.value
    }

    /// Comma-separated list, duplicates kept.
    #[must_use]
    pub fn get_list(&self, key: &str, aliases: &[&str]) -> Vec<String> {
        self.get_string(key, aliases)
            .map(|raw| parse_sequence(&raw, Delimiters::Comma))
            .unwrap_or_default()
    }

    /// List split on commas and whitespace, duplicates kept.
    #[must_use]
    pub fn get_spaced_list(&self, key: &str, aliases: &[&str]) -> Vec<String> {
        self.get_string(key, aliases)
            .map(|raw| parse_sequence(&raw, Delimiters::CommaOrWhitespace))
            .unwrap_or_default()
    }

    /// Comma-separated set in first-seen order.
    #[must_use]
    pub fn get_set(&self, key: &str, aliases: &[&str]) -> Vec<String> {
        self.get_string(key, aliases)
            .map(|raw| parse_ordered_set(&raw, Delimiters::Comma))
            .unwrap_or_default()
    }

    /// Ordered, de-duplicated set of enum variants. Unknown names are
    /// reported and skipped.
    #[must_use]
    pub fn get_enum_set<E: ConfigEnum>(
        &self,
        key: &str,
        delimiters: Delimiters,
        aliases: &[&str],
    ) -> Vec<E> {
        let Some(found) = self.resolve(key, aliases) else {
            return Vec::new();
        };
        let parsed = parse_enum_set(&found.value, delimiters);
        self.report_unrecognized(key, parsed.rejected);
        parsed.value
    }

    /// First-hit `key=value` map, unordered.
    #[must_use]
    pub fn get_map(&self, key: &str, aliases: &[&str]) -> HashMap<String, String> {
        self.get_ordered_map(key, aliases)
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    /// First-hit `key=value` map in declaration order.
    #[must_use]
    pub fn get_ordered_map(&self, key: &str, aliases: &[&str]) -> OrderedMap {
        let Some(found) = self.resolve(key, aliases) else {
            return OrderedMap::new();
        };
        self.accept(key, parse_ordered_map(&found.value, Delimiters::Comma))
    }

    /// Status code set such as `400-403,405`.
    #[must_use]
    pub fn get_integer_range(&self, key: &str, default: StatusSet, aliases: &[&str]) -> StatusSet {
        let Some(found) = self.resolve(key, aliases) else {
            return self.defaulted(key, default);
        };
        self.accept(key, parse_status_set(&found.value, default))
    }

    /// Whether an integration is enabled under any of its names.
    ///
    /// Each name is tried as `{prefix}{name}{suffix}`; the first one set
    /// decides, otherwise `default` applies.
    #[must_use]
    pub fn is_enabled(&self, names: &[&str], prefix: &str, suffix: &str, default: bool) -> bool {
        names
            .iter()
            .find_map(|name| self.get_optional_bool(&format!("{prefix}{name}{suffix}"), &[]))
            .unwrap_or(default)
    }

    fn defaulted<T: Display>(&self, key: &str, default: T) -> T {
        self.collector
            .put(key, &default.to_string(), ConfigOrigin::Default);
        default
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::diagnostics::{DiagnosticSink, Diagnostics};
    use crate::resolve::ConfigCollector;
    use crate::source::{EnvSource, MapSource, PropertySource};

    fn resolver_with(
        process: &[(&str, &str)],
        env: &[(&str, &str)],
    ) -> (Resolver, Arc<Diagnostics>) {
        let diagnostics = Arc::new(Diagnostics::new());
        let sources: Vec<Box<dyn PropertySource>> = vec![
            Box::new(MapSource::process(process.iter().copied())),
            Box::new(EnvSource::from_vars(env.iter().copied())),
        ];
        let resolver = Resolver::new(
            sources,
            Arc::clone(&diagnostics) as Arc<dyn DiagnosticSink>,
            Arc::new(ConfigCollector::new()),
        );
        (resolver, diagnostics)
    }

    #[test]
    fn test_defaults_are_collected_with_default_origin() {
        let (resolver, _) = resolver_with(&[], &[]);
        assert_eq!(resolver.get_i32("trace.agent.port", 8126, &[]), 8126);
        let entry = resolver.collector().get("trace.agent.port").unwrap();
        assert_eq!(entry.value, "8126");
        assert_eq!(entry.origin, ConfigOrigin::Default);
    }

    #[test]
    fn test_unparsable_number_uses_default_and_reports() {
        let (resolver, diagnostics) =
            resolver_with(&[("trace.agent.port", "eighty")], &[("DD_TRACE_AGENT_PORT", "9000")]);
        assert_eq!(resolver.get_i32("trace.agent.port", 8126, &[]), 8126);
        assert_eq!(
            diagnostics.count(|d| matches!(d, Diagnostic::InvalidValue { .. })),
            1
        );
    }

    #[test]
    fn test_floats_and_longs() {
        let (resolver, _) = resolver_with(
            &[("telemetry.heartbeat.interval", "12.5")],
            &[("DD_TELEMETRY_EXTENDED_HEARTBEAT_INTERVAL", "172800")],
        );
        let heartbeat = resolver.get_f32("telemetry.heartbeat.interval", 60.0, &[]);
        assert!((heartbeat - 12.5).abs() < f32::EPSILON);
        let precise = resolver.get_f64("telemetry.heartbeat.interval", 60.0, &[]);
        assert!((precise - 12.5).abs() < f64::EPSILON);
        let missing = resolver.get_f64("trace.sample.rate", 1.0, &[]);
        assert!((missing - 1.0).abs() < f64::EPSILON);
        assert_eq!(
            resolver.get_i64("telemetry.extended.heartbeat.interval", 86_400, &[]),
            172_800
        );
    }

    #[test]
    fn test_bool_accepts_numeric_forms() {
        let (resolver, diagnostics) = resolver_with(
            &[("trace.enabled", "0"), ("profiling.enabled", "maybe")],
            &[],
        );
        assert!(!resolver.get_bool("trace.enabled", true, &[]));
        assert!(resolver.get_bool("profiling.enabled", true, &[]));
        assert_eq!(diagnostics.entries().len(), 1);
    }

    #[test]
    fn test_excluding_process_properties() {
        let (resolver, _) = resolver_with(&[("api-key", "visible")], &[("DD_API_KEY", "secret")]);
        assert_eq!(
            resolver
                .get_string_excluding("api-key", ConfigOrigin::Process, &[])
                .as_deref(),
            Some("secret")
        );
    }

    #[test]
    fn test_get_string_from_one_origin() {
        let (resolver, _) = resolver_with(
            &[("profiling.api-key", "from-process")],
            &[("DD_PROFILING_API_KEY", "from-env")],
        );
        assert_eq!(
            resolver
                .get_string_from(ConfigOrigin::Environment, "profiling.api-key")
                .as_deref(),
            Some("from-env")
        );
        assert_eq!(
            resolver.get_string_from(ConfigOrigin::File, "profiling.api-key"),
            None
        );
    }

    #[test]
    fn test_lists_and_sets() {
        let (resolver, _) = resolver_with(
            &[
                ("a", "x, y,, x"),
                ("b", "x y,z"),
            ],
            &[],
        );
        assert_eq!(resolver.get_list("a", &[]), vec!["x", "y", "x"]);
        assert_eq!(resolver.get_set("a", &[]), vec!["x", "y"]);
        assert_eq!(resolver.get_spaced_list("b", &[]), vec!["x", "y", "z"]);
        assert!(resolver.get_list("missing", &[]).is_empty());
    }

    #[test]
    fn test_maps() {
        let (resolver, _) = resolver_with(&[("trace.service.mapping", "a=b, c=d")], &[]);
        let ordered = resolver.get_ordered_map("trace.service.mapping", &[]);
        assert_eq!(ordered.iter().collect::<Vec<_>>(), vec![("a", "b"), ("c", "d")]);
        let map = resolver.get_map("trace.service.mapping", &[]);
        assert_eq!(map.get("c").map(String::as_str), Some("d"));
    }

    #[test]
    fn test_integer_range() {
        let (resolver, diagnostics) =
            resolver_with(&[("http.server.error.statuses", "500-502,abc")], &[]);
        let set = resolver.get_integer_range(
            "http.server.error.statuses",
            StatusSet::server_errors(),
            &[],
        );
        assert_eq!(set.to_string(), "500-502");
        assert_eq!(diagnostics.entries().len(), 1);

        let fallback = resolver.get_integer_range(
            "http.client.error.statuses",
            StatusSet::client_errors(),
            &[],
        );
        assert_eq!(fallback, StatusSet::client_errors());
    }

    #[test]
    fn test_is_enabled_first_set_name_decides() {
        let (resolver, _) = resolver_with(
            &[("integration.jdbc-datasource.enabled", "false")],
            &[("DD_INTEGRATION_JDBC_ENABLED", "true")],
        );
        assert!(resolver.is_enabled(
            &["jdbc", "jdbc-datasource"],
            "integration.",
            ".enabled",
            false
        ));
        assert!(!resolver.is_enabled(&["jdbc-datasource"], "integration.", ".enabled", true));
        assert!(resolver.is_enabled(&["grpc"], "integration.", ".enabled", true));
    }
}
