//! End-to-end resolution through the public API.

use tracer_config::grammar::StatusSet;
use tracer_config::reconcile::TracePropagationStyle;
use tracer_config::resolve::Resolver;
use tracer_config::source::{ConfigOrigin, EnvSource, MapSource, PropertySource};
use tracer_config::{ConfigBuilder, ConfigError, Diagnostic, ResolvedConfig};

fn stack(process: &[(&str, &str)], env: &[(&str, &str)]) -> Vec<Box<dyn PropertySource>> {
    vec![
        Box::new(MapSource::process(process.iter().copied())),
        Box::new(EnvSource::from_vars(env.iter().copied())),
    ]
}

fn build(process: &[(&str, &str)], env: &[(&str, &str)]) -> ResolvedConfig {
    ConfigBuilder::new()
        .sources(stack(process, env))
        .build()
        .unwrap()
}

fn count(resolved: &ResolvedConfig, predicate: impl Fn(&Diagnostic) -> bool) -> usize {
    resolved.diagnostics.iter().filter(|d| predicate(d)).count()
}

#[test]
fn same_sources_give_equal_snapshots() {
    let process = [
        ("trace.propagation.style.extract", "b3multi"),
        ("trace.http.server.error.statuses", "500-504"),
    ];
    let env = [
        ("DD_PROPAGATION_STYLE_EXTRACT", "datadog"),
        ("DD_TRACE_GLOBAL_TAGS", "team=apm"),
        ("DD_SERVICE", "checkout"),
    ];
    let first = build(&process, &env);
    let second = build(&process, &env);

    assert_eq!(first.config, second.config);
    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.field_sources, second.field_sources);
}

#[test]
fn first_hit_stops_at_highest_source() {
    let resolved = build(&[("env", "staging")], &[("DD_ENV", "prod")]);
    assert_eq!(resolved.config.service.env.as_deref(), Some("staging"));
    assert_eq!(
        resolved.origin_of("env").map(|s| s.origin),
        Some(ConfigOrigin::Process)
    );
}

#[test]
fn empty_values_fall_through() {
    let resolved = build(&[("env", "   ")], &[("DD_ENV", "prod")]);
    assert_eq!(resolved.config.service.env.as_deref(), Some("prod"));
}

#[test]
fn map_settings_merge_across_sources() {
    let resolved = build(
        &[("trace.global.tags", "team=tracing,tier=1")],
        &[("DD_TRACE_GLOBAL_TAGS", "team=apm,region=us")],
    );
    let tags = &resolved.config.service.tags;
    assert_eq!(tags.get("team"), Some("tracing"));
    assert_eq!(tags.get("tier"), Some("1"));
    assert_eq!(tags.get("region"), Some("us"));
}

#[test]
fn deprecated_styles_convert_when_alone() {
    let resolved = build(&[], &[("DD_PROPAGATION_STYLE_EXTRACT", "B3")]);
    assert_eq!(
        resolved.config.propagation.extract,
        vec![TracePropagationStyle::B3Single, TracePropagationStyle::B3Multi]
    );
    assert_eq!(
        count(&resolved, |d| matches!(d, Diagnostic::DeprecatedConverted { .. })),
        1
    );
}

#[test]
fn current_styles_override_deprecated_once_per_direction() {
    let resolved = build(
        &[
            ("trace.propagation.style.extract", "tracecontext"),
            ("trace.propagation.style.inject", "datadog"),
        ],
        &[
            ("DD_PROPAGATION_STYLE_EXTRACT", "b3"),
            ("DD_PROPAGATION_STYLE_INJECT", "haystack"),
        ],
    );
    assert_eq!(
        resolved.config.propagation.extract,
        vec![TracePropagationStyle::TraceContext]
    );
    assert_eq!(
        resolved.config.propagation.inject,
        vec![TracePropagationStyle::Datadog]
    );
    for deprecated in ["propagation.style.extract", "propagation.style.inject"] {
        assert_eq!(
            count(&resolved, |d| matches!(
                d,
                Diagnostic::OverriddenDeprecated { setting, .. } if setting == deprecated
            )),
            1
        );
    }
}

#[test]
fn status_ranges_parse_and_fall_back() {
    let resolved = build(&[("trace.http.client.error.statuses", "400-403, 429")], &[]);
    let client = &resolved.config.trace.http_client_error_statuses;
    assert!(client.contains(403));
    assert!(client.contains(429));
    assert!(!client.contains(404));

    let resolved = build(&[("trace.http.server.error.statuses", "abc")], &[]);
    assert_eq!(
        resolved.config.trace.http_server_error_statuses,
        StatusSet::server_errors()
    );
    assert_eq!(
        count(&resolved, |d| matches!(d, Diagnostic::InvalidValue { .. })),
        1
    );
}

#[test]
fn ordered_set_drops_blanks_and_duplicates() {
    let resolver = Resolver::from_sources(stack(&[("trace.split-by-tags", "b, a,, b")], &[]));
    assert_eq!(resolver.get_set("trace.split-by-tags", &[]), vec!["b", "a"]);
}

#[test]
fn api_key_falls_back_through_generations() {
    let resolved = build(&[], &[("DD_PROFILING_API_KEY", "legacy-key")]);
    assert_eq!(
        resolved.config.credentials.api_key.as_deref(),
        Some("legacy-key")
    );
    assert!(!format!("{:?}", resolved.config).contains("legacy-key"));

    let resolved = build(
        &[],
        &[
            ("DD_API_KEY", "current-key"),
            ("DD_PROFILING_API_KEY", "legacy-key"),
        ],
    );
    assert_eq!(
        resolved.config.credentials.api_key.as_deref(),
        Some("current-key")
    );
}

#[test]
fn legacy_key_files_follow_an_unreadable_current_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiling.key");
    std::fs::write(&path, "  secret\n").unwrap();
    let path = path.display().to_string();

    for legacy_file_var in ["DD_PROFILING_API_KEY_FILE", "DD_PROFILING_APIKEY_FILE"] {
        let resolved = build(
            &[],
            &[
                ("DD_API_KEY_FILE", "/nonexistent/api.key"),
                (legacy_file_var, path.as_str()),
            ],
        );
        assert_eq!(
            resolved.config.credentials.api_key.as_deref(),
            Some("secret"),
            "{legacy_file_var}"
        );
        assert_eq!(
            count(&resolved, |d| matches!(
                d,
                Diagnostic::UnreadableFile { setting, .. } if setting == "api-key-file"
            )),
            1
        );
        assert_eq!(
            count(&resolved, |d| matches!(d, Diagnostic::UnreadableFile { .. })),
            1
        );
    }
}

#[test]
fn agentless_ci_visibility_needs_an_api_key() {
    let env = [
        ("DD_CIVISIBILITY_ENABLED", "true"),
        ("DD_CIVISIBILITY_AGENTLESS_ENABLED", "true"),
    ];
    let err = ConfigBuilder::new()
        .sources(stack(&[], &env))
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::FatalMisconfiguration { .. }));

    let mut with_key = env.to_vec();
    with_key.push(("DD_API_KEY", "key"));
    let resolved = build(&[], &with_key);
    assert!(resolved.config.ci_visibility.agentless_enabled);
    assert_eq!(resolved.config.log_submission.product, "citest");
}

#[test]
fn heartbeat_outside_range_uses_default() {
    let resolved = build(&[], &[("DD_TELEMETRY_HEARTBEAT_INTERVAL", "9999")]);
    assert!((resolved.config.telemetry.heartbeat_interval_secs - 60.0).abs() < f32::EPSILON);
    assert_eq!(
        count(&resolved, |d| matches!(
            d,
            Diagnostic::OutOfRange { setting, .. } if setting == "telemetry.heartbeat.interval"
        )),
        1
    );
}

#[test]
fn snapshot_is_shareable_across_threads() {
    let resolved = build(&[("service", "worker")], &[]);
    let config = std::sync::Arc::clone(&resolved.config);
    let name = std::thread::spawn(move || config.service.name.clone())
        .join()
        .unwrap();
    assert_eq!(name, "worker");
}
