//! Snapshot assembly.
//!
//! [`ConfigBuilder`] owns one source stack and turns it into a frozen
//! [`Config`] in a single synchronous pass. Each section is resolved by its
//! own function so dependent values (partial flush, profiling startup,
//! agent endpoint) are derived next to the settings they depend on.

use std::sync::Arc;

use tracing::info;
use url::Url;

use crate::credentials;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Diagnostics};
use crate::error::ConfigResult;
use crate::grammar::{ConfigEnum, OrderedMap, StatusSet, parse_enum};
use crate::keys;
use crate::reconcile::PROPAGATION_STYLE;
use crate::resolve::{ConfigCollector, Resolver};
use crate::show::ResolvedConfig;
use crate::source::{ConfigOrigin, PropertySource};
use crate::types::{
    AgentSection, CiVisibilitySection, Config, IdGenerationStrategy, LogSubmissionSection,
    LongRunningSection, ProfilingEnablement, ProfilingSection, PropagationSection,
    RuntimeMetricsSection, ServiceSection, TelemetrySection, TraceSection,
};
use crate::validate::{
    LONG_RUNNING_FLUSH_RANGE, LONG_RUNNING_INITIAL_FLUSH_RANGE, TELEMETRY_INTERVAL_RANGE,
    check_invariants, positive, within,
};

const AWS_LAMBDA_SNAP_START: &str = "snap-start";
const REQUEST_HEADER_PREFIX: &str = "http.request.headers.";
const RESPONSE_HEADER_PREFIX: &str = "http.response.headers.";
const UNIX_SOCKET_PREFIX: &str = "unix://";
const CI_VISIBILITY_PRODUCT: &str = "citest";

/// Builds one configuration snapshot from an explicit source stack.
#[derive(Debug)]
pub struct ConfigBuilder {
    sources: Vec<Box<dyn PropertySource>>,
    diagnostics: Arc<Diagnostics>,
    collector: Arc<ConfigCollector>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// A builder with no sources: building it yields the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            diagnostics: Arc::new(Diagnostics::new()),
            collector: Arc::new(ConfigCollector::new()),
        }
    }

    /// Add one source. Sources are ranked by origin, not insertion order.
    #[must_use]
    pub fn source(mut self, source: impl PropertySource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Add several boxed sources.
    #[must_use]
    pub fn sources(mut self, sources: impl IntoIterator<Item = Box<dyn PropertySource>>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Record origins into a shared collector instead of a private one.
    #[must_use]
    pub fn collector(mut self, collector: Arc<ConfigCollector>) -> Self {
        self.collector = collector;
        self
    }

    /// Record diagnostics into a shared sink instead of a private one.
    #[must_use]
    pub fn diagnostics(mut self, diagnostics: Arc<Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Resolve every section and check cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::FatalMisconfiguration`] when the
    /// resolved settings cannot work together. Every other problem is
    /// recorded as a [`Diagnostic`] and the affected setting falls back to
    /// its default.
    pub fn build(self) -> ConfigResult<ResolvedConfig> {
        let loaded_files: Vec<String> = self
            .sources
            .iter()
            .filter_map(|source| source.location())
            .map(|path| path.display().to_string())
            .collect();

        let resolver = Resolver::new(
            self.sources,
            Arc::clone(&self.diagnostics) as Arc<dyn DiagnosticSink>,
            Arc::clone(&self.collector),
        );

        let ci_visibility = ci_visibility_section(&resolver);
        let config = Config {
            service: service_section(&resolver),
            agent: agent_section(&resolver),
            credentials: credentials::resolve(&resolver),
            propagation: propagation_section(&resolver),
            trace: trace_section(&resolver),
            profiling: profiling_section(&resolver),
            telemetry: telemetry_section(&resolver),
            runtime_metrics: runtime_metrics_section(&resolver),
            log_submission: log_submission_section(&resolver, ci_visibility.enabled),
            ci_visibility,
        };

        check_invariants(&config, resolver.diagnostics())?;

        info!(
            service = %config.service.name,
            agent = %config.agent.url,
            files = loaded_files.len(),
            "configuration resolved"
        );

        Ok(ResolvedConfig {
            config: Arc::new(config),
            field_sources: self.collector.snapshot(),
            diagnostics: self.diagnostics.entries(),
            loaded_files,
        })
    }
}

fn service_section(r: &Resolver) -> ServiceSection {
    let defaults = ServiceSection::default();

    let user_service = r.resolve_excluding(
        keys::SERVICE,
        &[keys::SERVICE_NAME],
        &[ConfigOrigin::CapturedEnvironment],
    );
    let (name, name_set_by_user) = match user_service {
        Some(found) => (found.value, true),
        None => (
            r.get_string_or(keys::SERVICE, &defaults.name, &[keys::SERVICE_NAME]),
            false,
        ),
    };

    let env = r.get_string(keys::ENV, &[]);
    let version = r.get_string(keys::VERSION, &[]);

    let mut tags = r.get_merged_map(keys::GLOBAL_TAGS, &[]);
    tags.extend(&r.get_merged_map(keys::TRACE_TAGS, &[keys::TAGS]));
    if let Some(env) = &env {
        tags.insert(keys::ENV, env.as_str());
    }
    if let Some(version) = &version {
        tags.insert(keys::VERSION, version.as_str());
    }

    ServiceSection {
        name,
        name_set_by_user,
        env,
        version,
        site: r.get_string_or(keys::SITE, &defaults.site, &[]),
        tags,
        service_mapping: r.get_merged_map(keys::SERVICE_MAPPING, &[]),
        split_by_tags: r.get_list(keys::SPLIT_BY_TAGS, &[]),
    }
}

/// Host and port from `trace.agent.url`, then `agent.host` and
/// `trace.agent.port` for whatever the URL left out. A `unix` URL names a
/// socket and suppresses the host/port fallbacks.
fn agent_section(r: &Resolver) -> AgentSection {
    let defaults = AgentSection::default();

    let configured_url = r.get_string(keys::TRACE_AGENT_URL, &[]);
    let mut host = None;
    let mut port = None;
    let mut unix_domain_socket = None;

    if let Some(raw) = &configured_url {
        match Url::parse(raw) {
            Ok(url) => {
                host = url.host_str().filter(|h| !h.is_empty()).map(str::to_owned);
                port = url.port().or_else(|| {
                    has_explicit_port(raw)
                        .then(|| url.port_or_known_default())
                        .flatten()
                });
                if url.scheme() == "unix" {
                    unix_domain_socket = Some(url.path().to_owned());
                }
            },
            Err(e) => r.report(Diagnostic::InvalidValue {
                setting: keys::TRACE_AGENT_URL.to_owned(),
                value: raw.clone(),
                reason: format!("{e}; ignoring it"),
            }),
        }
    }

    let mut rebuild_url = configured_url.is_none();
    if unix_domain_socket.is_none() {
        if host.is_none() {
            host = r.get_string(keys::AGENT_HOST, &[]);
            rebuild_url = true;
        }
        if port.is_none() {
            port = configured_port(r);
            rebuild_url = true;
        }
    }

    if unix_domain_socket.is_none() {
        unix_domain_socket = r
            .get_string(keys::AGENT_UNIX_DOMAIN_SOCKET, &[])
            .map(|socket| {
                socket
                    .strip_prefix(UNIX_SOCKET_PREFIX)
                    .map_or(socket.clone(), str::to_owned)
            });
    }
    let named_pipe = r.get_string(keys::AGENT_NAMED_PIPE, &[]);

    let configured_using_default = host.is_none()
        && port.is_none()
        && unix_domain_socket.is_none()
        && named_pipe.is_none();

    let host = host.unwrap_or(defaults.host);
    let port = port.unwrap_or(defaults.port);
    let url = match configured_url {
        Some(raw) if !rebuild_url => raw,
        _ => format!("http://{host}:{port}"),
    };

    let timeout = within(
        r.diagnostics(),
        keys::AGENT_TIMEOUT,
        r.get_i64(keys::AGENT_TIMEOUT, i64::from(defaults.timeout_secs), &[]),
        &(0..=i64::from(u32::MAX)),
        i64::from(defaults.timeout_secs),
    );

    AgentSection {
        host,
        port,
        url,
        unix_domain_socket,
        named_pipe,
        timeout_secs: u32::try_from(timeout).unwrap_or(defaults.timeout_secs),
        configured_using_default,
    }
}

/// `trace.agent.port` (alias `agent.port`); unset or invalid yields `None`.
fn configured_port(r: &Resolver) -> Option<u16> {
    let found = r.resolve(keys::TRACE_AGENT_PORT, &[keys::AGENT_PORT_LEGACY])?;
    match found.value.parse::<u16>() {
        Ok(port) => Some(port),
        Err(e) => {
            r.report(Diagnostic::InvalidValue {
                setting: keys::TRACE_AGENT_PORT.to_owned(),
                value: found.value,
                reason: e.to_string(),
            });
            None
        },
    }
}

/// `Url` drops ports equal to the scheme default; this tells an explicit
/// `http://host:80` apart from a bare `http://host`.
fn has_explicit_port(raw: &str) -> bool {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    host_port.rsplit_once(':').is_some_and(|(host, port)| {
        !port.is_empty()
            && port.bytes().all(|b| b.is_ascii_digit())
            && (!host.starts_with('[') || host.ends_with(']'))
    })
}

fn propagation_section(r: &Resolver) -> PropagationSection {
    let styles = PROPAGATION_STYLE.reconcile(r);
    PropagationSection {
        extract: styles.extract.values,
        inject: styles.inject.values,
        legacy_extract: styles.extract.legacy,
        legacy_inject: styles.inject.legacy,
        b3_padding_enabled: r.get_bool(keys::PROPAGATION_B3_PADDING_ENABLED, true, &[]),
        extract_first: r.get_bool(keys::PROPAGATION_EXTRACT_FIRST, false, &[]),
        extract_outcome: styles.extract.outcome,
        inject_outcome: styles.inject.outcome,
    }
}

fn id_generation_strategy(r: &Resolver) -> IdGenerationStrategy {
    let snap_start =
        r.raw(keys::AWS_LAMBDA_INITIALIZATION_TYPE).as_deref() == Some(AWS_LAMBDA_SNAP_START);
    let name = if snap_start || r.get_bool(keys::SECURE_RANDOM, false, &[]) {
        Some(IdGenerationStrategy::SecureRandom.config_name().to_owned())
    } else {
        r.get_string(keys::ID_GENERATION_STRATEGY, &[])
    };

    let strategy = name.map_or(IdGenerationStrategy::Random, |name| {
        parse_enum(&name).unwrap_or_else(|| {
            r.report(Diagnostic::UnrecognizedValue {
                setting: keys::ID_GENERATION_STRATEGY.to_owned(),
                value: name,
            });
            IdGenerationStrategy::Random
        })
    });

    if !strategy.is_supported() {
        r.report(Diagnostic::UnsupportedStrategy {
            setting: keys::ID_GENERATION_STRATEGY.to_owned(),
            value: strategy.config_name().to_owned(),
        });
    }
    strategy
}

fn trace_section(r: &Resolver) -> TraceSection {
    let defaults = TraceSection::default();
    let sink = r.diagnostics();

    let partial_flush_enabled = r.get_bool(keys::PARTIAL_FLUSH_ENABLED, true, &[]);
    let partial_flush_min_spans = if partial_flush_enabled {
        r.get_i32(keys::PARTIAL_FLUSH_MIN_SPANS, defaults.partial_flush_min_spans, &[])
    } else {
        0
    };
    let keep_latency_threshold_ms = r.get_i32(keys::TRACE_KEEP_LATENCY_THRESHOLD_MS, 0, &[]);

    let flush_interval_secs = positive(
        sink,
        keys::TRACE_FLUSH_INTERVAL,
        r.get_f32(keys::TRACE_FLUSH_INTERVAL, defaults.flush_interval_secs, &[]),
        defaults.flush_interval_secs,
    );

    let header_tags_legacy_parsing = r.get_bool(
        &format!("{}{}", keys::HEADER_TAGS, keys::HEADER_TAGS_LEGACY_PARSING_SUFFIX),
        false,
        &[],
    );
    let (request_header_tags, response_header_tags) = if header_tags_legacy_parsing {
        header_tags_legacy(r)
    } else {
        (
            r.get_merged_map_with_optional_mappings(
                Some(REQUEST_HEADER_PREFIX),
                true,
                &[keys::HEADER_TAGS, keys::REQUEST_HEADER_TAGS],
            ),
            r.get_merged_map_with_optional_mappings(
                Some(RESPONSE_HEADER_PREFIX),
                true,
                &[keys::HEADER_TAGS, keys::RESPONSE_HEADER_TAGS],
            ),
        )
    };

    TraceSection {
        enabled: r.get_bool(keys::TRACE_ENABLED, true, &[]),
        id_generation: id_generation_strategy(r),
        id_128_bit_generation: r.get_bool(
            keys::TRACE_128_BIT_TRACEID_GENERATION_ENABLED,
            false,
            &[],
        ),
        partial_flush_enabled,
        partial_flush_min_spans,
        keep_latency_threshold_ms,
        keep_latency_threshold_enabled: !partial_flush_enabled && keep_latency_threshold_ms > 0,
        flush_interval_secs,
        long_running: long_running_section(r),
        header_tags_legacy_parsing,
        request_header_tags,
        response_header_tags,
        baggage_mapping: r.get_merged_map_with_optional_mappings(
            None,
            true,
            &[keys::BAGGAGE_MAPPING],
        ),
        http_server_error_statuses: r.get_integer_range(
            keys::TRACE_HTTP_SERVER_ERROR_STATUSES,
            StatusSet::server_errors(),
            &[keys::HTTP_SERVER_ERROR_STATUSES],
        ),
        http_client_error_statuses: r.get_integer_range(
            keys::TRACE_HTTP_CLIENT_ERROR_STATUSES,
            StatusSet::client_errors(),
            &[keys::HTTP_CLIENT_ERROR_STATUSES],
        ),
        no_proxy_hosts: r.get_spaced_list(keys::PROXY_NO_PROXY, &[]),
    }
}

/// Legacy header tags: request tags come from `trace.header.tags` alone and
/// the split settings are ignored.
fn header_tags_legacy(r: &Resolver) -> (OrderedMap, OrderedMap) {
    let legacy_switch = format!("{}{}", keys::HEADER_TAGS, keys::HEADER_TAGS_LEGACY_PARSING_SUFFIX);
    for ignored in [keys::REQUEST_HEADER_TAGS, keys::RESPONSE_HEADER_TAGS] {
        if r.is_set(ignored, &[]) {
            r.report(Diagnostic::IgnoredSetting {
                setting: ignored.to_owned(),
                because_of: legacy_switch.clone(),
            });
        }
    }
    (
        r.get_merged_map(keys::HEADER_TAGS, &[]),
        OrderedMap::new(),
    )
}

fn long_running_section(r: &Resolver) -> LongRunningSection {
    let defaults = LongRunningSection::default();
    let enabled = r.get_bool(keys::TRACE_LONG_RUNNING_ENABLED, defaults.enabled, &[]);
    let initial = r.get_i64(
        keys::TRACE_LONG_RUNNING_INITIAL_FLUSH_INTERVAL,
        defaults.initial_flush_interval_secs,
        &[],
    );
    let flush = r.get_i64(
        keys::TRACE_LONG_RUNNING_FLUSH_INTERVAL,
        defaults.flush_interval_secs,
        &[],
    );
    if !enabled {
        return LongRunningSection {
            enabled,
            initial_flush_interval_secs: initial,
            flush_interval_secs: flush,
        };
    }

    let sink = r.diagnostics();
    LongRunningSection {
        enabled,
        initial_flush_interval_secs: within(
            sink,
            keys::TRACE_LONG_RUNNING_INITIAL_FLUSH_INTERVAL,
            initial,
            &LONG_RUNNING_INITIAL_FLUSH_RANGE,
            defaults.initial_flush_interval_secs,
        ),
        flush_interval_secs: within(
            sink,
            keys::TRACE_LONG_RUNNING_FLUSH_INTERVAL,
            flush,
            &LONG_RUNNING_FLUSH_RANGE,
            defaults.flush_interval_secs,
        ),
    }
}

fn profiling_section(r: &Resolver) -> ProfilingSection {
    let defaults = ProfilingSection::default();
    let enablement = r.get_enum(keys::PROFILING_ENABLED, ProfilingEnablement::Disabled, &[]);
    let mut start_delay_secs =
        r.get_i32(keys::PROFILING_START_DELAY, defaults.start_delay_secs, &[]);
    let mut start_force_first = r.get_bool(
        keys::PROFILING_START_FORCE_FIRST,
        defaults.start_force_first,
        &[],
    );

    if enablement.is_managed() {
        let reason = format!(
            "profiling enablement is set to {}",
            enablement.config_name()
        );
        if start_delay_secs != defaults.start_delay_secs {
            r.report(Diagnostic::IgnoredOverride {
                setting: keys::PROFILING_START_DELAY.to_owned(),
                value: start_delay_secs.to_string(),
                used: defaults.start_delay_secs.to_string(),
                reason: reason.clone(),
            });
            start_delay_secs = defaults.start_delay_secs;
        }
        if start_force_first != defaults.start_force_first {
            r.report(Diagnostic::IgnoredOverride {
                setting: keys::PROFILING_START_FORCE_FIRST.to_owned(),
                value: start_force_first.to_string(),
                used: defaults.start_force_first.to_string(),
                reason,
            });
            start_force_first = defaults.start_force_first;
        }
    }

    ProfilingSection {
        enablement,
        agentless: r.get_bool(keys::PROFILING_AGENTLESS, false, &[]),
        start_delay_secs,
        start_force_first,
        tags: r.get_merged_map(keys::PROFILING_TAGS, &[]),
        url: r.get_string(keys::PROFILING_URL, &[]),
    }
}

fn telemetry_section(r: &Resolver) -> TelemetrySection {
    let defaults = TelemetrySection::default();
    let sink = r.diagnostics();
    TelemetrySection {
        enabled: r.get_bool(keys::TELEMETRY_ENABLED, defaults.enabled, &[]),
        heartbeat_interval_secs: within(
            sink,
            keys::TELEMETRY_HEARTBEAT_INTERVAL,
            r.get_f32(keys::TELEMETRY_HEARTBEAT_INTERVAL, defaults.heartbeat_interval_secs, &[]),
            &TELEMETRY_INTERVAL_RANGE,
            defaults.heartbeat_interval_secs,
        ),
        metrics_interval_secs: within(
            sink,
            keys::TELEMETRY_METRICS_INTERVAL,
            r.get_f32(keys::TELEMETRY_METRICS_INTERVAL, defaults.metrics_interval_secs, &[]),
            &TELEMETRY_INTERVAL_RANGE,
            defaults.metrics_interval_secs,
        ),
        extended_heartbeat_interval_secs: r.get_i64(
            keys::TELEMETRY_EXTENDED_HEARTBEAT_INTERVAL,
            defaults.extended_heartbeat_interval_secs,
            &[],
        ),
    }
}

fn runtime_metrics_section(r: &Resolver) -> RuntimeMetricsSection {
    let enabled = r.get_bool(keys::RUNTIME_METRICS_ENABLED, true, &[]);
    RuntimeMetricsSection {
        enabled,
        jmxfetch_enabled: enabled && r.get_bool(keys::JMX_FETCH_ENABLED, true, &[]),
    }
}

fn ci_visibility_section(r: &Resolver) -> CiVisibilitySection {
    let agentless_url = r
        .get_string(keys::CIVISIBILITY_AGENTLESS_URL, &[])
        .and_then(|raw| match Url::parse(&raw) {
            Ok(_) => Some(raw),
            Err(e) => {
                r.report(Diagnostic::InvalidValue {
                    setting: keys::CIVISIBILITY_AGENTLESS_URL.to_owned(),
                    value: raw,
                    reason: e.to_string(),
                });
                None
            },
        });
    CiVisibilitySection {
        enabled: r.get_bool(keys::CIVISIBILITY_ENABLED, false, &[]),
        agentless_enabled: r.get_bool(keys::CIVISIBILITY_AGENTLESS_ENABLED, false, &[]),
        agentless_url,
    }
}

fn log_submission_section(r: &Resolver, ci_visibility_enabled: bool) -> LogSubmissionSection {
    let defaults = LogSubmissionSection::default();
    LogSubmissionSection {
        enabled: r.get_bool(keys::AGENTLESS_LOG_SUBMISSION_ENABLED, defaults.enabled, &[]),
        queue_size: r.get_i32(
            keys::AGENTLESS_LOG_SUBMISSION_QUEUE_SIZE,
            defaults.queue_size,
            &[],
        ),
        level: r.get_string_or(keys::AGENTLESS_LOG_SUBMISSION_LEVEL, &defaults.level, &[]),
        url: r.get_string(keys::AGENTLESS_LOG_SUBMISSION_URL, &[]),
        product: if ci_visibility_enabled {
            CI_VISIBILITY_PRODUCT.to_owned()
        } else {
            defaults.product
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::reconcile::{Outcome, TracePropagationStyle};
    use crate::source::{EnvSource, MapSource};

    fn build(process: &[(&str, &str)], env: &[(&str, &str)]) -> ResolvedConfig {
        ConfigBuilder::new()
            .source(MapSource::process(process.iter().copied()))
            .source(EnvSource::from_vars(env.iter().copied()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_stack_yields_defaults() {
        let resolved = build(&[], &[]);
        assert_eq!(*resolved.config, Config::default());
        assert!(resolved.diagnostics.is_empty());
        assert!(resolved.loaded_files.is_empty());
    }

    #[test]
    fn test_build_is_idempotent() {
        let process = [("trace.agent.port", "9000"), ("trace.tags", "a=1,b=2")];
        let env = [("DD_PROPAGATION_STYLE_INJECT", "b3"), ("DD_ENV", "prod")];
        let first = build(&process, &env);
        let second = build(&process, &env);
        assert_eq!(first.config, second.config);
        assert_eq!(first.diagnostics, second.diagnostics);
    }

    #[test]
    fn test_service_name_set_by_user() {
        let resolved = ConfigBuilder::new()
            .source(MapSource::captured([("service", "my-binary")]))
            .build()
            .unwrap();
        assert_eq!(resolved.config.service.name, "my-binary");
        assert!(!resolved.config.service.name_set_by_user);

        let resolved = build(&[], &[("DD_SERVICE_NAME", "checkout")]);
        assert_eq!(resolved.config.service.name, "checkout");
        assert!(resolved.config.service.name_set_by_user);
    }

    #[test]
    fn test_tags_layer_global_then_trace_then_env_version() {
        let resolved = build(
            &[("trace.tags", "team=a,env=staging")],
            &[
                ("DD_TRACE_GLOBAL_TAGS", "team=global,region=eu"),
                ("DD_ENV", "prod"),
                ("DD_VERSION", "1.2"),
            ],
        );
        let tags = &resolved.config.service.tags;
        assert_eq!(tags.get("team"), Some("a"));
        assert_eq!(tags.get("region"), Some("eu"));
        assert_eq!(tags.get("env"), Some("prod"));
        assert_eq!(tags.get("version"), Some("1.2"));
    }

    #[test]
    fn test_agent_defaults() {
        let agent = build(&[], &[]).config.agent.clone();
        assert_eq!(agent.url, "http://localhost:8126");
        assert!(agent.configured_using_default);
    }

    #[test]
    fn test_agent_url_supplies_host_and_port() {
        let agent = build(&[("trace.agent.url", "http://agent.internal:9126")], &[])
            .config
            .agent
            .clone();
        assert_eq!(agent.host, "agent.internal");
        assert_eq!(agent.port, 9126);
        assert_eq!(agent.url, "http://agent.internal:9126");
        assert!(!agent.configured_using_default);
    }

    #[test]
    fn test_agent_url_without_port_falls_back() {
        let agent = build(
            &[("trace.agent.url", "http://agent.internal")],
            &[("DD_AGENT_PORT", "7777")],
        )
        .config
        .agent
        .clone();
        assert_eq!(agent.port, 7777);
        assert_eq!(agent.url, "http://agent.internal:7777");
    }

    #[test]
    fn test_agent_url_with_scheme_default_port_keeps_it() {
        let agent = build(&[("trace.agent.url", "http://agent.internal:80")], &[])
            .config
            .agent
            .clone();
        assert_eq!(agent.port, 80);
        assert_eq!(agent.url, "http://agent.internal:80");
    }

    #[test]
    fn test_agent_unix_url() {
        let agent = build(&[("trace.agent.url", "unix:///var/run/apm.socket")], &[])
            .config
            .agent
            .clone();
        assert_eq!(agent.unix_domain_socket.as_deref(), Some("/var/run/apm.socket"));
        assert_eq!(agent.url, "unix:///var/run/apm.socket");
        assert!(!agent.configured_using_default);
    }

    #[test]
    fn test_agent_socket_prefix_is_stripped() {
        let agent = build(
            &[],
            &[("DD_TRACE_AGENT_UNIX_DOMAIN_SOCKET", "unix:///tmp/apm.sock")],
        )
        .config
        .agent
        .clone();
        assert_eq!(agent.unix_domain_socket.as_deref(), Some("/tmp/apm.sock"));
        assert!(!agent.configured_using_default);
    }

    #[test]
    fn test_invalid_agent_url_is_ignored() {
        let resolved = build(&[("trace.agent.url", "not a url")], &[("DD_AGENT_HOST", "h")]);
        assert_eq!(resolved.config.agent.url, "http://h:8126");
        assert!(resolved.diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::InvalidValue { setting, .. } if setting == "trace.agent.url"
        )));
    }

    #[test]
    fn test_explicit_port_detection() {
        assert!(has_explicit_port("http://h:80"));
        assert!(has_explicit_port("http://user:pw@h:80/path"));
        assert!(has_explicit_port("http://[::1]:80"));
        assert!(!has_explicit_port("http://h"));
        assert!(!has_explicit_port("http://[::1]"));
        assert!(!has_explicit_port("http://h/a:b"));
    }

    #[test]
    fn test_partial_flush_disabled_forces_min_spans() {
        let trace = build(
            &[
                ("trace.partial.flush.enabled", "false"),
                ("trace.partial.flush.min.spans", "50"),
                ("trace.keep.latency.threshold.ms", "200"),
            ],
            &[],
        )
        .config
        .trace
        .clone();
        assert_eq!(trace.partial_flush_min_spans, 0);
        assert!(trace.keep_latency_threshold_enabled);
    }

    #[test]
    fn test_keep_latency_requires_partial_flush_off() {
        let trace = build(&[("trace.keep.latency.threshold.ms", "200")], &[])
            .config
            .trace
            .clone();
        assert_eq!(trace.partial_flush_min_spans, 1000);
        assert!(!trace.keep_latency_threshold_enabled);
    }

    #[test]
    fn test_snap_start_forces_secure_random() {
        let resolved = build(
            &[("id.generation.strategy", "SEQUENTIAL")],
            &[("AWS_LAMBDA_INITIALIZATION_TYPE", "snap-start")],
        );
        assert_eq!(
            resolved.config.trace.id_generation,
            IdGenerationStrategy::SecureRandom
        );
        assert!(resolved.diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_strategy_falls_back_to_random() {
        let resolved = build(&[("id.generation.strategy", "ULID")], &[]);
        assert_eq!(resolved.config.trace.id_generation, IdGenerationStrategy::Random);
        assert!(matches!(
            resolved.diagnostics[..],
            [Diagnostic::UnrecognizedValue { .. }]
        ));
    }

    #[test]
    fn test_non_random_strategy_is_flagged() {
        let resolved = build(&[("id.generation.strategy", "SEQUENTIAL")], &[]);
        assert_eq!(
            resolved.config.trace.id_generation,
            IdGenerationStrategy::Sequential
        );
        assert!(matches!(
            resolved.diagnostics[..],
            [Diagnostic::UnsupportedStrategy { .. }]
        ));
    }

    #[test]
    fn test_header_tags() {
        let trace = build(
            &[("trace.header.tags", "X-Request-Id,user-agent=http.useragent")],
            &[("DD_TRACE_RESPONSE_HEADER_TAGS", "content-type")],
        )
        .config
        .trace
        .clone();
        assert_eq!(
            trace.request_header_tags.get("x-request-id"),
            Some("http.request.headers.x-request-id")
        );
        assert_eq!(
            trace.response_header_tags.get("content-type"),
            Some("http.response.headers.content-type")
        );
        assert_eq!(
            trace.response_header_tags.get("user-agent"),
            Some("http.useragent")
        );
    }

    #[test]
    fn test_legacy_header_tags_ignore_split_settings() {
        let resolved = build(
            &[
                ("trace.header.tags.legacy.parsing.enabled", "true"),
                ("trace.header.tags", "user-agent=http.useragent"),
                ("trace.request_header.tags", "x-request-id"),
            ],
            &[],
        );
        let trace = &resolved.config.trace;
        assert_eq!(trace.request_header_tags.get("user-agent"), Some("http.useragent"));
        assert!(trace.response_header_tags.is_empty());
        assert!(resolved.diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::IgnoredSetting { setting, .. } if setting == "trace.request_header.tags"
        )));
    }

    #[test]
    fn test_baggage_mapping_keeps_bare_keys() {
        let trace = build(&[("trace.header.baggage", "user.id,session=sid")], &[])
            .config
            .trace
            .clone();
        assert_eq!(trace.baggage_mapping.get("user.id"), Some("user.id"));
        assert_eq!(trace.baggage_mapping.get("session"), Some("sid"));
    }

    #[test]
    fn test_status_ranges() {
        let trace = build(&[("http.server.error.statuses", "500-502,599")], &[])
            .config
            .trace
            .clone();
        assert!(trace.http_server_error_statuses.contains(501));
        assert!(!trace.http_server_error_statuses.contains(503));
        assert!(trace.http_client_error_statuses.contains(404));
    }

    #[test]
    fn test_managed_profiling_resets_start_overrides() {
        let resolved = build(
            &[
                ("profiling.enabled", "auto"),
                ("profiling.start-delay", "3"),
                ("profiling.start-force-first", "true"),
            ],
            &[],
        );
        let profiling = &resolved.config.profiling;
        assert_eq!(profiling.enablement, ProfilingEnablement::Auto);
        assert_eq!(profiling.start_delay_secs, 10);
        assert!(!profiling.start_force_first);
        assert_eq!(
            resolved
                .diagnostics
                .iter()
                .filter(|d| matches!(d, Diagnostic::IgnoredOverride { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_explicit_profiling_keeps_start_overrides() {
        let profiling = build(
            &[("profiling.enabled", "true"), ("profiling.start-delay", "3")],
            &[],
        )
        .config
        .profiling
        .clone();
        assert_eq!(profiling.enablement, ProfilingEnablement::Enabled);
        assert_eq!(profiling.start_delay_secs, 3);
    }

    #[test]
    fn test_telemetry_heartbeat_out_of_range() {
        let resolved = build(&[], &[("DD_TELEMETRY_HEARTBEAT_INTERVAL", "9999")]);
        assert!((resolved.config.telemetry.heartbeat_interval_secs - 60.0).abs() < f32::EPSILON);
        assert!(matches!(
            resolved.diagnostics[..],
            [Diagnostic::OutOfRange { .. }]
        ));
    }

    #[test]
    fn test_long_running_ranges_only_checked_when_enabled() {
        let resolved = build(
            &[("trace.experimental.long-running.flush.interval", "5")],
            &[],
        );
        assert_eq!(resolved.config.trace.long_running.flush_interval_secs, 5);
        assert!(resolved.diagnostics.is_empty());

        let resolved = build(
            &[
                ("trace.experimental.long-running.enabled", "true"),
                ("trace.experimental.long-running.flush.interval", "5"),
            ],
            &[],
        );
        assert_eq!(resolved.config.trace.long_running.flush_interval_secs, 120);
        assert_eq!(resolved.diagnostics.len(), 1);
    }

    #[test]
    fn test_jmxfetch_requires_runtime_metrics() {
        let metrics = build(&[("runtime.metrics.enabled", "false")], &[])
            .config
            .runtime_metrics
            .clone();
        assert!(!metrics.enabled);
        assert!(!metrics.jmxfetch_enabled);
    }

    #[test]
    fn test_log_submission_product_follows_ci_visibility() {
        let resolved = build(&[("civisibility.enabled", "true")], &[]);
        assert_eq!(resolved.config.log_submission.product, "citest");
        assert_eq!(build(&[], &[]).config.log_submission.product, "apm");
    }

    #[test]
    fn test_agentless_ci_visibility_without_key_fails() {
        let err = ConfigBuilder::new()
            .source(EnvSource::from_vars([
                ("DD_CIVISIBILITY_ENABLED", "true"),
                ("DD_CIVISIBILITY_AGENTLESS_ENABLED", "true"),
            ]))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FatalMisconfiguration { .. }));
    }

    #[test]
    fn test_propagation_is_reconciled() {
        let propagation = build(&[], &[("DD_PROPAGATION_STYLE_INJECT", "b3")])
            .config
            .propagation
            .clone();
        assert_eq!(
            propagation.inject,
            vec![TracePropagationStyle::B3Single, TracePropagationStyle::B3Multi]
        );
        assert_eq!(
            propagation.extract,
            vec![TracePropagationStyle::Datadog, TracePropagationStyle::TraceContext]
        );
        assert_eq!(
            propagation.inject_outcome,
            Outcome::DeprecatedConverted("propagation.style.inject")
        );
        assert_eq!(propagation.extract_outcome, Outcome::Default);
    }

    #[test]
    fn test_field_sources_record_origins() {
        let resolved = build(&[("trace.agent.port", "9000")], &[("DD_API_KEY", "secret")]);
        let port = &resolved.field_sources["trace.agent.port"];
        assert_eq!(port.origin, ConfigOrigin::Process);
        assert_eq!(resolved.field_sources["api-key"].value, "****");
        assert_eq!(
            resolved.field_sources["trace.enabled"].origin,
            ConfigOrigin::Default
        );
    }
}
