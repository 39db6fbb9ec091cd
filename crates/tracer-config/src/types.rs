//! The immutable configuration snapshot.
//!
//! Every section implements [`Default`] with the values a tracer uses when
//! nothing is configured. The builder starts from these defaults and
//! replaces each field exactly once. Credentials are masked in `Debug`,
//! `Display` and every serialized form.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::Serialize;

use crate::grammar::{ConfigEnum, OrderedMap, StatusSet};
use crate::reconcile::{Outcome, PropagationStyle, TracePropagationStyle};
use crate::resolve::MASK;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Resolved tracer configuration.
///
/// Built once per process (or per explicit override request) and shared as
/// `Arc<Config>`. Holds no reference to the sources it was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Config {
    /// Service identity and global tags.
    pub service: ServiceSection,
    /// How to reach the local agent.
    pub agent: AgentSection,
    /// Intake credentials.
    pub credentials: Credentials,
    /// Context propagation styles.
    pub propagation: PropagationSection,
    /// Span and trace handling.
    pub trace: TraceSection,
    /// Continuous profiler.
    pub profiling: ProfilingSection,
    /// Instrumentation telemetry.
    pub telemetry: TelemetrySection,
    /// Runtime metrics and JMX collection.
    pub runtime_metrics: RuntimeMetricsSection,
    /// CI visibility product.
    pub ci_visibility: CiVisibilitySection,
    /// Agentless log submission.
    pub log_submission: LogSubmissionSection,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config{{service={}, env={}, version={}, agent_url={}, api_key={}, \
             propagation_extract={:?}, propagation_inject={:?}, id_generation={}, \
             profiling={}, ci_visibility={}}}",
            self.service.name,
            self.service.env.as_deref().unwrap_or(""),
            self.service.version.as_deref().unwrap_or(""),
            self.agent.url,
            mask(self.credentials.api_key.as_deref()),
            self.propagation.extract,
            self.propagation.inject,
            self.trace.id_generation.config_name(),
            self.profiling.enablement.config_name(),
            self.ci_visibility.enabled,
        )
    }
}

fn mask(secret: Option<&str>) -> &'static str {
    if secret.is_some() { MASK } else { "" }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Service identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSection {
    /// Service name.
    pub name: String,
    /// Whether the name came from an explicit setting rather than the
    /// captured environment or the default.
    pub name_set_by_user: bool,
    /// Deployment environment.
    pub env: Option<String>,
    /// Application version.
    pub version: Option<String>,
    /// Intake site.
    pub site: String,
    /// Tags applied to every span: global tags, then trace tags, then `env`
    /// and `version`.
    pub tags: OrderedMap,
    /// Service renames.
    pub service_mapping: OrderedMap,
    /// Tags that split a service into several.
    pub split_by_tags: Vec<String>,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: "unnamed-service".to_owned(),
            name_set_by_user: false,
            env: None,
            version: None,
            site: "datadoghq.com".to_owned(),
            tags: OrderedMap::new(),
            service_mapping: OrderedMap::new(),
            split_by_tags: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Agent endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSection {
    /// Agent host.
    pub host: String,
    /// Agent trace port.
    pub port: u16,
    /// Agent URL, either as configured or rebuilt as `http://host:port`.
    pub url: String,
    /// Unix domain socket path, if any.
    pub unix_domain_socket: Option<String>,
    /// Windows named pipe, if any.
    pub named_pipe: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u32,
    /// True when no host, port, socket or pipe was configured.
    pub configured_using_default: bool,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 8126,
            url: "http://localhost:8126".to_owned(),
            unix_domain_socket: None,
            named_pipe: None,
            timeout_secs: 10,
            configured_using_default: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Intake credentials. Never printed or serialized in clear.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// API key.
    pub api_key: Option<String>,
    /// Application key.
    pub application_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &mask(self.api_key.as_deref()))
            .field("application_key", &mask(self.application_key.as_deref()))
            .finish()
    }
}

impl Serialize for Credentials {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Credentials", 2)?;
        state.serialize_field("api_key", &self.api_key.as_ref().map(|_| MASK))?;
        state.serialize_field("application_key", &self.application_key.as_ref().map(|_| MASK))?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// Propagation
// ---------------------------------------------------------------------------

/// Context propagation styles, in both naming generations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropagationSection {
    /// Styles used to read incoming context.
    pub extract: Vec<TracePropagationStyle>,
    /// Styles used to write outgoing context.
    pub inject: Vec<TracePropagationStyle>,
    /// Deprecated view of the extraction styles.
    pub legacy_extract: Vec<PropagationStyle>,
    /// Deprecated view of the injection styles.
    pub legacy_inject: Vec<PropagationStyle>,
    /// Pad B3 trace ids to 128 bits.
    pub b3_padding_enabled: bool,
    /// Stop at the first style that extracts a context.
    pub extract_first: bool,
    /// Which setting decided `extract`.
    pub extract_outcome: Outcome,
    /// Which setting decided `inject`.
    pub inject_outcome: Outcome,
}

impl Default for PropagationSection {
    fn default() -> Self {
        Self {
            extract: vec![TracePropagationStyle::Datadog, TracePropagationStyle::TraceContext],
            inject: vec![TracePropagationStyle::Datadog, TracePropagationStyle::TraceContext],
            legacy_extract: vec![PropagationStyle::Datadog],
            legacy_inject: vec![PropagationStyle::Datadog],
            b3_padding_enabled: true,
            extract_first: false,
            extract_outcome: Outcome::Default,
            inject_outcome: Outcome::Default,
        }
    }
}

// ---------------------------------------------------------------------------
// Trace
// ---------------------------------------------------------------------------

/// How span and trace ids are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdGenerationStrategy {
    /// Thread-local pseudo random ids.
    Random,
    /// Cryptographically secure random ids.
    SecureRandom,
    /// Monotonic ids, for tests only.
    Sequential,
}

impl IdGenerationStrategy {
    /// Whether this strategy is fit for production traffic.
    #[must_use]
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Random | Self::SecureRandom)
    }
}

impl ConfigEnum for IdGenerationStrategy {
    fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "random" => Some(Self::Random),
            "secure_random" => Some(Self::SecureRandom),
            "sequential" => Some(Self::Sequential),
            _ => None,
        }
    }

    fn config_name(self) -> &'static str {
        match self {
            Self::Random => "RANDOM",
            Self::SecureRandom => "SECURE_RANDOM",
            Self::Sequential => "SEQUENTIAL",
        }
    }
}

/// Span and trace handling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSection {
    /// Whether tracing is enabled at all.
    pub enabled: bool,
    /// Id generation strategy.
    pub id_generation: IdGenerationStrategy,
    /// Generate 128-bit trace ids.
    pub id_128_bit_generation: bool,
    /// Flush finished spans of large traces early.
    pub partial_flush_enabled: bool,
    /// Finished spans that trigger a partial flush; 0 when disabled.
    pub partial_flush_min_spans: i32,
    /// Keep traces slower than this many milliseconds.
    pub keep_latency_threshold_ms: i32,
    /// Whether the latency threshold applies (partial flush off, threshold
    /// positive).
    pub keep_latency_threshold_enabled: bool,
    /// Writer flush interval in seconds.
    pub flush_interval_secs: f32,
    /// Long-running trace reporting.
    pub long_running: LongRunningSection,
    /// Whether `trace.header.tags` uses the legacy `header=tag` grammar.
    pub header_tags_legacy_parsing: bool,
    /// Request header name to span tag.
    pub request_header_tags: OrderedMap,
    /// Response header name to span tag.
    pub response_header_tags: OrderedMap,
    /// Baggage key to span tag.
    pub baggage_mapping: OrderedMap,
    /// Status codes marking server spans as errors.
    pub http_server_error_statuses: StatusSet,
    /// Status codes marking client spans as errors.
    pub http_client_error_statuses: StatusSet,
    /// Hosts never reached through the proxy.
    pub no_proxy_hosts: Vec<String>,
}

impl Default for TraceSection {
    fn default() -> Self {
        Self {
            enabled: true,
            id_generation: IdGenerationStrategy::Random,
            id_128_bit_generation: false,
            partial_flush_enabled: true,
            partial_flush_min_spans: 1000,
            keep_latency_threshold_ms: 0,
            keep_latency_threshold_enabled: false,
            flush_interval_secs: 1.0,
            long_running: LongRunningSection::default(),
            header_tags_legacy_parsing: false,
            request_header_tags: OrderedMap::new(),
            response_header_tags: OrderedMap::new(),
            baggage_mapping: OrderedMap::new(),
            http_server_error_statuses: StatusSet::server_errors(),
            http_client_error_statuses: StatusSet::client_errors(),
            no_proxy_hosts: Vec::new(),
        }
    }
}

/// Periodic reporting of traces that stay open for a long time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongRunningSection {
    /// Whether long-running traces are reported.
    pub enabled: bool,
    /// Delay before the first report, in seconds (10–450).
    pub initial_flush_interval_secs: i64,
    /// Delay between later reports, in seconds (20–450).
    pub flush_interval_secs: i64,
}

impl Default for LongRunningSection {
    fn default() -> Self {
        Self {
            enabled: false,
            initial_flush_interval_secs: 20,
            flush_interval_secs: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// Profiling
// ---------------------------------------------------------------------------

/// How the profiler was switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfilingEnablement {
    /// Explicitly on.
    Enabled,
    /// Off.
    Disabled,
    /// On, decided by the host at startup.
    Auto,
    /// On, injected by single-step instrumentation.
    Injected,
}

impl ProfilingEnablement {
    /// Whether the profiler runs.
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Whether startup timing is managed by the host rather than the user.
    #[must_use]
    pub fn is_managed(self) -> bool {
        matches!(self, Self::Auto | Self::Injected)
    }
}

impl ConfigEnum for ProfilingEnablement {
    fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "true" | "1" => Some(Self::Enabled),
            "false" | "0" => Some(Self::Disabled),
            "auto" => Some(Self::Auto),
            "injected" => Some(Self::Injected),
            _ => None,
        }
    }

    fn config_name(self) -> &'static str {
        match self {
            Self::Enabled => "true",
            Self::Disabled => "false",
            Self::Auto => "auto",
            Self::Injected => "injected",
        }
    }
}

/// Continuous profiler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilingSection {
    /// Enablement mode.
    pub enablement: ProfilingEnablement,
    /// Upload straight to the intake instead of through the agent.
    pub agentless: bool,
    /// Seconds to wait before the first profile.
    pub start_delay_secs: i32,
    /// Start the profiler before the application's main entry point.
    pub start_force_first: bool,
    /// Tags attached to uploaded profiles.
    pub tags: OrderedMap,
    /// Explicit upload URL.
    pub url: Option<String>,
}

impl Default for ProfilingSection {
    fn default() -> Self {
        Self {
            enablement: ProfilingEnablement::Disabled,
            agentless: false,
            start_delay_secs: 10,
            start_force_first: false,
            tags: OrderedMap::new(),
            url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

/// Instrumentation telemetry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySection {
    /// Whether telemetry is sent.
    pub enabled: bool,
    /// Heartbeat period in seconds (0.1–3600).
    pub heartbeat_interval_secs: f32,
    /// Metrics period in seconds (0.1–3600).
    pub metrics_interval_secs: f32,
    /// Extended heartbeat period in seconds.
    pub extended_heartbeat_interval_secs: i64,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            enabled: true,
            heartbeat_interval_secs: 60.0,
            metrics_interval_secs: 10.0,
            extended_heartbeat_interval_secs: 86_400,
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime metrics
// ---------------------------------------------------------------------------

/// Runtime metrics collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeMetricsSection {
    /// Whether runtime metrics are collected.
    pub enabled: bool,
    /// Whether JMX metrics are fetched; never true without runtime metrics.
    pub jmxfetch_enabled: bool,
}

impl Default for RuntimeMetricsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            jmxfetch_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// CI visibility
// ---------------------------------------------------------------------------

/// CI visibility product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CiVisibilitySection {
    /// Whether CI visibility is on.
    pub enabled: bool,
    /// Send test events straight to the intake.
    pub agentless_enabled: bool,
    /// Explicit agentless intake URL, when it parses.
    pub agentless_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Log submission
// ---------------------------------------------------------------------------

/// Agentless log submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSubmissionSection {
    /// Whether logs are submitted.
    pub enabled: bool,
    /// Pending log queue capacity.
    pub queue_size: i32,
    /// Minimum level submitted.
    pub level: String,
    /// Explicit intake URL.
    pub url: Option<String>,
    /// Product the logs are attributed to: `citest` under CI visibility,
    /// otherwise `apm`.
    pub product: String,
}

impl Default for LogSubmissionSection {
    fn default() -> Self {
        Self {
            enabled: false,
            queue_size: 1024,
            level: "INFO".to_owned(),
            url: None,
            product: "apm".to_owned(),
        }
    }
}
