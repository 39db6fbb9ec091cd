//! Canonical setting keys.
//!
//! Keys are dotted, lower-case names. Environment variables derive from
//! them (`trace.agent.port` is `DD_TRACE_AGENT_PORT`); config files use them
//! directly or as nested tables.

// Service identity.
pub const SERVICE: &str = "service";
pub const SERVICE_NAME: &str = "service.name";
pub const ENV: &str = "env";
pub const VERSION: &str = "version";
pub const SITE: &str = "site";
pub const GLOBAL_TAGS: &str = "trace.global.tags";
pub const TRACE_TAGS: &str = "trace.tags";
pub const TAGS: &str = "tags";
pub const SERVICE_MAPPING: &str = "service.mapping";
pub const SPLIT_BY_TAGS: &str = "trace.split-by-tags";

// Credentials.
pub const API_KEY: &str = "api-key";
pub const API_KEY_FILE: &str = "api-key-file";
pub const APPLICATION_KEY: &str = "application-key";
pub const APPLICATION_KEY_FILE: &str = "application-key-file";
pub const PROFILING_API_KEY_OLD: &str = "profiling.api-key";
pub const PROFILING_API_KEY_FILE_OLD: &str = "profiling.api-key-file";
pub const PROFILING_API_KEY_VERY_OLD: &str = "profiling.apikey";
pub const PROFILING_API_KEY_FILE_VERY_OLD: &str = "profiling.apikey.file";

// Agent endpoint.
pub const TRACE_AGENT_URL: &str = "trace.agent.url";
pub const AGENT_HOST: &str = "agent.host";
pub const TRACE_AGENT_PORT: &str = "trace.agent.port";
pub const AGENT_PORT_LEGACY: &str = "agent.port";
pub const AGENT_UNIX_DOMAIN_SOCKET: &str = "trace.agent.unix.domain.socket";
pub const AGENT_NAMED_PIPE: &str = "trace.pipe.name";
pub const AGENT_TIMEOUT: &str = "trace.agent.timeout";

// Propagation.
pub const PROPAGATION_B3_PADDING_ENABLED: &str = "trace.propagation.style.b3.padding.enabled";
pub const PROPAGATION_EXTRACT_FIRST: &str = "trace.propagation.extract.first";

// Trace handling.
pub const TRACE_ENABLED: &str = "trace.enabled";
pub const ID_GENERATION_STRATEGY: &str = "id.generation.strategy";
pub const SECURE_RANDOM: &str = "secure.random";
pub const TRACE_128_BIT_TRACEID_GENERATION_ENABLED: &str =
    "trace.128.bit.traceid.generation.enabled";
pub const PARTIAL_FLUSH_ENABLED: &str = "trace.partial.flush.enabled";
pub const PARTIAL_FLUSH_MIN_SPANS: &str = "trace.partial.flush.min.spans";
pub const TRACE_KEEP_LATENCY_THRESHOLD_MS: &str = "trace.keep.latency.threshold.ms";
pub const TRACE_FLUSH_INTERVAL: &str = "trace.flush.interval";
pub const TRACE_LONG_RUNNING_ENABLED: &str = "trace.experimental.long-running.enabled";
pub const TRACE_LONG_RUNNING_INITIAL_FLUSH_INTERVAL: &str =
    "trace.experimental.long-running.initial.flush.interval";
pub const TRACE_LONG_RUNNING_FLUSH_INTERVAL: &str =
    "trace.experimental.long-running.flush.interval";
pub const HEADER_TAGS: &str = "trace.header.tags";
pub const HEADER_TAGS_LEGACY_PARSING_SUFFIX: &str = ".legacy.parsing.enabled";
pub const REQUEST_HEADER_TAGS: &str = "trace.request_header.tags";
pub const RESPONSE_HEADER_TAGS: &str = "trace.response_header.tags";
pub const BAGGAGE_MAPPING: &str = "trace.header.baggage";
pub const TRACE_HTTP_SERVER_ERROR_STATUSES: &str = "trace.http.server.error.statuses";
pub const HTTP_SERVER_ERROR_STATUSES: &str = "http.server.error.statuses";
pub const TRACE_HTTP_CLIENT_ERROR_STATUSES: &str = "trace.http.client.error.statuses";
pub const HTTP_CLIENT_ERROR_STATUSES: &str = "http.client.error.statuses";
pub const PROXY_NO_PROXY: &str = "proxy.no_proxy";

// Profiling.
pub const PROFILING_ENABLED: &str = "profiling.enabled";
pub const PROFILING_AGENTLESS: &str = "profiling.agentless";
pub const PROFILING_START_DELAY: &str = "profiling.start-delay";
pub const PROFILING_START_FORCE_FIRST: &str = "profiling.start-force-first";
pub const PROFILING_TAGS: &str = "profiling.tags";
pub const PROFILING_URL: &str = "profiling.url";

// Telemetry.
pub const TELEMETRY_ENABLED: &str = "instrumentation.telemetry.enabled";
pub const TELEMETRY_HEARTBEAT_INTERVAL: &str = "telemetry.heartbeat.interval";
pub const TELEMETRY_METRICS_INTERVAL: &str = "telemetry.metrics.interval";
pub const TELEMETRY_EXTENDED_HEARTBEAT_INTERVAL: &str = "telemetry.extended.heartbeat.interval";

// Runtime metrics.
pub const RUNTIME_METRICS_ENABLED: &str = "runtime.metrics.enabled";
pub const JMX_FETCH_ENABLED: &str = "jmxfetch.enabled";

// CI visibility.
pub const CIVISIBILITY_ENABLED: &str = "civisibility.enabled";
pub const CIVISIBILITY_AGENTLESS_ENABLED: &str = "civisibility.agentless.enabled";
pub const CIVISIBILITY_AGENTLESS_URL: &str = "civisibility.agentless.url";

// Agentless log submission.
pub const AGENTLESS_LOG_SUBMISSION_ENABLED: &str = "agentless.log.submission.enabled";
pub const AGENTLESS_LOG_SUBMISSION_QUEUE_SIZE: &str = "agentless.log.submission.queue.size";
pub const AGENTLESS_LOG_SUBMISSION_LEVEL: &str = "agentless.log.submission.level";
pub const AGENTLESS_LOG_SUBMISSION_URL: &str = "agentless.log.submission.url";

// Loading.
pub const CONFIG_FILE: &str = "trace.config";

/// Unprefixed environment variable set by AWS Lambda.
pub const AWS_LAMBDA_INITIALIZATION_TYPE: &str = "AWS_LAMBDA_INITIALIZATION_TYPE";
