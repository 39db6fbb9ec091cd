//! Range checks and cross-field invariants.
//!
//! Out-of-range values never fail the build: they are reported and replaced
//! by the setting's default. Only [`check_invariants`] can reject a
//! configuration outright.

use std::fmt::Display;
use std::ops::RangeInclusive;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{ConfigError, ConfigResult};
use crate::keys;
use crate::types::Config;

/// Accepted telemetry heartbeat and metrics periods, in seconds.
pub const TELEMETRY_INTERVAL_RANGE: RangeInclusive<f32> = 0.1..=3600.0;
/// Accepted long-running trace initial flush delay, in seconds.
pub const LONG_RUNNING_INITIAL_FLUSH_RANGE: RangeInclusive<i64> = 10..=450;
/// Accepted long-running trace flush period, in seconds.
pub const LONG_RUNNING_FLUSH_RANGE: RangeInclusive<i64> = 20..=450;

const AGENTLESS_WITHOUT_API_KEY: &str = "Attempt to start in Agentless mode without API key. \
     Please ensure that either an API key is configured, or the tracer is set up to work with \
     the Agent";

/// Return `value` if it lies in `range`, otherwise report it and return
/// `default`. `NaN` is never in range.
pub fn within<T>(
    sink: &dyn DiagnosticSink,
    setting: &str,
    value: T,
    range: &RangeInclusive<T>,
    default: T,
) -> T
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        return value;
    }
    sink.record(Diagnostic::OutOfRange {
        setting: setting.to_owned(),
        value: value.to_string(),
        range: format!("{}-{}", range.start(), range.end()),
        default: default.to_string(),
    });
    default
}

/// Return `value` if it is strictly positive, otherwise report it and return
/// `default`.
pub fn positive(sink: &dyn DiagnosticSink, setting: &str, value: f32, default: f32) -> f32 {
    if value > 0.0 {
        return value;
    }
    sink.record(Diagnostic::OutOfRange {
        setting: setting.to_owned(),
        value: value.to_string(),
        range: "greater than 0".to_owned(),
        default: default.to_string(),
    });
    default
}

/// Check cross-field invariants of a fully resolved configuration.
///
/// # Errors
///
/// Returns [`ConfigError::FatalMisconfiguration`] when CI visibility runs in
/// agentless mode without an API key.
pub fn check_invariants(config: &Config, sink: &dyn DiagnosticSink) -> ConfigResult<()> {
    let has_api_key = config
        .credentials
        .api_key
        .as_deref()
        .is_some_and(|key| !key.is_empty());

    if config.profiling.enablement.is_active() && config.profiling.agentless && !has_api_key {
        sink.record(Diagnostic::MissingCredential {
            setting: keys::PROFILING_AGENTLESS.to_owned(),
            credential: keys::API_KEY.to_owned(),
        });
    }

    if config.ci_visibility.enabled && config.ci_visibility.agentless_enabled && !has_api_key {
        return Err(ConfigError::FatalMisconfiguration {
            message: AGENTLESS_WITHOUT_API_KEY.to_owned(),
        });
    }

    Ok(())
}
