use std::collections::HashMap;
use std::ffi::OsString;

use tracing::debug;

use super::{ConfigOrigin, PropertySource};

/// Prefix applied to every setting's environment variable name.
pub const DEFAULT_ENV_PREFIX: &str = "DD";

/// Environment variables, captured once when the source is built.
///
/// The setting `trace.agent.port` is read from `DD_TRACE_AGENT_PORT`:
/// the prefix, an underscore, and the key upper-cased with `.` and `-`
/// replaced by `_`.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Build from raw OS strings, skipping entries that are not valid UTF-8.
    pub fn from_os_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        Self::from_vars(vars.into_iter().filter_map(|(name, value)| {
            match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => Some((name, value)),
                (Ok(name), Err(_)) => {
                    debug!(variable = %name, "skipping environment variable with non-UTF-8 value");
                    None
                },
                (Err(name), _) => {
                    debug!(variable = ?name, "skipping environment variable with non-UTF-8 name");
                    None
                },
            }
        }))
    }

    /// Build from an explicit set of variables.
    pub fn from_vars<K: Into<String>, V: Into<String>>(
        vars: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            prefix: DEFAULT_ENV_PREFIX.to_owned(),
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Use a different variable prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Environment variable name for a setting key.
    #[must_use]
    pub fn variable_name(&self, key: &str) -> String {
        let suffix: String = key
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        format!("{}_{suffix}", self.prefix)
    }
}

impl PropertySource for EnvSource {
    fn origin(&self) -> ConfigOrigin {
        ConfigOrigin::Environment
    }

    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(&self.variable_name(key)).cloned()
    }

    fn get_raw(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
