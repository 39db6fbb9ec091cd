//! Ranked property sources.
//!
//! A source is a read-only `key -> value` lookup tagged with the
//! [`ConfigOrigin`] it represents. The resolver consults sources in
//! [`ConfigOrigin`] order and never reorders them.

mod captured;
mod env;
mod file;
mod map;

use std::fmt;
use std::path::Path;

use serde::Serialize;

pub use captured::CapturedEnvironment;
pub use env::{DEFAULT_ENV_PREFIX, EnvSource};
pub use file::{FileSource, MAX_CONFIG_FILE_SIZE};
pub use map::MapSource;

/// Where a resolved value came from, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigOrigin {
    /// Explicit programmatic override (tests, embedding hosts).
    Override,
    /// Process-level properties passed at startup.
    Process,
    /// Environment variables.
    Environment,
    /// The TOML configuration file.
    File,
    /// Defaults captured from the running environment.
    CapturedEnvironment,
    /// Built-in default supplied by the caller.
    Default,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Process => write!(f, "process property"),
            Self::Environment => write!(f, "environment variable"),
            Self::File => write!(f, "config file"),
            Self::CapturedEnvironment => write!(f, "captured environment"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A read-only, ranked key/value lookup.
pub trait PropertySource: fmt::Debug + Send + Sync {
    /// The rank this source occupies.
    fn origin(&self) -> ConfigOrigin;

    /// Look up a setting by its canonical dotted key.
    fn get(&self, key: &str) -> Option<String>;

    /// Look up a raw, source-specific name (e.g. an unprefixed environment
    /// variable). Most sources have no such namespace.
    fn get_raw(&self, _name: &str) -> Option<String> {
        None
    }

    /// The file backing this source, if any.
    fn location(&self) -> Option<&Path> {
        None
    }
}
