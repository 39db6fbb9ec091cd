use std::io;
use thiserror::Error;

/// Configuration error type.
///
/// Only [`ConfigError::FatalMisconfiguration`] escapes snapshot
/// construction. The read and parse variants are returned by direct callers
/// of [`FileSource::load`](crate::source::FileSource::load); the standard
/// loader turns them into diagnostics and skips the file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// Path to the config file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to parse a TOML configuration file.
    #[error("Failed to parse config file at {path}: {source}")]
    ParseError {
        /// Path to the config file that failed to parse.
        path: String,
        /// Underlying TOML parse error.
        #[source]
        source: toml::de::Error,
    },

    /// A configuration file exceeded the size limit.
    #[error("Config file at {path} is {size} bytes, exceeding the {limit} byte limit")]
    FileTooLarge {
        /// Path to the offending file.
        path: String,
        /// Observed size in bytes.
        size: u64,
        /// Maximum accepted size in bytes.
        limit: u64,
    },

    /// A cross-field invariant is violated and the process must not start.
    #[error("Fatal configuration error: {message}")]
    FatalMisconfiguration {
        /// Human-readable description of the violated invariant.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
