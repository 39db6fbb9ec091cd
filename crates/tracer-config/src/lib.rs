#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration resolution for the tracer runtime.
//!
//! Settings are read from a fixed stack of ranked sources, parsed with a
//! small set of total grammars, reconciled across deprecated and current
//! names, validated, and frozen into one immutable [`Config`] snapshot.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tracer_config::{Config, ConfigBuilder, source::{EnvSource, MapSource}};
//!
//! // Explicit stack, as used by tests and embedding hosts.
//! let resolved = ConfigBuilder::new()
//!     .source(MapSource::process([("trace.agent.port", "9126")]))
//!     .source(EnvSource::from_process())
//!     .build()?;
//! println!("{}", resolved.config);
//!
//! // Overrides on top of the standard stack.
//! let config = Config::with_overrides([("service", "checkout")])?;
//! assert_eq!(config.service.name, "checkout");
//! # Ok::<(), tracer_config::ConfigError>(())
//! ```
//!
//! # Source precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Overrides** supplied programmatically
//! 2. **Process properties** passed at startup
//! 3. **Environment variables** (`DD_*`)
//! 4. **Config file** named by `trace.config`
//! 5. **Captured environment** (for example the executable name as service)
//!
//! A lookup stops at the first source with a non-empty value. Map-valued
//! settings such as tags are instead merged across every source.
//!
//! # Failure model
//!
//! Only a cross-field contradiction that makes the tracer unusable fails a
//! build ([`ConfigError::FatalMisconfiguration`]). Everything else is
//! recorded as a [`Diagnostic`], logged through `tracing`, and resolved to
//! the setting's default.

use std::sync::{Arc, OnceLock};

/// Snapshot assembly from a source stack.
pub mod builder;
/// Credential resolution.
pub mod credentials;
/// Resolution diagnostics and the sink that records them.
pub mod diagnostics;
/// Configuration error types.
pub mod error;
/// Raw value grammars.
pub mod grammar;
/// Canonical setting keys.
#[allow(missing_docs)]
pub mod keys;
/// The standard source stack.
pub mod loader;
/// Deprecated/current setting reconciliation.
pub mod reconcile;
/// Ranked setting resolution.
pub mod resolve;
/// Resolved configuration display and serialization.
pub mod show;
/// Property sources.
pub mod source;
/// Configuration snapshot types.
pub mod types;
/// Range checks and cross-field invariants.
pub mod validate;

// Re-export primary types at the crate root.
pub use builder::ConfigBuilder;
pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticSink, Diagnostics};
pub use error::{ConfigError, ConfigResult};
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;

use crate::source::{MapSource, PropertySource};

impl Config {
    /// Build a snapshot from an explicit source stack.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FatalMisconfiguration`] if the resolved
    /// settings violate a cross-field invariant.
    pub fn build(sources: Vec<Box<dyn PropertySource>>) -> ConfigResult<Arc<Self>> {
        ConfigBuilder::new()
            .sources(sources)
            .build()
            .map(|resolved| resolved.config)
    }

    /// Build an independent snapshot with `overrides` on top of the
    /// standard stack.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FatalMisconfiguration`] if the resolved
    /// settings violate a cross-field invariant.
    pub fn with_overrides<K, V>(
        overrides: impl IntoIterator<Item = (K, V)>,
    ) -> ConfigResult<Arc<Self>>
    where
        K: Into<String>,
        V: Into<String>,
    {
        loader::load(
            MapSource::overrides(overrides),
            MapSource::process::<String, String>([]),
        )
        .map(|resolved| resolved.config)
    }
}

static PROCESS_DEFAULT: OnceLock<Arc<Config>> = OnceLock::new();

/// The process-wide snapshot, built from the standard stack on first use.
///
/// Intended for the outermost composition boundary only; library code
/// should take a `&Config` or `Arc<Config>` instead.
///
/// # Errors
///
/// Returns [`ConfigError::FatalMisconfiguration`] if the standard stack
/// resolves to an unusable configuration. A failed build is not cached.
pub fn process_default() -> ConfigResult<Arc<Config>> {
    if let Some(config) = PROCESS_DEFAULT.get() {
        return Ok(Arc::clone(config));
    }
    let built = loader::load(
        MapSource::overrides::<String, String>([]),
        MapSource::process::<String, String>([]),
    )?
    .config;
    Ok(Arc::clone(PROCESS_DEFAULT.get_or_init(|| built)))
}
