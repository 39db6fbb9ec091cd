//! The standard source stack.
//!
//! Ranked highest first:
//! 1. Programmatic overrides
//! 2. Process properties
//! 3. Environment variables (`DD_*`)
//! 4. The TOML file named by `trace.config`, looked up in 1–3
//! 5. Defaults captured from the running process
//!
//! A config file problem never aborts loading: a missing file is skipped
//! quietly, and an unreadable, oversized or malformed one is skipped and
//! reported to the diagnostic sink.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::builder::ConfigBuilder;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Diagnostics};
use crate::error::ConfigResult;
use crate::keys;
use crate::show::ResolvedConfig;
use crate::source::{CapturedEnvironment, EnvSource, FileSource, MapSource, PropertySource};

/// Load a snapshot from the standard stack over the real process
/// environment.
///
/// # Errors
///
/// Returns [`crate::ConfigError::FatalMisconfiguration`] if the resolved
/// settings violate a cross-field invariant.
pub fn load(overrides: MapSource, process: MapSource) -> ConfigResult<ResolvedConfig> {
    let diagnostics = Arc::new(Diagnostics::new());
    let sources = standard_sources(overrides, process, diagnostics.as_ref());
    ConfigBuilder::new()
        .diagnostics(diagnostics)
        .sources(sources)
        .build()
}

/// Build the standard stack over the real process environment.
#[must_use]
pub fn standard_sources(
    overrides: MapSource,
    process: MapSource,
    sink: &dyn DiagnosticSink,
) -> Vec<Box<dyn PropertySource>> {
    standard_sources_with_env(overrides, process, EnvSource::from_process(), sink)
}

/// Build the standard stack over an explicit environment.
#[must_use]
pub fn standard_sources_with_env(
    overrides: MapSource,
    process: MapSource,
    env: EnvSource,
    sink: &dyn DiagnosticSink,
) -> Vec<Box<dyn PropertySource>> {
    let file = config_file_path(&[&overrides, &process, &env])
        .and_then(|path| load_config_file(&path, sink));

    let mut sources: Vec<Box<dyn PropertySource>> =
        vec![Box::new(overrides), Box::new(process), Box::new(env)];
    if let Some(file) = file {
        sources.push(Box::new(file));
    }
    sources.push(Box::new(CapturedEnvironment::detect()));
    sources
}

fn config_file_path(sources: &[&dyn PropertySource]) -> Option<PathBuf> {
    sources
        .iter()
        .find_map(|source| source.get(keys::CONFIG_FILE))
        .map(|path| path.trim().to_owned())
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

fn load_config_file(path: &Path, sink: &dyn DiagnosticSink) -> Option<FileSource> {
    match FileSource::try_load(path) {
        Ok(Some(file)) => {
            info!(path = %path.display(), "loaded config file");
            Some(file)
        },
        Ok(None) => None,
        Err(e) => {
            sink.record(Diagnostic::UnreadableFile {
                setting: keys::CONFIG_FILE.to_owned(),
                path: path.display().to_string(),
                reason: e.to_string(),
            });
            None
        },
    }
}
