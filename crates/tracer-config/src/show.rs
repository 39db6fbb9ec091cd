//! Source-annotated display of a resolved configuration.
//!
//! Renders the snapshot together with where every consulted setting came
//! from and what was reported while resolving it. Secrets stay masked.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use serde::Serialize;

use crate::diagnostics::Diagnostic;
use crate::resolve::CollectedSetting;
use crate::types::Config;

/// A snapshot together with its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The frozen configuration.
    pub config: Arc<Config>,
    /// Setting key → effective value (masked for secrets) and origin.
    pub field_sources: BTreeMap<String, CollectedSetting>,
    /// Everything reported while resolving, in first-recorded order.
    pub diagnostics: Vec<Diagnostic>,
    /// Config files that were part of the source stack.
    pub loaded_files: Vec<String>,
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a Config,
    sources: &'a BTreeMap<String, CollectedSetting>,
    diagnostics: Vec<String>,
    loaded_files: &'a [String],
}

/// Output format for [`ResolvedConfig::show`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// TOML with a commented header listing origins and diagnostics.
    Toml,
    /// JSON (for programmatic consumption).
    Json,
}

impl ResolvedConfig {
    /// Render the configuration, or a single section of it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or `section` does not name a
    /// top-level section.
    pub fn show(&self, format: ShowFormat, section: Option<&str>) -> Result<String, fmt::Error> {
        match format {
            ShowFormat::Toml => self.show_toml(section),
            ShowFormat::Json => self.show_json(section),
        }
    }

    /// The origin recorded for a setting key, if it was consulted.
    #[must_use]
    pub fn origin_of(&self, key: &str) -> Option<&CollectedSetting> {
        self.field_sources.get(key)
    }

    fn show_toml(&self, section: Option<&str>) -> Result<String, fmt::Error> {
        let body = match section {
            Some(name) => toml::to_string_pretty(&self.section(name)?),
            None => toml::to_string_pretty(self.config.as_ref()),
        }
        .map_err(|_| fmt::Error)?;

        let mut output = String::new();
        output.push_str("# Resolved tracer configuration\n");

        if !self.loaded_files.is_empty() {
            output.push_str("#\n# Loaded files:\n");
            for path in &self.loaded_files {
                writeln!(output, "#   {path}")?;
            }
        }

        if !self.field_sources.is_empty() {
            output.push_str("#\n# Settings by origin:\n");
            for (key, setting) in &self.field_sources {
                writeln!(output, "#   {key} = {}  [{}]", setting.value, setting.origin)?;
            }
        }

        if !self.diagnostics.is_empty() {
            output.push_str("#\n# Diagnostics:\n");
            for diagnostic in &self.diagnostics {
                writeln!(output, "#   {diagnostic}")?;
            }
        }

        output.push('\n');
        output.push_str(&body);
        Ok(output)
    }

    fn show_json(&self, section: Option<&str>) -> Result<String, fmt::Error> {
        if let Some(name) = section {
            return serde_json::to_string_pretty(&self.section(name)?).map_err(|_| fmt::Error);
        }
        let report = Report {
            config: self.config.as_ref(),
            sources: &self.field_sources,
            diagnostics: self.diagnostics.iter().map(ToString::to_string).collect(),
            loaded_files: &self.loaded_files,
        };
        serde_json::to_string_pretty(&report).map_err(|_| fmt::Error)
    }

    fn section(&self, name: &str) -> Result<toml::Value, fmt::Error> {
        let value = toml::Value::try_from(self.config.as_ref()).map_err(|_| fmt::Error)?;
        let table = value.as_table().ok_or(fmt::Error)?;
        table.get(name).cloned().ok_or(fmt::Error)
    }
}
