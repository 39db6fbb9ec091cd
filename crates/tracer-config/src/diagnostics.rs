//! Diagnostics emitted while resolving configuration.
//!
//! Every fallback, override, deprecation or conversion decision is reported
//! through a [`DiagnosticSink`]. The default sink, [`Diagnostics`], logs each
//! entry through `tracing` and keeps a de-duplicated copy so that callers
//! (and tests) can audit exactly which source won.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, error, info, warn};

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    /// Informational; an explicit value was set aside by a derivation rule.
    Info,
    /// A value was ignored, converted, or replaced by a default.
    Warn,
    /// A source could not be read at all.
    Error,
}

/// One recorded resolution decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A broader setting is shadowed by a more specific one.
    Overridden {
        /// The shadowed setting.
        setting: String,
        /// The setting that won.
        overriding_setting: String,
        /// Rendered winning value.
        value: String,
    },
    /// A deprecated setting is present but a current setting won.
    OverriddenDeprecated {
        /// The deprecated setting.
        setting: String,
        /// The setting that supplied the effective value.
        overriding_setting: String,
        /// Rendered winning value.
        value: String,
    },
    /// A deprecated setting was translated into its replacement.
    DeprecatedConverted {
        /// The deprecated setting.
        deprecated_setting: String,
        /// Rendered deprecated value.
        old_value: String,
        /// The replacement setting.
        new_setting: String,
        /// Rendered converted value.
        new_value: String,
    },
    /// A setting is ignored because another setting switches it off.
    IgnoredSetting {
        /// The ignored setting.
        setting: String,
        /// The enabling setting responsible.
        because_of: String,
    },
    /// An explicit override is replaced by a value derived from another
    /// setting.
    IgnoredOverride {
        /// The overridden setting.
        setting: String,
        /// Rendered explicit value.
        value: String,
        /// Rendered value used instead.
        used: String,
        /// Why the explicit value is not honoured.
        reason: String,
    },
    /// A token did not name any known variant.
    UnrecognizedValue {
        /// The setting being parsed.
        setting: String,
        /// The offending token.
        value: String,
    },
    /// A raw value could not be parsed.
    InvalidValue {
        /// The setting being parsed.
        setting: String,
        /// The offending raw value or token.
        value: String,
        /// Parser explanation.
        reason: String,
    },
    /// A parsed value was outside its accepted range.
    OutOfRange {
        /// The setting being validated.
        setting: String,
        /// Rendered rejected value.
        value: String,
        /// Rendered accepted range.
        range: String,
        /// Rendered default used instead.
        default: String,
    },
    /// A file named by a setting could not be read.
    UnreadableFile {
        /// The setting naming the file.
        setting: String,
        /// The path that failed.
        path: String,
        /// I/O explanation.
        reason: String,
    },
    /// A strategy name is recognised but not supported for production use.
    UnsupportedStrategy {
        /// The setting being resolved.
        setting: String,
        /// The strategy name.
        value: String,
    },
    /// A mode that needs a credential is enabled without one.
    MissingCredential {
        /// The mode setting.
        setting: String,
        /// The missing credential.
        credential: String,
    },
}

impl Diagnostic {
    /// Severity used when logging this diagnostic.
    #[must_use]
    pub fn level(&self) -> DiagnosticLevel {
        match self {
            Self::IgnoredOverride { .. } => DiagnosticLevel::Info,
            Self::UnreadableFile { .. } => DiagnosticLevel::Error,
            _ => DiagnosticLevel::Warn,
        }
    }

    /// The primary setting this diagnostic is about.
    #[must_use]
    pub fn setting(&self) -> &str {
        match self {
            Self::Overridden { setting, .. }
            | Self::OverriddenDeprecated { setting, .. }
            | Self::IgnoredSetting { setting, .. }
            | Self::IgnoredOverride { setting, .. }
            | Self::UnrecognizedValue { setting, .. }
            | Self::InvalidValue { setting, .. }
            | Self::OutOfRange { setting, .. }
            | Self::UnreadableFile { setting, .. }
            | Self::UnsupportedStrategy { setting, .. }
            | Self::MissingCredential { setting, .. } => setting,
            Self::DeprecatedConverted {
                deprecated_setting, ..
            } => deprecated_setting,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overridden {
                setting,
                overriding_setting,
                value,
            } => write!(
                f,
                "Setting {setting} is overridden by setting {overriding_setting} with value \
                 {value}."
            ),
            Self::OverriddenDeprecated {
                setting,
                overriding_setting,
                value,
            } => write!(
                f,
                "Setting {setting} is deprecated and overridden by setting \
                 {overriding_setting} with value {value}."
            ),
            Self::DeprecatedConverted {
                deprecated_setting,
                old_value,
                new_setting,
                new_value,
            } => write!(
                f,
                "Setting {deprecated_setting} is deprecated and the value {old_value} has been \
                 converted to {new_value} for setting {new_setting}."
            ),
            Self::IgnoredSetting {
                setting,
                because_of,
            } => write!(f, "Setting {setting} ignored since {because_of} is enabled."),
            Self::IgnoredOverride {
                setting,
                value,
                used,
                reason,
            } => write!(
                f,
                "Setting {setting} is set to {value}, but {reason}. Using {used}."
            ),
            Self::UnrecognizedValue { setting, value } => write!(
                f,
                "Cannot recognize config string value {value} for setting {setting}"
            ),
            Self::InvalidValue {
                setting,
                value,
                reason,
            } => write!(f, "Invalid value '{value}' for setting {setting}: {reason}"),
            Self::OutOfRange {
                setting,
                value,
                range,
                default,
            } => write!(
                f,
                "Invalid {setting}: {value}. The value must be in range {range}; \
                 using the default of {default}"
            ),
            Self::UnreadableFile {
                setting,
                path,
                reason,
            } => write!(
                f,
                "Cannot read {setting} from file {path}, skipping. Exception {reason}"
            ),
            Self::UnsupportedStrategy { setting, value } => write!(
                f,
                "*** you are using an unsupported {setting} {value} - this can impact \
                 correctness of traces"
            ),
            Self::MissingCredential {
                setting,
                credential,
            } => write!(
                f,
                "{setting} activated but no {credential} provided. Uploading will likely fail"
            ),
        }
    }
}

/// Write-only collaborator receiving resolution diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Record one diagnostic.
    fn record(&self, diagnostic: Diagnostic);
}

/// Default sink: logs through `tracing` and keeps a de-duplicated list.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in first-recorded order.
    #[must_use]
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded diagnostics matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Diagnostic) -> bool) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|d| predicate(d))
            .count()
    }
}

impl DiagnosticSink for Diagnostics {
    fn record(&self, diagnostic: Diagnostic) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.contains(&diagnostic) {
            debug!(setting = diagnostic.setting(), "duplicate diagnostic suppressed");
            return;
        }
        match diagnostic.level() {
            DiagnosticLevel::Info => info!(setting = diagnostic.setting(), "{diagnostic}"),
            DiagnosticLevel::Warn => warn!(setting = diagnostic.setting(), "{diagnostic}"),
            DiagnosticLevel::Error => error!(setting = diagnostic.setting(), "{diagnostic}"),
        }
        entries.push(diagnostic);
    }
}

/// Render a sequence the way diagnostics show values: `[a, b]`.
pub(crate) fn render_list<T: fmt::Display>(items: &[T]) -> String {
    let mut out = String::from("[");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&item.to_string());
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unrecognized(value: &str) -> Diagnostic {
        Diagnostic::UnrecognizedValue {
            setting: "trace.propagation.style".to_owned(),
            value: value.to_owned(),
        }
    }

    #[test]
    fn test_duplicates_are_recorded_once() {
        let sink = Diagnostics::new();
        sink.record(unrecognized("zipkin"));
        sink.record(unrecognized("zipkin"));
        sink.record(unrecognized("jaeger"));

        assert_eq!(sink.entries().len(), 2);
        assert_eq!(sink.entries()[0], unrecognized("zipkin"));
    }

    #[test]
    fn test_levels() {
        assert_eq!(unrecognized("x").level(), DiagnosticLevel::Warn);
        let unreadable = Diagnostic::UnreadableFile {
            setting: "api-key-file".to_owned(),
            path: "/nope".to_owned(),
            reason: "not found".to_owned(),
        };
        assert_eq!(unreadable.level(), DiagnosticLevel::Error);
    }

    #[test]
    fn test_display_matches_operator_wording() {
        let d = Diagnostic::OverriddenDeprecated {
            setting: "propagation.style.extract".to_owned(),
            overriding_setting: "trace.propagation.style.extract".to_owned(),
            value: "[b3multi]".to_owned(),
        };
        assert_eq!(
            d.to_string(),
            "Setting propagation.style.extract is deprecated and overridden by setting \
             trace.propagation.style.extract with value [b3multi]."
        );
    }

    #[test]
    fn test_render_list() {
        assert_eq!(render_list::<&str>(&[]), "[]");
        assert_eq!(render_list(&["a", "b"]), "[a, b]");
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_record_logs_through_tracing() {
        let sink = Diagnostics::new();
        sink.record(unrecognized("zipkin"));
        assert!(logs_contain("Cannot recognize config string value zipkin"));
    }
}
