//! Reconciliation of settings that exist under deprecated and current names.
//!
//! A split setting has one key per direction (extract and inject) in each
//! generation plus a common current key covering both directions. For each
//! direction the precedence is:
//!
//! 1. the current per-direction key,
//! 2. the common key,
//! 3. the deprecated per-direction key, translated into the current domain,
//! 4. the built-in current default.
//!
//! Every shadowed or converted value is reported through the resolver's
//! diagnostics sink. A key whose value parses to an empty set counts as
//! absent. The untranslated deprecated values are kept as a legacy view.

mod propagation;


use serde::Serialize;

pub use propagation::{PROPAGATION_STYLE, PropagationStyle, TracePropagationStyle};

use crate::diagnostics::{Diagnostic, render_list};
use crate::grammar::{ConfigEnum, Delimiters, push_unique};
use crate::resolve::Resolver;

/// The two directions a split setting is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Reading incoming context.
    Extract,
    /// Writing outgoing context.
    Inject,
}

/// One key per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionKeys {
    /// Key for [`Direction::Extract`].
    pub extract: &'static str,
    /// Key for [`Direction::Inject`].
    pub inject: &'static str,
}

impl DirectionKeys {
    /// The key for `direction`.
    #[must_use]
    pub fn get(&self, direction: Direction) -> &'static str {
        match direction {
            Direction::Extract => self.extract,
            Direction::Inject => self.inject,
        }
    }
}

/// Static description of a setting split across two generations of names.
#[derive(Debug, Clone, Copy)]
pub struct SplitSetting<Old: 'static, New: 'static> {
    /// Current key applying to both directions.
    pub common_key: &'static str,
    /// Current per-direction keys.
    pub current: DirectionKeys,
    /// Deprecated per-direction keys.
    pub deprecated: DirectionKeys,
    /// Token delimiters of the deprecated keys.
    pub deprecated_delimiters: Delimiters,
    /// Token delimiters of the current keys.
    pub current_delimiters: Delimiters,
    /// Maps one deprecated variant onto zero or more current variants.
    pub translate: fn(Old) -> &'static [New],
    /// Current value when nothing is configured.
    pub default_current: &'static [New],
    /// Legacy view when the deprecated key is absent.
    pub default_legacy: &'static [Old],
}

/// Which name supplied the effective value of one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum Outcome {
    /// A current key (per-direction or common) supplied the value.
    Current(&'static str),
    /// A current key supplied the value and a deprecated key was ignored.
    CurrentOverridesDeprecated(&'static str),
    /// The deprecated key was translated.
    DeprecatedConverted(&'static str),
    /// Nothing usable was configured.
    Default,
}

/// The reconciled value of one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled<Old, New> {
    /// Effective value in the current domain, never empty.
    pub values: Vec<New>,
    /// Untranslated deprecated value, or the legacy default.
    pub legacy: Vec<Old>,
    /// How `values` was decided.
    pub outcome: Outcome,
}

/// Both directions of a reconciled split setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledSetting<Old, New> {
    /// Extraction side.
    pub extract: Reconciled<Old, New>,
    /// Injection side.
    pub inject: Reconciled<Old, New>,
}

impl<Old: ConfigEnum, New: ConfigEnum> SplitSetting<Old, New> {
    /// Reconcile both directions against `resolver`.
    #[must_use]
    pub fn reconcile(&self, resolver: &Resolver) -> ReconciledSetting<Old, New> {
        let common: Vec<New> =
            resolver.get_enum_set(self.common_key, self.current_delimiters, &[]);
        ReconciledSetting {
            extract: self.reconcile_direction(resolver, Direction::Extract, &common),
            inject: self.reconcile_direction(resolver, Direction::Inject, &common),
        }
    }

    fn reconcile_direction(
        &self,
        resolver: &Resolver,
        direction: Direction,
        common: &[New],
    ) -> Reconciled<Old, New> {
        let current_key = self.current.get(direction);
        let deprecated_key = self.deprecated.get(direction);

        let deprecated: Vec<Old> =
            resolver.get_enum_set(deprecated_key, self.deprecated_delimiters, &[]);
        let split: Vec<New> = resolver.get_enum_set(current_key, self.current_delimiters, &[]);

        let current = if split.is_empty() {
            (!common.is_empty()).then(|| (self.common_key, common.to_vec()))
        } else {
            if !common.is_empty() {
                resolver.report(Diagnostic::Overridden {
                    setting: self.common_key.to_owned(),
                    overriding_setting: current_key.to_owned(),
                    value: render(&split),
                });
            }
            Some((current_key, split))
        };

        let (values, outcome) = match current {
            Some((key, values)) if deprecated.is_empty() => (values, Outcome::Current(key)),
            Some((key, values)) => {
                resolver.report(Diagnostic::OverriddenDeprecated {
                    setting: deprecated_key.to_owned(),
                    overriding_setting: key.to_owned(),
                    value: render(&values),
                });
                (values, Outcome::CurrentOverridesDeprecated(key))
            },
            None => {
                let converted = self.convert(&deprecated);
                if converted.is_empty() {
                    (self.default_current.to_vec(), Outcome::Default)
                } else {
                    resolver.report(Diagnostic::DeprecatedConverted {
                        deprecated_setting: deprecated_key.to_owned(),
                        old_value: render(&deprecated),
                        new_setting: current_key.to_owned(),
                        new_value: render(&converted),
                    });
                    (converted, Outcome::DeprecatedConverted(deprecated_key))
                }
            },
        };

        let legacy = if deprecated.is_empty() {
            self.default_legacy.to_vec()
        } else {
            deprecated
        };

        Reconciled {
            values,
            legacy,
            outcome,
        }
    }

    /// Translate deprecated variants, keeping order and dropping duplicates.
    #[must_use]
    pub fn convert(&self, deprecated: &[Old]) -> Vec<New> {
        let mut converted = Vec::new();
        for old in deprecated {
            for new in (self.translate)(*old) {
                push_unique(&mut converted, *new);
            }
        }
        converted
    }
}

fn render<E: ConfigEnum>(values: &[E]) -> String {
    let names: Vec<&str> = values.iter().map(|v| v.config_name()).collect();
    render_list(&names)
}
