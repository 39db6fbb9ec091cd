use super::sequence::{Delimiters, parse_ordered_set, push_unique};
use super::{Parsed, Rejected};

/// A closed set of variants selectable by name from configuration.
///
/// Implementations match exhaustively over their names; there is no
/// reflection or runtime type inspection involved.
pub trait ConfigEnum: Copy + PartialEq + 'static {
    /// Look up a variant by its trimmed, lower-cased name.
    fn from_config_name(name: &str) -> Option<Self>;

    /// Canonical configuration name of this variant.
    fn config_name(self) -> &'static str;
}

/// Parse a single variant, case-insensitively.
#[must_use]
pub fn parse_enum<E: ConfigEnum>(raw: &str) -> Option<E> {
    E::from_config_name(&raw.trim().to_ascii_lowercase())
}

/// Parse a single variant, falling back to `default` when `raw` names no
/// known variant.
#[must_use]
pub fn parse_enum_or<E: ConfigEnum>(raw: &str, default: E) -> Parsed<E> {
    match parse_enum(raw) {
        Some(value) => Parsed::clean(value),
        None => Parsed {
            value: default,
            rejected: vec![Rejected::new(raw.trim(), "unrecognized value")],
        },
    }
}

/// Parse an ordered, de-duplicated set of variants. Unknown names are
/// rejected and skipped.
#[must_use]
pub fn parse_enum_set<E: ConfigEnum>(raw: &str, delimiters: Delimiters) -> Parsed<Vec<E>> {
    let mut parsed = Parsed::clean(Vec::new());
    for token in parse_ordered_set(raw, delimiters) {
        match parse_enum(&token) {
            Some(value) => {
                push_unique(&mut parsed.value, value);
            },
            None => parsed
                .rejected
                .push(Rejected::new(token, "unrecognized value")),
        }
    }
    parsed
}
