//! Raw string grammars for collection-valued settings.
//!
//! Every parser here is total: malformed input never fails, it degrades to
//! an empty or default value and the offending tokens are returned in
//! [`Parsed::rejected`] so that the resolver can report them.

mod enumeration;
mod map;
mod range;
mod sequence;

pub use enumeration::{ConfigEnum, parse_enum, parse_enum_or, parse_enum_set};
pub use map::{OrderedMap, normalize_tag_name, parse_map_with_optional_mappings, parse_ordered_map};
pub use range::{STATUS_CODE_LIMIT, StatusSet, parse_status_set};
pub use sequence::{Delimiters, parse_ordered_set, parse_sequence, push_unique};

/// A token the grammar could not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    /// The raw token.
    pub token: String,
    /// Why it was rejected.
    pub reason: String,
}

impl Rejected {
    pub(crate) fn new(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome of a total parse: the value plus anything that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    /// The parsed value (possibly empty or the supplied default).
    pub value: T,
    /// Tokens that were skipped.
    pub rejected: Vec<Rejected>,
}

impl<T> Parsed<T> {
    pub(crate) fn clean(value: T) -> Self {
        Self {
            value,
            rejected: Vec::new(),
        }
    }
}

/// Parse a boolean the way settings accept them: `true`/`false`/`1`/`0`,
/// case-insensitive, surrounding whitespace ignored.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" TRUE "), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("False"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool(""), None);
    }
}
