use std::fmt;

use serde::{Serialize, Serializer};

use super::{Parsed, Rejected};

/// Exclusive upper bound of the status code domain.
pub const STATUS_CODE_LIMIT: u16 = 600;

const WORDS: usize = 10;

/// Fixed-size bitmask over HTTP/RPC status codes `0..STATUS_CODE_LIMIT`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusSet {
    words: [u64; WORDS],
}

impl StatusSet {
    /// A set with no codes.
    #[must_use]
    pub const fn empty() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Default set of server error statuses: 500–599.
    #[must_use]
    pub fn server_errors() -> Self {
        Self::from_range(500, 599)
    }

    /// Default set of client error statuses: 400–499.
    #[must_use]
    pub fn client_errors() -> Self {
        Self::from_range(400, 499)
    }

    /// Inclusive range; codes outside the domain are ignored.
    #[must_use]
    pub fn from_range(lo: u16, hi: u16) -> Self {
        let mut set = Self::empty();
        for code in lo..=hi {
            set.insert(code);
        }
        set
    }

    /// Add `code`. Returns `false` if it is outside the domain.
    pub fn insert(&mut self, code: u16) -> bool {
        if code >= STATUS_CODE_LIMIT {
            return false;
        }
        let (word, bit) = Self::slot(code);
        self.words[word] |= 1_u64 << bit;
        true
    }

    /// Whether `code` is in the set.
    #[must_use]
    pub fn contains(&self, code: u16) -> bool {
        if code >= STATUS_CODE_LIMIT {
            return false;
        }
        let (word, bit) = Self::slot(code);
        self.words[word] & (1_u64 << bit) != 0
    }

    /// Whether the set has no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Number of codes in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate codes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        (0..STATUS_CODE_LIMIT).filter(|code| self.contains(*code))
    }

    fn slot(code: u16) -> (usize, u32) {
        let code = usize::from(code);
        #[allow(clippy::cast_possible_truncation)]
        let bit = (code % 64) as u32;
        (code / 64, bit)
    }
}

impl Default for StatusSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Renders as a compact range list, e.g. `500-502,504`.
impl fmt::Display for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut run: Option<(u16, u16)> = None;
        let mut flush = |f: &mut fmt::Formatter<'_>, (lo, hi): (u16, u16)| -> fmt::Result {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            if lo == hi {
                write!(f, "{lo}")
            } else {
                write!(f, "{lo}-{hi}")
            }
        };
        for code in self.iter() {
            run = match run {
                Some((lo, hi)) if hi.checked_add(1) == Some(code) => Some((lo, code)),
                Some(done) => {
                    flush(f, done)?;
                    Some((code, code))
                },
                None => Some((code, code)),
            };
        }
        if let Some(done) = run {
            flush(f, done)?;
        }
        Ok(())
    }
}

impl fmt::Debug for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusSet({self})")
    }
}

impl Serialize for StatusSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a comma-separated list of codes and inclusive `lo-hi` ranges.
///
/// Whitespace is ignored. Reversed ranges are normalised. Tokens that do not
/// parse, or fall outside `0..STATUS_CODE_LIMIT`, are rejected. When `raw`
/// is empty or nothing survives, `default` is returned unchanged.
#[must_use]
pub fn parse_status_set(raw: &str, default: StatusSet) -> Parsed<StatusSet> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut parsed = Parsed::clean(StatusSet::empty());

    for token in compact.split(',').filter(|t| !t.is_empty()) {
        match parse_token(token) {
            Ok((lo, hi)) => {
                for code in lo..=hi {
                    parsed.value.insert(code);
                }
            },
            Err(reason) => parsed.rejected.push(Rejected::new(token, reason)),
        }
    }

    if parsed.value.is_empty() {
        parsed.value = default;
    }
    parsed
}

fn parse_token(token: &str) -> Result<(u16, u16), String> {
    let (lo, hi) = match token.split_once('-') {
        Some((lo, hi)) => (parse_code(lo)?, parse_code(hi)?),
        None => {
            let code = parse_code(token)?;
            (code, code)
        },
    };
    Ok(if lo <= hi { (lo, hi) } else { (hi, lo) })
}

fn parse_code(raw: &str) -> Result<u16, String> {
    let code: u16 = raw
        .parse()
        .map_err(|e| format!("'{raw}' is not a status code: {e}"))?;
    if code >= STATUS_CODE_LIMIT {
        return Err(format!("{code} is outside 0-{}", STATUS_CODE_LIMIT.saturating_sub(1)));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_and_singletons() {
        let parsed = parse_status_set("500-502,504", StatusSet::server_errors());
        let codes: Vec<u16> = parsed.value.iter().collect();
        assert_eq!(codes, vec![500, 501, 502, 504]);
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn test_empty_input_yields_default() {
        let parsed = parse_status_set("", StatusSet::server_errors());
        assert_eq!(parsed.value, StatusSet::server_errors());
        assert_eq!(parsed.value.len(), 100);
    }

    #[test]
    fn test_invalid_tokens_are_skipped() {
        let parsed = parse_status_set("404, abc, 700, 5x0-510", StatusSet::client_errors());
        let codes: Vec<u16> = parsed.value.iter().collect();
        assert_eq!(codes, vec![404]);
        assert_eq!(parsed.rejected.len(), 3);
    }

    #[test]
    fn test_nothing_valid_yields_default() {
        let parsed = parse_status_set("nope", StatusSet::client_errors());
        assert_eq!(parsed.value, StatusSet::client_errors());
        assert_eq!(parsed.rejected.len(), 1);
    }

    #[test]
    fn test_reversed_range_is_normalised() {
        let parsed = parse_status_set("403-401", StatusSet::empty());
        let codes: Vec<u16> = parsed.value.iter().collect();
        assert_eq!(codes, vec![401, 402, 403]);
    }

    #[test]
    fn test_display_compacts_runs() {
        let parsed = parse_status_set("504, 500-502, 0", StatusSet::empty());
        assert_eq!(parsed.value.to_string(), "0,500-502,504");
        assert_eq!(StatusSet::server_errors().to_string(), "500-599");
        assert_eq!(StatusSet::empty().to_string(), "");
    }

    #[test]
    fn test_domain_bounds() {
        let mut set = StatusSet::empty();
        assert!(set.insert(599));
        assert!(!set.insert(600));
        assert!(set.contains(599));
        assert!(!set.contains(600));
    }
}
