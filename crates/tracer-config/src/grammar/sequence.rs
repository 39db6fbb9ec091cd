/// Which characters separate tokens in a delimited sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiters {
    /// Commas only. Whitespace around a token is trimmed.
    Comma,
    /// Commas and any run of whitespace.
    CommaOrWhitespace,
}

impl Delimiters {
    fn splits_at(self, c: char) -> bool {
        c == ',' || (self == Self::CommaOrWhitespace && c.is_whitespace())
    }
}

/// Split `raw` into its non-empty tokens, in first-seen order.
///
/// Leading, trailing and adjacent delimiters never produce empty tokens.
#[must_use]
pub fn parse_sequence(raw: &str, delimiters: Delimiters) -> Vec<String> {
    raw.split(|c: char| delimiters.splits_at(c))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Like [`parse_sequence`], but duplicates are dropped and the first
/// occurrence keeps its position.
#[must_use]
pub fn parse_ordered_set(raw: &str, delimiters: Delimiters) -> Vec<String> {
    let mut set = Vec::new();
    for token in parse_sequence(raw, delimiters) {
        push_unique(&mut set, token);
    }
    set
}

/// Append `item` unless an equal element is already present.
///
/// Returns `true` if the item was appended.
pub fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) -> bool {
    if items.contains(&item) {
        false
    } else {
        items.push(item);
        true
    }
}
