//! Lenient parsing of free-text filter replies.
//!
//! Stage A looks for a bracketed span (first `[` to last `]`) and parses it
//! as JSON. Stage B parses the whole reply. Whatever parses must be an array
//! of strings; anything else is a [`ReplyParseError`] and the caller falls
//! back to the unfiltered input.

use serde_json::Value;

/// Why a reply could not be used. Never surfaced outside the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReplyParseError {
    /// Neither the bracketed span nor the whole reply is valid JSON.
    NotJson,
    /// The reply is JSON, but not an array of strings.
    NotTitleList,
}

impl std::fmt::Display for ReplyParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotJson => f.write_str("reply is not valid JSON"),
            Self::NotTitleList => f.write_str("reply is not a JSON array of strings"),
        }
    }
}

/// The span from the first `[` to the last `]`, if both exist in that order.
fn bracketed_span(raw: &str) -> Option<&str> {
    let open = raw.find('[')?;
    let close = raw.rfind(']')?;
    (open < close).then(|| &raw[open..=close])
}

/// Parse a reply into titles using the bracket-then-whole-text strategy.
pub(crate) fn parse_filter_reply(raw: &str) -> Result<Vec<String>, ReplyParseError> {
    let stage_a = bracketed_span(raw).and_then(|span| serde_json::from_str::<Value>(span).ok());

    let value = match stage_a {
        Some(value) => value,
        None => serde_json::from_str::<Value>(raw.trim()).map_err(|_| ReplyParseError::NotJson)?,
    };

    let Value::Array(items) = value else {
        return Err(ReplyParseError::NotTitleList);
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(title) => Ok(title),
            _ => Err(ReplyParseError::NotTitleList),
        })
        .collect()
}
