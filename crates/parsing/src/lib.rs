//! Channel-handle parsing.
//!
//! Normalizes free-form user tokens (`@handle`, bare handles, `t.me` links)
//! into canonical [`ChannelHandle`] values and classifies whole input
//! payloads into valid, invalid, and over-limit groups.

use std::collections::HashSet;

use newsroll_common::ChannelHandle;

/// Trailing punctuation stripped from pasted tokens (`"check t.me/durov!"`).
const TRAILING_PUNCT: &[char] = &[')', ']', '}', ',', '.', ';', ':', '!', '?'];

/// Result of parsing one input payload.
///
/// The three lists partition the classified token stream: a token lands in
/// exactly one of them, except duplicates of an already-accepted handle,
/// which are dropped silently. All lists preserve input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Unique valid handles, in order of first occurrence.
    pub valid: Vec<ChannelHandle>,
    /// Original (trimmed) tokens that failed normalization.
    pub invalid: Vec<String>,
    /// Original (trimmed) tokens that were valid but arrived after the
    /// accept cap was reached.
    pub truncated: Vec<String>,
}

/// Normalize one raw token into a canonical channel handle.
///
/// Strips surrounding whitespace, trailing punctuation, an `http(s)://`
/// scheme, a `t.me/` or `telegram.me/` prefix, and a leading `@`. Private
/// invite links (`+`/`joinchat`) and deep links containing `/` are rejected,
/// as is anything that fails the canonical-handle rules.
pub fn normalize_handle(raw: &str) -> Option<ChannelHandle> {
    let token = raw.trim();
    if token.is_empty() {
        return None;
    }

    let token = token.trim_end_matches(TRAILING_PUNCT).trim();
    if token.is_empty() {
        return None;
    }

    let token = strip_prefix_ignore_case(token, "https://")
        .or_else(|| strip_prefix_ignore_case(token, "http://"))
        .unwrap_or(token);
    let token = strip_prefix_ignore_case(token, "t.me/")
        .or_else(|| strip_prefix_ignore_case(token, "telegram.me/"))
        .unwrap_or(token);

    let token = token.trim_start_matches('@').trim();
    if token.is_empty() {
        return None;
    }

    let low = token.to_lowercase();
    if low.starts_with('+') || low.starts_with("joinchat") {
        return None;
    }
    if token.contains('/') {
        return None;
    }

    ChannelHandle::new(low).ok()
}

fn strip_prefix_ignore_case<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    let head = token.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &token[prefix.len()..])
}

/// Parse an input payload into deduplicated valid handles plus explicit
/// invalid and truncated groups.
///
/// Tokens are split on runs of whitespace and/or commas. At most `max_items`
/// handles are accepted; later valid handles are reported in `truncated`
/// with their original spelling. `max_items == 0` truncates everything the
/// dedup pass lets through.
pub fn parse_channels(text: &str, max_items: usize) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let mut seen: HashSet<String> = HashSet::new();

    let tokens = text
        .trim()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty());

    for raw in tokens {
        let Some(handle) = normalize_handle(raw) else {
            outcome.invalid.push(raw.trim().to_owned());
            continue;
        };

        if !seen.insert(handle.as_str().to_owned()) {
            continue;
        }

        if outcome.valid.len() < max_items {
            outcome.valid.push(handle);
        } else {
            outcome.truncated.push(raw.trim().to_owned());
        }
    }

    outcome
}
