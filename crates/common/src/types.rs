use {
    chrono::{DateTime, Utc},
    serde::Serialize,
};

use crate::error::{Error, Result};

/// A canonical, lowercase Telegram channel handle.
///
/// Only constructed through validation: 5–32 characters of `[a-z0-9_]`, no
/// leading or trailing underscore, no `__` run. Raw user tokens go through
/// the parsing crate first; this constructor rejects anything that is not
/// already canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChannelHandle(String);

impl ChannelHandle {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if is_canonical(&value) {
            Ok(Self(value))
        } else {
            Err(Error::validation(format!(
                "not a canonical channel handle: {value:?}"
            )))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public link to the channel.
    #[must_use]
    pub fn link(&self) -> String {
        format!("https://t.me/{}", self.0)
    }

    /// Permanent link to one message in the channel.
    #[must_use]
    pub fn permalink(&self, msg_id: i64) -> String {
        format!("https://t.me/{}/{msg_id}", self.0)
    }
}

fn is_canonical(value: &str) -> bool {
    if !(5..=32).contains(&value.len()) {
        return false;
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return false;
    }
    if value.starts_with('_') || value.ends_with('_') {
        return false;
    }
    !value.contains("__")
}

impl std::fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChannelHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One normalized channel post.
///
/// `msg_id` is scoped to its channel and used for idempotent storage, not for
/// ordering across channels.
#[derive(Debug, Clone)]
pub struct Post {
    pub channel: ChannelHandle,
    pub msg_id: i64,
    pub date: DateTime<Utc>,
    pub text: String,
    pub permalink: Option<String>,
}

/// One channel's contribution to a digest.
///
/// On failure `summary_text` carries a human-readable placeholder instead of
/// generated text.
#[derive(Debug, Clone)]
pub struct ChannelSummary {
    pub channel: ChannelHandle,
    pub channel_link: String,
    pub summary_text: String,
    pub post_links: Vec<String>,
}

/// A user's fully assembled digest.
#[derive(Debug, Clone)]
pub struct Digest {
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub summaries: Vec<ChannelSummary>,
    pub raw_text: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_handles() {
        for value in ["durov", "rust_lang", "a1_b2_c3", "abcde", "x".repeat(32).as_str()] {
            assert!(ChannelHandle::new(value).is_ok(), "rejected {value:?}");
        }
    }

    #[test]
    fn rejects_non_canonical_handles() {
        for value in [
            "",
            "abcd",
            "Durov",
            "_durov",
            "durov_",
            "du__rov",
            "has space",
            "has/slash",
            "x".repeat(33).as_str(),
        ] {
            assert!(ChannelHandle::new(value).is_err(), "accepted {value:?}");
        }
    }

    #[test]
    fn links_point_at_channel() {
        let handle = ChannelHandle::new("durov").unwrap();
        assert_eq!(handle.link(), "https://t.me/durov");
        assert_eq!(handle.permalink(42), "https://t.me/durov/42");
    }
}
