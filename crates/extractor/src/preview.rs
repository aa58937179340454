use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    newsroll_common::{ChannelHandle, Error, Post, Result},
    newsroll_digest::clean,
    tracing::debug,
};

use crate::PostFetcher;

const DEFAULT_BASE_URL: &str = "https://t.me";

/// Fetches recent posts from a channel's public preview page.
pub struct PreviewFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl PreviewFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Override the preview host (tests point this at a local server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PostFetcher for PreviewFetcher {
    async fn fetch_recent(&self, channel: &ChannelHandle, limit: usize) -> Result<Vec<Post>> {
        let url = format!("{}/s/{}", self.base_url, channel);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::extract(format!("{channel}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::extract(format!("{channel}: HTTP {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::extract(format!("{channel}: {e}")))?;

        let posts = parse_preview_page(&html, channel, limit)?;
        debug!(channel = %channel, count = posts.len(), "fetched channel preview");
        Ok(posts)
    }
}

/// Extract posts from preview-page markup.
///
/// The page lists the newest ~20 messages oldest-first; textless messages
/// (media-only, service) are skipped and the newest `limit` survivors are
/// returned in chronological ascending order.
fn parse_preview_page(html: &str, channel: &ChannelHandle, limit: usize) -> Result<Vec<Post>> {
    if !html.contains("tgme_channel_info") {
        return Err(Error::extract(format!(
            "{channel}: channel not found or has no public preview"
        )));
    }

    let mut posts: Vec<Post> = Vec::new();
    for block in html.split("tgme_widget_message_wrap").skip(1) {
        let Some(msg_id) = message_id(block) else {
            continue;
        };
        let Some(date) = message_date(block) else {
            continue;
        };
        let Some(text) = message_text(block) else {
            continue;
        };
        let text = clean(&text);
        if text.is_empty() {
            continue;
        }
        posts.push(Post {
            channel: channel.clone(),
            msg_id,
            date,
            text,
            permalink: Some(channel.permalink(msg_id)),
        });
    }

    if posts.len() > limit {
        posts = posts.split_off(posts.len() - limit);
    }
    Ok(posts)
}

fn message_id(block: &str) -> Option<i64> {
    let value = attr_value(block, "data-post=\"")?;
    value.rsplit('/').next()?.parse().ok()
}

fn message_date(block: &str) -> Option<DateTime<Utc>> {
    let value = attr_value(block, "datetime=\"")?;
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

fn message_text(block: &str) -> Option<String> {
    let start = block.find("tgme_widget_message_text")?;
    let rest = &block[start..];
    let open_end = rest.find('>')? + 1;
    let body = &rest[open_end..];
    let end = body.find("</div>")?;
    Some(html_to_text(&body[..end]))
}

fn attr_value<'a>(block: &'a str, marker: &str) -> Option<&'a str> {
    let start = block.find(marker)? + marker.len();
    let rest = &block[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Strip markup from a preview text fragment: `<br>` becomes a newline, all
/// other tags are dropped, and the common entities are unescaped.
fn html_to_text(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];
        let Some(close) = after.find('>') else {
            break;
        };
        let tag = &after[..=close];
        if tag.starts_with("<br") {
            out.push('\n');
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);

    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
