use newsroll_common::ChannelSummary;

/// Render one channel summary into its digest block.
///
/// Line order is fixed: channel link, summary text, then — only when links
/// are requested and present — a header line followed by one bullet per
/// source link.
#[must_use]
pub fn format_channel_block(summary: &ChannelSummary, include_links: bool) -> String {
    let mut lines: Vec<String> = vec![
        summary.channel_link.clone(),
        summary.summary_text.trim().to_owned(),
    ];

    if include_links && !summary.post_links.is_empty() {
        lines.push("Posts:".to_owned());
        lines.extend(summary.post_links.iter().map(|link| format!("• {link}")));
    }

    lines.join("\n").trim().to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use newsroll_common::ChannelHandle;

    use super::*;

    fn summary(text: &str, links: &[&str]) -> ChannelSummary {
        let channel = ChannelHandle::new("durov").unwrap();
        ChannelSummary {
            channel_link: channel.link(),
            channel,
            summary_text: text.to_owned(),
            post_links: links.iter().map(|l| (*l).to_owned()).collect(),
        }
    }

    #[test]
    fn renders_link_then_summary() {
        let block = format_channel_block(&summary("  bullet one\nbullet two  ", &[]), true);
        assert_eq!(block, "https://t.me/durov\nbullet one\nbullet two");
    }

    #[test]
    fn appends_post_links_when_requested() {
        let block = format_channel_block(
            &summary("text", &["https://t.me/durov/1", "https://t.me/durov/2"]),
            true,
        );
        assert_eq!(
            block,
            "https://t.me/durov\ntext\nPosts:\n• https://t.me/durov/1\n• https://t.me/durov/2"
        );
    }

    #[test]
    fn suppresses_links_when_disabled() {
        let block = format_channel_block(&summary("text", &["https://t.me/durov/1"]), false);
        assert_eq!(block, "https://t.me/durov\ntext");
    }
}
