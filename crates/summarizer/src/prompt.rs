use newsroll_common::{ChannelHandle, Post};

/// Build the deterministic summarization prompt for one channel.
///
/// Serializes channel metadata and the transformed posts into a single
/// stable input string so identical post sets produce identical prompts.
#[must_use]
pub fn build_summary_prompt(
    channel: &ChannelHandle,
    channel_link: &str,
    posts: &[Post],
) -> String {
    let joined = posts
        .iter()
        .enumerate()
        .map(|(i, post)| {
            format!(
                "POST #{} ({}):\n{}",
                i + 1,
                post.permalink.as_deref().unwrap_or("no-link"),
                post.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are writing a digest of a Telegram channel.\n\
         Channel: {channel}\n\
         Link: {channel_link}\n\n\
         Summarize the recent posts.\n\
         Requirements:\n\
         - 4-8 bullet points, short and to the point\n\
         - No filler, no repetition\n\
         - Numbers, facts, announcements, and deadlines must be mentioned\n\n\
         Posts:\n{joined}\n"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn posts() -> (ChannelHandle, Vec<Post>) {
        let channel = ChannelHandle::new("durov").unwrap();
        let posts = (1..=2)
            .map(|i| Post {
                channel: channel.clone(),
                msg_id: i,
                date: Utc::now(),
                text: format!("post number {i}"),
                permalink: (i == 1).then(|| channel.permalink(i)),
            })
            .collect();
        (channel, posts)
    }

    #[test]
    fn embeds_channel_and_posts() {
        let (channel, posts) = posts();
        let prompt = build_summary_prompt(&channel, "https://t.me/durov", &posts);
        assert!(prompt.contains("Channel: durov"));
        assert!(prompt.contains("Link: https://t.me/durov"));
        assert!(prompt.contains("POST #1 (https://t.me/durov/1):\npost number 1"));
        assert!(prompt.contains("POST #2 (no-link):\npost number 2"));
    }

    #[test]
    fn is_deterministic() {
        let (channel, posts) = posts();
        let a = build_summary_prompt(&channel, "https://t.me/durov", &posts);
        let b = build_summary_prompt(&channel, "https://t.me/durov", &posts);
        assert_eq!(a, b);
    }
}
