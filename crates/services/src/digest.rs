use {
    chrono::Utc,
    futures::future::join_all,
    newsroll_common::{ChannelHandle, ChannelSummary, Digest, Error},
    newsroll_digest::{assemble_digest, split_for_transport, transform_posts},
    newsroll_extractor::PostFetcher,
    newsroll_storage::ChannelRepo,
    newsroll_summarizer::Summarizer,
    tracing::{info, warn},
};

/// Limits applied to one digest run. Sourced from configuration.
#[derive(Debug, Clone, Copy)]
pub struct DigestLimits {
    pub posts_per_channel: usize,
    pub max_channels_per_call: usize,
    pub max_chars_per_post: usize,
    pub message_max_len: usize,
    pub include_post_links: bool,
}

/// Result of one digest run.
#[derive(Debug, Clone)]
pub struct DigestOutcome {
    pub digest: Digest,
    pub chunks: Vec<String>,
    pub warning: Option<String>,
}

const EMPTY_LIST_HINT: &str = "Add channels with /add first, then run /digest.";
const NO_TEXT_POSTS: &str = "No text posts among the recent messages.";
const MIN_CHARS_PER_POST: usize = 1;

/// Run the digest pipeline for one user's channel list.
///
/// Channels are processed as an order-preserving concurrent map; each
/// channel's failure is converted into a placeholder summary in place and
/// never aborts the batch. When the list exceeds the per-call cap, only the
/// leading channels are processed and a warning chunk is prepended.
pub async fn run_digest(
    fetcher: &dyn PostFetcher,
    summarizer: &dyn Summarizer,
    repo: &ChannelRepo,
    tg_user_id: i64,
    handles: Vec<ChannelHandle>,
    limits: DigestLimits,
) -> DigestOutcome {
    let total = handles.len();
    if total == 0 {
        let digest = assemble_digest(tg_user_id, Vec::new(), Utc::now(), limits.include_post_links);
        return DigestOutcome {
            digest,
            chunks: vec![EMPTY_LIST_HINT.to_owned()],
            warning: None,
        };
    }

    let mut warning = None;
    let working: Vec<ChannelHandle> = if total > limits.max_channels_per_call {
        warning = Some(format!(
            "Processed the first {} channels of {} to stay within limits.",
            limits.max_channels_per_call, total
        ));
        handles
            .into_iter()
            .take(limits.max_channels_per_call)
            .collect()
    } else {
        handles
    };

    info!(
        tg_user_id,
        channels = working.len(),
        capped = warning.is_some(),
        "digest run started"
    );

    // Concurrent per-channel map; join_all keeps the input order regardless
    // of completion order.
    let summaries: Vec<ChannelSummary> = join_all(
        working
            .iter()
            .map(|handle| summarize_channel(fetcher, summarizer, repo, handle, limits)),
    )
    .await;

    let digest = assemble_digest(tg_user_id, summaries, Utc::now(), limits.include_post_links);
    let mut chunks = split_for_transport(&digest.raw_text, limits.message_max_len);
    if let Some(ref text) = warning {
        chunks.insert(0, text.clone());
    }

    info!(tg_user_id, chunks = chunks.len(), "digest run finished");
    DigestOutcome {
        digest,
        chunks,
        warning,
    }
}

/// Produce one channel's summary; never fails.
///
/// Extraction and summarization failures become placeholder text in the
/// returned summary. A summarization failure keeps the already-fetched post
/// links; an extraction failure has none to keep.
async fn summarize_channel(
    fetcher: &dyn PostFetcher,
    summarizer: &dyn Summarizer,
    repo: &ChannelRepo,
    handle: &ChannelHandle,
    limits: DigestLimits,
) -> ChannelSummary {
    let channel_link = handle.link();

    let posts = match fetcher.fetch_recent(handle, limits.posts_per_channel).await {
        Ok(posts) => posts,
        Err(e) => {
            warn!(channel = %handle, error = %e, "channel extraction failed");
            return ChannelSummary {
                channel: handle.clone(),
                channel_link,
                summary_text: placeholder_text(&e),
                post_links: Vec::new(),
            };
        },
    };

    // Best-effort archive of what was fetched; the digest proceeds either way.
    if let Err(e) = repo.upsert_posts(handle, &posts).await {
        warn!(channel = %handle, error = %e, "failed to persist fetched posts");
    }

    let posts = transform_posts(posts, limits.max_chars_per_post, MIN_CHARS_PER_POST);
    if posts.is_empty() {
        return ChannelSummary {
            channel: handle.clone(),
            channel_link,
            summary_text: NO_TEXT_POSTS.to_owned(),
            post_links: Vec::new(),
        };
    }

    let post_links: Vec<String> = if limits.include_post_links {
        posts.iter().filter_map(|p| p.permalink.clone()).collect()
    } else {
        Vec::new()
    };

    match summarizer.summarize(handle, &channel_link, &posts).await {
        Ok(summary_text) => ChannelSummary {
            channel: handle.clone(),
            channel_link,
            summary_text,
            post_links,
        },
        Err(e) => {
            warn!(channel = %handle, error = %e, "channel summarization failed");
            ChannelSummary {
                channel: handle.clone(),
                channel_link,
                summary_text: placeholder_text(&e),
                post_links,
            }
        },
    }
}

/// Human-readable placeholder substituted for a failed channel.
fn placeholder_text(error: &Error) -> String {
    match error {
        Error::Extract { .. } => format!("Failed to fetch posts: {error}"),
        Error::Summarize { .. } => format!("Summarization failed: {error}"),
        other => format!("Channel processing failed: {other}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use {
        async_trait::async_trait,
        chrono::Utc,
        newsroll_common::{Post, Result},
        std::collections::HashMap,
    };

    use super::*;

    const LIMITS: DigestLimits = DigestLimits {
        posts_per_channel: 5,
        max_channels_per_call: 50,
        max_chars_per_post: 1500,
        message_max_len: 3500,
        include_post_links: true,
    };

    struct StubFetcher {
        posts: HashMap<String, Vec<Post>>,
        failing: Vec<String>,
    }

    impl StubFetcher {
        fn new() -> Self {
            Self {
                posts: HashMap::new(),
                failing: Vec::new(),
            }
        }

        fn with_posts(mut self, handle: &str, texts: &[&str]) -> Self {
            let channel = ChannelHandle::new(handle).unwrap();
            let posts = texts
                .iter()
                .enumerate()
                .map(|(i, text)| Post {
                    channel: channel.clone(),
                    msg_id: i as i64 + 1,
                    date: Utc::now(),
                    text: (*text).to_owned(),
                    permalink: Some(channel.permalink(i as i64 + 1)),
                })
                .collect();
            self.posts.insert(handle.to_owned(), posts);
            self
        }

        fn with_failure(mut self, handle: &str) -> Self {
            self.failing.push(handle.to_owned());
            self
        }
    }

    #[async_trait]
    impl PostFetcher for StubFetcher {
        async fn fetch_recent(
            &self,
            channel: &ChannelHandle,
            _limit: usize,
        ) -> Result<Vec<Post>> {
            if self.failing.contains(&channel.as_str().to_owned()) {
                return Err(Error::extract(format!("{channel}: connection reset")));
            }
            Ok(self.posts.get(channel.as_str()).cloned().unwrap_or_default())
        }
    }

    struct StubSummarizer {
        fail: bool,
    }

    #[async_trait]
    impl Summarizer for StubSummarizer {
        async fn summarize(
            &self,
            channel: &ChannelHandle,
            _channel_link: &str,
            posts: &[Post],
        ) -> Result<String> {
            if self.fail {
                return Err(Error::summarize(format!("{channel}: model unavailable")));
            }
            Ok(format!("summary of {} posts from {channel}", posts.len()))
        }
    }

    async fn test_repo() -> ChannelRepo {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        newsroll_storage::migrate(&pool).await.unwrap();
        ChannelRepo::new(pool)
    }

    fn handle(value: &str) -> ChannelHandle {
        ChannelHandle::new(value).unwrap()
    }

    #[tokio::test]
    async fn empty_channel_list_yields_instructional_chunk() {
        let repo = test_repo().await;
        let fetcher = StubFetcher::new();
        let summarizer = StubSummarizer { fail: false };

        let outcome = run_digest(&fetcher, &summarizer, &repo, 100, Vec::new(), LIMITS).await;
        assert!(outcome.digest.summaries.is_empty());
        assert_eq!(outcome.chunks, [EMPTY_LIST_HINT]);
        assert!(outcome.warning.is_none());
    }

    #[tokio::test]
    async fn one_failing_channel_does_not_abort_the_batch() {
        let repo = test_repo().await;
        let fetcher = StubFetcher::new()
            .with_posts("alpha1", &["news one"])
            .with_failure("bravo1")
            .with_posts("charlie", &["news three"]);
        let summarizer = StubSummarizer { fail: false };

        let outcome = run_digest(
            &fetcher,
            &summarizer,
            &repo,
            100,
            vec![handle("alpha1"), handle("bravo1"), handle("charlie")],
            LIMITS,
        )
        .await;

        let summaries = &outcome.digest.summaries;
        assert_eq!(summaries.len(), 3);
        assert!(summaries[0].summary_text.contains("summary of 1 posts"));
        assert!(summaries[1].summary_text.contains("Failed to fetch posts"));
        assert!(summaries[1].summary_text.contains("connection reset"));
        assert!(summaries[1].post_links.is_empty());
        assert!(summaries[2].summary_text.contains("summary of 1 posts"));
    }

    #[tokio::test]
    async fn summarization_failure_keeps_post_links() {
        let repo = test_repo().await;
        let fetcher = StubFetcher::new().with_posts("alpha1", &["news one"]);
        let summarizer = StubSummarizer { fail: true };

        let outcome = run_digest(
            &fetcher,
            &summarizer,
            &repo,
            100,
            vec![handle("alpha1")],
            LIMITS,
        )
        .await;

        let summary = &outcome.digest.summaries[0];
        assert!(summary.summary_text.contains("Summarization failed"));
        assert!(summary.summary_text.contains("model unavailable"));
        assert_eq!(summary.post_links, ["https://t.me/alpha1/1"]);
    }

    #[tokio::test]
    async fn channel_without_text_posts_gets_placeholder_not_failure() {
        let repo = test_repo().await;
        let fetcher = StubFetcher::new().with_posts("alpha1", &["   ", "\n\t"]);
        let summarizer = StubSummarizer { fail: false };

        let outcome = run_digest(
            &fetcher,
            &summarizer,
            &repo,
            100,
            vec![handle("alpha1")],
            LIMITS,
        )
        .await;

        let summary = &outcome.digest.summaries[0];
        assert_eq!(summary.summary_text, NO_TEXT_POSTS);
        assert!(summary.post_links.is_empty());
    }

    #[tokio::test]
    async fn channel_cap_truncates_and_prepends_warning() {
        let repo = test_repo().await;
        let fetcher = StubFetcher::new()
            .with_posts("alpha1", &["one"])
            .with_posts("alpha2", &["two"])
            .with_posts("alpha3", &["three"]);
        let summarizer = StubSummarizer { fail: false };

        let limits = DigestLimits {
            max_channels_per_call: 2,
            ..LIMITS
        };
        let outcome = run_digest(
            &fetcher,
            &summarizer,
            &repo,
            100,
            vec![handle("alpha1"), handle("alpha2"), handle("alpha3")],
            limits,
        )
        .await;

        assert_eq!(outcome.digest.summaries.len(), 2);
        let warning = outcome.warning.unwrap();
        assert!(warning.contains("first 2 channels of 3"));
        assert_eq!(outcome.chunks[0], warning);
        assert!(outcome.chunks.len() > 1);
    }

    #[tokio::test]
    async fn summaries_keep_input_order() {
        let repo = test_repo().await;
        let fetcher = StubFetcher::new()
            .with_posts("bravo1", &["b"])
            .with_posts("alpha1", &["a"]);
        let summarizer = StubSummarizer { fail: false };

        let outcome = run_digest(
            &fetcher,
            &summarizer,
            &repo,
            100,
            vec![handle("bravo1"), handle("alpha1")],
            LIMITS,
        )
        .await;

        let order: Vec<&str> = outcome
            .digest
            .summaries
            .iter()
            .map(|s| s.channel.as_str())
            .collect();
        assert_eq!(order, ["bravo1", "alpha1"]);
    }

    #[tokio::test]
    async fn fetched_posts_are_archived() {
        let repo = test_repo().await;
        let fetcher = StubFetcher::new().with_posts("alpha1", &["archived text"]);
        let summarizer = StubSummarizer { fail: false };

        run_digest(
            &fetcher,
            &summarizer,
            &repo,
            100,
            vec![handle("alpha1")],
            LIMITS,
        )
        .await;

        let stored = repo.get_last_posts(&handle("alpha1"), 10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "archived text");
    }

    #[tokio::test]
    async fn links_suppressed_when_configured_off() {
        let repo = test_repo().await;
        let fetcher = StubFetcher::new().with_posts("alpha1", &["one"]);
        let summarizer = StubSummarizer { fail: false };

        let limits = DigestLimits {
            include_post_links: false,
            ..LIMITS
        };
        let outcome = run_digest(
            &fetcher,
            &summarizer,
            &repo,
            100,
            vec![handle("alpha1")],
            limits,
        )
        .await;
        assert!(outcome.digest.summaries[0].post_links.is_empty());
    }
}
