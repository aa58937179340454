//! Channel summarization.
//!
//! Defines the [`Summarizer`] trait consumed by the digest orchestrator and
//! an OpenAI-compatible chat-completions client implementation.

pub mod openai;
pub mod prompt;

use {
    async_trait::async_trait,
    newsroll_common::{ChannelHandle, Post, Result},
};

pub use openai::OpenAiSummarizer;

/// Generates a digest summary for one channel's posts.
///
/// Implementations require a non-empty post list and return non-empty text;
/// an empty generated result is a summarization failure, not success.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        channel: &ChannelHandle,
        channel_link: &str,
        posts: &[Post],
    ) -> Result<String>;
}
