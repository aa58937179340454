//! Post extraction.
//!
//! Defines the [`PostFetcher`] trait consumed by the digest orchestrator and
//! an implementation that reads a channel's public preview page
//! (`https://t.me/s/<handle>`), which exposes the most recent posts without
//! MTProto credentials.

pub mod preview;

use {
    async_trait::async_trait,
    newsroll_common::{ChannelHandle, Post, Result},
};

pub use preview::PreviewFetcher;

/// Fetches the most recent posts of one channel.
///
/// Implementations return posts in chronological ascending order, at most
/// `limit` of them, and report integration problems (network errors, rate
/// limits, unresolvable channels) as extraction failures.
#[async_trait]
pub trait PostFetcher: Send + Sync {
    async fn fetch_recent(&self, channel: &ChannelHandle, limit: usize) -> Result<Vec<Post>>;
}
