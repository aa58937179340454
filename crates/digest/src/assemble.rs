use {
    chrono::{DateTime, Utc},
    newsroll_common::{ChannelSummary, Digest},
};

use crate::format::format_channel_block;

/// Canonical separator between digest channel blocks.
///
/// Shared contract with [`crate::chunk`]: it is the only boundary the
/// splitter cuts on preferentially.
pub const BLOCK_DELIMITER: &str = "\n\n----------\n\n";

/// Assemble channel summaries into a digest.
///
/// Formats every summary, drops blocks that are empty after trimming, and
/// joins the rest with [`BLOCK_DELIMITER`]. The returned digest carries both
/// the original summaries and the joined raw text.
#[must_use]
pub fn assemble_digest(
    user_id: i64,
    summaries: Vec<ChannelSummary>,
    created_at: DateTime<Utc>,
    include_links: bool,
) -> Digest {
    let raw_text = summaries
        .iter()
        .map(|summary| format_channel_block(summary, include_links))
        .filter(|block| !block.trim().is_empty())
        .collect::<Vec<_>>()
        .join(BLOCK_DELIMITER);

    Digest {
        user_id,
        created_at,
        summaries,
        raw_text,
    }
}
