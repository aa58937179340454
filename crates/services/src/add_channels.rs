use {
    newsroll_common::{ChannelHandle, Result},
    newsroll_parsing::parse_channels,
    newsroll_storage::ChannelRepo,
};

/// Grouped outcome of one `/add` invocation, ready for rendering.
#[derive(Debug, Clone, Default)]
pub struct AddChannelsOutcome {
    pub added: Vec<ChannelHandle>,
    pub already_present: Vec<ChannelHandle>,
    pub invalid_tokens: Vec<String>,
    pub rejected_over_limit: Vec<ChannelHandle>,
    pub truncated_tokens: Vec<String>,
}

impl AddChannelsOutcome {
    /// Whether the payload contained at least one valid handle.
    #[must_use]
    pub fn had_valid_handles(&self) -> bool {
        !self.added.is_empty()
            || !self.already_present.is_empty()
            || !self.rejected_over_limit.is_empty()
    }
}

/// Parse an `/add` payload and persist the accepted handles.
///
/// `max_add_per_call` caps how many handles one payload may accept;
/// `max_per_user` caps the user's total stored channels. The two limits are
/// independent and applied at different stages.
pub async fn add_channels(
    repo: &ChannelRepo,
    tg_user_id: i64,
    raw_text: &str,
    max_add_per_call: usize,
    max_per_user: usize,
) -> Result<AddChannelsOutcome> {
    let parsed = parse_channels(raw_text, max_add_per_call);

    let (added, already_present, rejected_over_limit) = if parsed.valid.is_empty() {
        (Vec::new(), Vec::new(), Vec::new())
    } else {
        repo.add_channels_for_user(tg_user_id, &parsed.valid, max_per_user)
            .await?
    };

    Ok(AddChannelsOutcome {
        added,
        already_present,
        invalid_tokens: parsed.invalid,
        rejected_over_limit,
        truncated_tokens: parsed.truncated,
    })
}
