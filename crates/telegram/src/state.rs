use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use {
    newsroll_config::LimitsConfig, newsroll_extractor::PostFetcher, newsroll_storage::ChannelRepo,
    newsroll_summarizer::Summarizer,
};

/// Shared dependencies and conversational state for the bot handlers.
pub struct BotContext {
    pub repo: ChannelRepo,
    pub fetcher: Arc<dyn PostFetcher>,
    pub summarizer: Arc<dyn Summarizer>,
    pub limits: LimitsConfig,
    /// Users who sent `/add` without arguments and owe us a channel list.
    pending_add: Mutex<HashSet<i64>>,
}

impl BotContext {
    pub fn new(
        repo: ChannelRepo,
        fetcher: Arc<dyn PostFetcher>,
        summarizer: Arc<dyn Summarizer>,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            repo,
            fetcher,
            summarizer,
            limits,
            pending_add: Mutex::new(HashSet::new()),
        }
    }

    pub fn set_pending_add(&self, tg_user_id: i64) {
        let mut pending = self.pending_add.lock().unwrap_or_else(|e| e.into_inner());
        pending.insert(tg_user_id);
    }

    pub fn clear_pending_add(&self, tg_user_id: i64) {
        let mut pending = self.pending_add.lock().unwrap_or_else(|e| e.into_inner());
        pending.remove(&tg_user_id);
    }

    pub fn is_pending_add(&self, tg_user_id: i64) -> bool {
        let pending = self.pending_add.lock().unwrap_or_else(|e| e.into_inner());
        pending.contains(&tg_user_id)
    }
}
