use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    std::path::PathBuf,
};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewsrollConfig {
    pub telegram: TelegramConfig,
    pub ai: AiConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
}

/// Telegram bot credentials.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub token: Secret<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Summarization backend (any OpenAI-compatible endpoint).
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub base_url: String,
    pub api_key: Secret<String>,
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_owned(),
            api_key: Secret::new(String::new()),
            model: "gpt-4o-mini".to_owned(),
        }
    }
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Database location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("newsroll.db"),
        }
    }
}

/// Operational limits for parsing, storage, and digest generation.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Handles accepted from one `/add` payload.
    pub max_add_per_call: usize,
    /// Total channels one user may store.
    pub max_channels_per_user: usize,
    /// Channels processed in one `/digest` run.
    pub max_channels_per_digest: usize,
    /// Posts fetched per channel.
    pub posts_per_channel: usize,
    /// Per-post text budget after cleaning.
    pub max_chars_per_post: usize,
    /// Transport limit for one outbound message.
    pub message_max_len: usize,
    /// Whether digests carry per-post source links.
    pub include_post_links: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_add_per_call: 50,
            max_channels_per_user: 200,
            max_channels_per_digest: 50,
            posts_per_channel: 5,
            max_chars_per_post: 1500,
            message_max_len: 3500,
            include_post_links: true,
        }
    }
}

impl NewsrollConfig {
    /// Check that required secrets are present and limits are sane.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.telegram.token.expose_secret().is_empty() {
            anyhow::bail!("telegram.token is not set (file or NEWSROLL_BOT_TOKEN)");
        }
        if self.ai.api_key.expose_secret().is_empty() {
            anyhow::bail!("ai.api_key is not set (file or NEWSROLL_AI_API_KEY)");
        }
        if self.limits.message_max_len == 0 {
            anyhow::bail!("limits.message_max_len must be positive");
        }
        if self.limits.posts_per_channel == 0 {
            anyhow::bail!("limits.posts_per_channel must be positive");
        }
        Ok(())
    }
}
