//! Configuration loading.
//!
//! Config file: `newsroll.toml`, searched in `./` then the user config dir.
//! Secrets (bot token, AI key) may instead come from environment variables,
//! which override file values.

pub mod loader;
pub mod schema;

pub use {
    loader::{apply_env_overrides, discover_and_load, load_config},
    schema::{AiConfig, LimitsConfig, NewsrollConfig, StorageConfig, TelegramConfig},
};
