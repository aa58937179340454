use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::schema::NewsrollConfig;

const CONFIG_FILENAME: &str = "newsroll.toml";

/// Load config from an explicit path.
pub fn load_config(path: &Path) -> anyhow::Result<NewsrollConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    Ok(toml::from_str(&raw)?)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./newsroll.toml` (project-local)
/// 2. `~/.config/newsroll/newsroll.toml` (user-global)
///
/// Returns defaults if no config file is found; secrets are then expected
/// from the environment.
pub fn discover_and_load() -> NewsrollConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    NewsrollConfig::default()
}

/// Overlay environment variables onto a loaded config.
///
/// `NEWSROLL_BOT_TOKEN`, `NEWSROLL_AI_API_KEY`, `NEWSROLL_AI_BASE_URL`,
/// `NEWSROLL_AI_MODEL`, and `NEWSROLL_DB_PATH` each override the
/// corresponding file value when set and non-empty.
pub fn apply_env_overrides(config: &mut NewsrollConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

fn apply_overrides(config: &mut NewsrollConfig, get: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| get(name).filter(|v| !v.is_empty());

    if let Some(token) = non_empty("NEWSROLL_BOT_TOKEN") {
        config.telegram.token = Secret::new(token);
    }
    if let Some(key) = non_empty("NEWSROLL_AI_API_KEY") {
        config.ai.api_key = Secret::new(key);
    }
    if let Some(base_url) = non_empty("NEWSROLL_AI_BASE_URL") {
        config.ai.base_url = base_url;
    }
    if let Some(model) = non_empty("NEWSROLL_AI_MODEL") {
        config.ai.model = model;
    }
    if let Some(path) = non_empty("NEWSROLL_DB_PATH") {
        config.storage.database_path = PathBuf::from(path);
    }
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "newsroll") {
        let global = dirs.config_dir().join(CONFIG_FILENAME);
        if global.exists() {
            return Some(global);
        }
    }

    None
}
