use std::{sync::Arc, time::Duration};

use {
    clap::Parser,
    secrecy::ExposeSecret,
    sqlx::sqlite::{SqliteConnectOptions, SqlitePool},
    teloxide::Bot,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    newsroll_config::{NewsrollConfig, apply_env_overrides, discover_and_load, load_config},
    newsroll_extractor::PreviewFetcher,
    newsroll_storage::ChannelRepo,
    newsroll_summarizer::OpenAiSummarizer,
    newsroll_telegram::{BotContext, start_polling},
};

#[derive(Parser)]
#[command(name = "newsroll", about = "Telegram channel digest bot")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Explicit config file path (overrides discovery).
    #[arg(long, env = "NEWSROLL_CONFIG")]
    config: Option<std::path::PathBuf>,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_configuration(cli: &Cli) -> anyhow::Result<NewsrollConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => discover_and_load(),
    };
    apply_env_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_telemetry(&cli);

    let config = load_configuration(&cli)?;

    let options = SqliteConnectOptions::new()
        .filename(&config.storage.database_path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;
    newsroll_storage::migrate(&pool).await?;
    let repo = ChannelRepo::new(pool);
    info!(path = %config.storage.database_path.display(), "database ready");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let fetcher = Arc::new(PreviewFetcher::new(http.clone()));
    let summarizer = Arc::new(OpenAiSummarizer::new(
        http,
        config.ai.base_url.clone(),
        config.ai.api_key.clone(),
        config.ai.model.clone(),
    ));

    let bot = Bot::new(config.telegram.token.expose_secret().clone());
    let ctx = Arc::new(BotContext::new(repo, fetcher, summarizer, config.limits));

    let cancel = start_polling(bot, ctx).await?;
    info!("newsroll running, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    cancel.cancel();

    Ok(())
}
