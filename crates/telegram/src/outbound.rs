use std::time::Duration;

use {
    teloxide::{RequestError, prelude::*, types::ChatId},
    tracing::warn,
};

const RETRY_AFTER_MAX_RETRIES: usize = 4;

/// Send ordered chunks to one chat, stopping on the first hard failure.
pub async fn send_chunks(
    bot: &Bot,
    chat_id: ChatId,
    chunks: &[String],
) -> Result<(), RequestError> {
    for chunk in chunks {
        send_with_retry(bot, chat_id, chunk).await?;
    }
    Ok(())
}

/// Send one message, waiting out Telegram rate limits a bounded number of
/// times before giving up.
pub async fn send_with_retry(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
) -> Result<(), RequestError> {
    let mut retries = 0usize;

    loop {
        match bot.send_message(chat_id, text).await {
            Ok(_) => return Ok(()),
            Err(err) => {
                let Some(wait) = retry_after_duration(&err) else {
                    return Err(err);
                };

                if retries >= RETRY_AFTER_MAX_RETRIES {
                    warn!(
                        chat_id = chat_id.0,
                        retries,
                        retry_after_secs = wait.as_secs(),
                        "telegram rate limit persisted after retries"
                    );
                    return Err(err);
                }

                retries += 1;
                warn!(
                    chat_id = chat_id.0,
                    retries,
                    retry_after_secs = wait.as_secs(),
                    "telegram rate limited, waiting before retry"
                );
                tokio::time::sleep(wait).await;
            },
        }
    }
}

fn retry_after_duration(error: &RequestError) -> Option<Duration> {
    match error {
        RequestError::RetryAfter(wait) => Some(wait.duration()),
        _ => None,
    }
}
