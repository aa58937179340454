use {
    teloxide::{
        prelude::*,
        types::{ChatId, Message},
    },
    tracing::{debug, error},
};

use newsroll_services::{AddChannelsOutcome, DigestLimits, add_channels, run_digest};

use crate::{outbound, state::BotContext};

/// Handle one inbound message: route commands, feed pending `/add` input.
pub async fn handle_message(bot: &Bot, ctx: &BotContext, msg: &Message) -> anyhow::Result<()> {
    let Some(text) = msg.text() else {
        debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let tg_user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    match parse_command(text) {
        Some(("/start", _)) => {
            outbound::send_with_retry(
                bot,
                chat_id,
                "Hi! Add channels with /add, then run /digest for a summary.",
            )
            .await?;
        },
        Some(("/add", args)) => handle_add(bot, ctx, chat_id, tg_user_id, args).await?,
        Some(("/list", _)) => handle_list(bot, ctx, chat_id, tg_user_id).await?,
        Some(("/remove", args)) => handle_remove(bot, ctx, chat_id, tg_user_id, args).await?,
        Some(("/digest", _)) => handle_digest(bot, ctx, chat_id, tg_user_id).await?,
        Some((other, _)) => {
            debug!(command = other, "ignoring unknown command");
        },
        None if ctx.is_pending_add(tg_user_id) => {
            handle_add_payload(bot, ctx, chat_id, tg_user_id, text).await?;
        },
        None => {
            debug!(chat_id = chat_id.0, "ignoring non-command message");
        },
    }

    Ok(())
}

/// Split `"/add@botname foo bar"` into `("/add", "foo bar")`.
fn parse_command(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    let (head, args) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    let command = head.split('@').next().unwrap_or(head);
    Some((command, args.trim()))
}

async fn handle_add(
    bot: &Bot,
    ctx: &BotContext,
    chat_id: ChatId,
    tg_user_id: i64,
    args: &str,
) -> anyhow::Result<()> {
    if args.is_empty() {
        ctx.set_pending_add(tg_user_id);
        outbound::send_with_retry(
            bot,
            chat_id,
            "Send the channel list in one message.\n\
             Examples:\n\
             • @channel1 @channel2\n\
             • https://t.me/channel1 https://t.me/channel2",
        )
        .await?;
        return Ok(());
    }

    run_add(bot, ctx, chat_id, tg_user_id, args).await
}

async fn handle_add_payload(
    bot: &Bot,
    ctx: &BotContext,
    chat_id: ChatId,
    tg_user_id: i64,
    text: &str,
) -> anyhow::Result<()> {
    let payload = text.trim();
    if payload.is_empty() {
        outbound::send_with_retry(
            bot,
            chat_id,
            "Empty message. Example: @channel1 https://t.me/channel2",
        )
        .await?;
        return Ok(());
    }
    run_add(bot, ctx, chat_id, tg_user_id, payload).await
}

async fn run_add(
    bot: &Bot,
    ctx: &BotContext,
    chat_id: ChatId,
    tg_user_id: i64,
    payload: &str,
) -> anyhow::Result<()> {
    match add_channels(
        &ctx.repo,
        tg_user_id,
        payload,
        ctx.limits.max_add_per_call,
        ctx.limits.max_channels_per_user,
    )
    .await
    {
        Ok(outcome) => {
            if outcome.had_valid_handles() {
                ctx.clear_pending_add(tg_user_id);
            }
            outbound::send_with_retry(bot, chat_id, &format_add_response(&outcome)).await?;
        },
        Err(e) => {
            error!(tg_user_id, error = %e, "failed to process /add");
            outbound::send_with_retry(bot, chat_id, "Could not add channels. Try again later.")
                .await?;
        },
    }
    Ok(())
}

/// Render grouped `/add` results into one reply.
fn format_add_response(outcome: &AddChannelsOutcome) -> String {
    let mut lines: Vec<String> = Vec::new();

    if !outcome.added.is_empty() {
        lines.push(format!("✅ Added ({}):", outcome.added.len()));
        lines.extend(outcome.added.iter().map(|h| format!("• {}", h.link())));
        lines.push(String::new());
    }

    if !outcome.already_present.is_empty() {
        lines.push(format!(
            "⚠️ Already present ({}):",
            outcome.already_present.len()
        ));
        lines.extend(
            outcome
                .already_present
                .iter()
                .map(|h| format!("• {}", h.link())),
        );
        lines.push(String::new());
    }

    if !outcome.rejected_over_limit.is_empty() {
        lines.push(format!(
            "⛔ Channel limit reached, not added ({}):",
            outcome.rejected_over_limit.len()
        ));
        lines.extend(
            outcome
                .rejected_over_limit
                .iter()
                .map(|h| format!("• {}", h.link())),
        );
        lines.push(String::new());
    }

    if !outcome.truncated_tokens.is_empty() {
        lines.push(format!(
            "… Skipped over the per-call limit ({}):",
            outcome.truncated_tokens.len()
        ));
        lines.extend(outcome.truncated_tokens.iter().map(|t| format!("• {t}")));
        lines.push(String::new());
    }

    if !outcome.invalid_tokens.is_empty() {
        lines.push(format!(
            "❌ Not recognized ({}):",
            outcome.invalid_tokens.len()
        ));
        lines.extend(outcome.invalid_tokens.iter().map(|t| format!("• {t}")));
        lines.push(String::new());
    }

    if lines.is_empty() {
        return "Nothing to add. Example: /add @channel1 https://t.me/channel2".to_owned();
    }

    lines.join("\n").trim().to_owned()
}

async fn handle_list(
    bot: &Bot,
    ctx: &BotContext,
    chat_id: ChatId,
    tg_user_id: i64,
) -> anyhow::Result<()> {
    match ctx.repo.list_channels_for_user(tg_user_id).await {
        Ok(channels) if channels.is_empty() => {
            outbound::send_with_retry(
                bot,
                chat_id,
                "Your channel list is empty. Add channels with /add.",
            )
            .await?;
        },
        Ok(channels) => {
            let mut lines = vec!["Your channels:".to_owned()];
            lines.extend(channels.iter().map(|h| format!("• {}", h.link())));
            outbound::send_with_retry(bot, chat_id, &lines.join("\n")).await?;
        },
        Err(e) => {
            error!(tg_user_id, error = %e, "failed to list channels");
            outbound::send_with_retry(bot, chat_id, "Could not load your channel list.").await?;
        },
    }
    Ok(())
}

async fn handle_remove(
    bot: &Bot,
    ctx: &BotContext,
    chat_id: ChatId,
    tg_user_id: i64,
    args: &str,
) -> anyhow::Result<()> {
    if args.is_empty() {
        outbound::send_with_retry(bot, chat_id, "Usage: /remove @channel").await?;
        return Ok(());
    }

    let parsed = newsroll_parsing::parse_channels(args, 1);
    let Some(handle) = parsed.valid.first() else {
        outbound::send_with_retry(
            bot,
            chat_id,
            "Could not recognize that channel. Usage: /remove @channel",
        )
        .await?;
        return Ok(());
    };

    match ctx.repo.remove_channel_for_user(tg_user_id, handle).await {
        Ok(true) => {
            outbound::send_with_retry(bot, chat_id, &format!("Removed: {}", handle.link()))
                .await?;
        },
        Ok(false) => {
            outbound::send_with_retry(
                bot,
                chat_id,
                &format!("Not in your list: {}", handle.link()),
            )
            .await?;
        },
        Err(e) => {
            error!(tg_user_id, error = %e, "failed to remove channel");
            outbound::send_with_retry(bot, chat_id, "Could not remove the channel.").await?;
        },
    }
    Ok(())
}

async fn handle_digest(
    bot: &Bot,
    ctx: &BotContext,
    chat_id: ChatId,
    tg_user_id: i64,
) -> anyhow::Result<()> {
    outbound::send_with_retry(bot, chat_id, "Collecting posts and building your digest…").await?;

    let handles = match ctx.repo.list_channels_for_user(tg_user_id).await {
        Ok(handles) => handles,
        Err(e) => {
            error!(tg_user_id, error = %e, "failed to load channels for digest");
            outbound::send_with_retry(bot, chat_id, "Could not build the digest. Try again later.")
                .await?;
            return Ok(());
        },
    };

    let limits = DigestLimits {
        posts_per_channel: ctx.limits.posts_per_channel,
        max_channels_per_call: ctx.limits.max_channels_per_digest,
        max_chars_per_post: ctx.limits.max_chars_per_post,
        message_max_len: ctx.limits.message_max_len,
        include_post_links: ctx.limits.include_post_links,
    };

    let outcome = run_digest(
        ctx.fetcher.as_ref(),
        ctx.summarizer.as_ref(),
        &ctx.repo,
        tg_user_id,
        handles,
        limits,
    )
    .await;

    outbound::send_chunks(bot, chat_id, &outcome.chunks).await?;
    Ok(())
}
