//! Telegram bot surface for newsroll.
//!
//! Implements the command handlers (`/start`, `/add`, `/list`, `/remove`,
//! `/digest`) over a manual long-polling loop, and chunk-aware outbound
//! sending with rate-limit retries.

pub mod bot;
pub mod handlers;
pub mod outbound;
pub mod state;

pub use {bot::start_polling, state::BotContext};
