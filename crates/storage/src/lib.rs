//! SQLite-backed persistence for users, channels, and posts.
//!
//! One repository type wraps the pool; every operation maps driver errors
//! into the domain storage error. Post upserts are idempotent on
//! `(channel, msg_id)`.

pub mod repo;
pub mod schema;

pub use {repo::ChannelRepo, schema::migrate};
