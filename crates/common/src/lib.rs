//! Shared domain types and error definitions used across all newsroll crates.

pub mod error;
pub mod types;

pub use {
    error::{Error, Result},
    types::{ChannelHandle, ChannelSummary, Digest, Post},
};
