//! Use cases wiring the parsing, storage, extraction, summarization, and
//! digest-rendering layers together.
//!
//! Dependencies (fetcher, summarizer, repository) are passed in explicitly;
//! nothing here holds global state.

pub mod add_channels;
pub mod digest;

pub use {
    add_channels::{AddChannelsOutcome, add_channels},
    digest::{DigestLimits, DigestOutcome, run_digest},
};
