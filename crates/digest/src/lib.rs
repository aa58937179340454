//! Digest rendering pipeline.
//!
//! Takes per-channel summaries through text hygiene, block formatting,
//! digest assembly, and transport-safe chunking. The block delimiter defined
//! in [`assemble`] is the shared contract between assembly and chunking.

pub mod assemble;
pub mod chunk;
pub mod format;
pub mod posts;
pub mod text;

pub use {
    assemble::{BLOCK_DELIMITER, assemble_digest},
    chunk::split_for_transport,
    format::format_channel_block,
    posts::transform_posts,
    text::{clean, truncate},
};
