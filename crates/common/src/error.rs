use std::error::Error as StdError;

/// Crate-wide result type for digest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed failures shared across the digest pipeline.
///
/// Extraction and summarization failures are isolated per channel by the
/// orchestrator and surface as placeholder text inside the digest; validation
/// and storage failures propagate to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller violated an input contract.
    #[error("invalid input: {message}")]
    Validation { message: String },

    /// Persistence operation failed.
    #[error("storage: {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Fetching posts from a channel failed.
    #[error("{message}")]
    Extract { message: String },

    /// Generating a channel summary failed.
    #[error("{message}")]
    Summarize { message: String },
}

impl Error {
    #[must_use]
    pub fn validation(message: impl std::fmt::Display) -> Self {
        Self::Validation {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn storage(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn extract(message: impl std::fmt::Display) -> Self {
        Self::Extract {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn summarize(message: impl std::fmt::Display) -> Self {
        Self::Summarize {
            message: message.to_string(),
        }
    }
}
