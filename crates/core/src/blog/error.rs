//! Blog error types.

use thiserror::Error;
use uuid::Uuid;

use crate::media::MediaError;

/// Blog operation errors.
#[derive(Debug, Error)]
pub enum BlogError {
    /// Post not found.
    #[error("post not found: {0}")]
    NotFound(Uuid),

    /// The calling principal is not the post's author.
    #[error("principal is not the author of this post")]
    Forbidden,

    /// Media validation or storage failed.
    #[error("media error: {0}")]
    Media(#[from] MediaError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl BlogError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}
