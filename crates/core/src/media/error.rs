//! Media error types.

use thiserror::Error;

/// Media operation errors.
#[derive(Debug, Error)]
pub enum MediaError {
    /// No image file was attached where one is required.
    #[error("an image file is required")]
    MissingImage,

    /// File extension not in the allow-list.
    #[error("file extension '{extension}' is not allowed")]
    UnsupportedExtension {
        /// The rejected extension (or filename when it has none).
        extension: String,
    },

    /// Upload size exceeds the configured maximum.
    #[error("file size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge {
        /// Actual upload size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Object not found in storage.
    #[error("object not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage provider configuration error.
    #[error("media configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl MediaError {
    /// Create an unsupported extension error.
    #[must_use]
    pub fn unsupported_extension(extension: impl Into<String>) -> Self {
        Self::UnsupportedExtension {
            extension: extension.into(),
        }
    }

    /// Create a file too large error.
    #[must_use]
    pub fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Translate a store error for an operation on a known key.
    #[must_use]
    pub fn from_store(key: &str, err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: key.to_string(),
            },
            _ => Self::Operation(err.to_string()),
        }
    }

    /// True when the error is the caller's fault (bad or missing upload).
    #[must_use]
    pub const fn is_invalid_media(&self) -> bool {
        matches!(
            self,
            Self::MissingImage | Self::UnsupportedExtension { .. } | Self::FileTooLarge { .. }
        )
    }
}
