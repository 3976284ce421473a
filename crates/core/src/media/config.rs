//! Media storage configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl MediaProvider {
    /// Create S3-compatible provider (Cloudflare R2, Supabase, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }
}

/// Media service configuration.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Storage provider configuration.
    pub provider: MediaProvider,
    /// Base URL readers fetch stored images from.
    pub public_base_url: String,
    /// Key prefix images are stored under.
    pub folder: String,
    /// Maximum upload size in bytes.
    pub max_upload_bytes: u64,
    /// Allowed file extensions (lowercase, without the dot).
    pub allowed_extensions: Vec<String>,
}

impl MediaConfig {
    /// Default max upload size: 10MB.
    pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
    /// Default storage folder.
    pub const DEFAULT_FOLDER: &'static str = "blog_images";

    /// Create a new media config with default settings.
    #[must_use]
    pub fn new(provider: MediaProvider, public_base_url: impl Into<String>) -> Self {
        Self {
            provider,
            public_base_url: public_base_url.into(),
            folder: Self::DEFAULT_FOLDER.to_string(),
            max_upload_bytes: Self::DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: Self::default_extensions(),
        }
    }

    /// Set the storage folder.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Set maximum upload size.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, size: u64) -> Self {
        self.max_upload_bytes = size;
        self
    }

    /// Default allowed extensions for post images.
    #[must_use]
    pub fn default_extensions() -> Vec<String> {
        vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()]
    }

    /// Check if a file extension is allowed.
    #[must_use]
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}
