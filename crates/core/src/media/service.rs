//! Media service implementation using Apache OpenDAL.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use opendal::{ErrorKind, Operator, services};

use super::config::{MediaConfig, MediaProvider};
use super::error::MediaError;

/// An image file received from a client.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Original filename as declared by the client.
    pub filename: String,
    /// Raw file bytes.
    pub data: Bytes,
}

impl UploadedImage {
    /// Create an uploaded image from a filename and bytes.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// The result of storing an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Publicly fetchable URL for the image.
    pub url: String,
    /// Storage key; the only handle that can delete this object.
    pub key: String,
}

/// Media service for post images.
pub struct MediaService {
    operator: Operator,
    config: MediaConfig,
}

impl MediaService {
    /// Create a new media service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: MediaConfig) -> Result<Self, MediaError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &MediaProvider) -> Result<Operator, MediaError> {
        match provider {
            MediaProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| MediaError::configuration(e.to_string()))?
                    .finish())
            }
            MediaProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| MediaError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| MediaError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Validate an upload against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if the size or file extension is invalid.
    pub fn validate(&self, image: &UploadedImage) -> Result<(), MediaError> {
        let size = image.data.len() as u64;
        if size > self.config.max_upload_bytes {
            return Err(MediaError::file_too_large(size, self.config.max_upload_bytes));
        }

        let extension = file_extension(&image.filename)?;
        if !self.config.is_extension_allowed(&extension) {
            return Err(MediaError::unsupported_extension(extension));
        }

        Ok(())
    }

    /// Derive the storage key for an upload.
    ///
    /// Format: `{folder}/{upload_millis}_{sanitized_stem}.{ext}`. The
    /// timestamp keeps keys collision-free; the sanitized stem keeps
    /// them human-traceable.
    ///
    /// # Errors
    ///
    /// Returns an error if the filename has no extension.
    pub fn storage_key(
        &self,
        filename: &str,
        uploaded_at: DateTime<Utc>,
    ) -> Result<String, MediaError> {
        let extension = file_extension(filename)?;
        let stem = filename
            .rsplit_once('.')
            .map_or(filename, |(stem, _)| stem);

        Ok(format!(
            "{}/{}_{}.{}",
            self.config.folder,
            uploaded_at.timestamp_millis(),
            sanitize_stem(stem),
            extension
        ))
    }

    /// Validate and store an image, returning its public URL and the
    /// key needed to delete it later.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the store write fails.
    pub async fn store(&self, image: &UploadedImage) -> Result<StoredImage, MediaError> {
        self.validate(image)?;

        let key = self.storage_key(&image.filename, Utc::now())?;
        self.operator
            .write(&key, image.data.clone())
            .await
            .map_err(|e| MediaError::from_store(&key, e))?;

        Ok(StoredImage {
            url: self.public_url(&key),
            key,
        })
    }

    /// Delete a stored image by key.
    ///
    /// Idempotent: deleting an object that is already gone succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store itself fails.
    pub async fn delete(&self, key: &str) -> Result<(), MediaError> {
        match self.operator.delete(key).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaError::from_store(key, e)),
        }
    }

    /// Check if an object exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.stat(key).await.is_ok()
    }

    /// Public URL for a storage key.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.config.public_base_url.trim_end_matches('/'), key)
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &MediaConfig {
        &self.config
    }
}

/// Extract the lowercase file extension.
///
/// A filename without an extension cannot be checked against the
/// allow-list and is rejected outright.
fn file_extension(filename: &str) -> Result<String, MediaError> {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            Ok(ext.to_ascii_lowercase())
        }
        _ => Err(MediaError::unsupported_extension(filename)),
    }
}

/// Sanitize a filename stem for use in a storage key.
///
/// Each run of non-alphanumeric characters collapses into a single
/// underscore; leading and trailing runs are dropped.
fn sanitize_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut pending_gap = false;

    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_gap && !out.is_empty() {
                out.push('_');
            }
            pending_gap = false;
            out.push(c);
        } else {
            pending_gap = true;
        }
    }

    if out.is_empty() {
        "image".to_string()
    } else {
        out
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Property: sanitized stems only contain alphanumerics and single
    // underscores between runs.
    proptest! {
        #[test]
        fn prop_sanitized_stem_safe_chars(stem in ".*") {
            let sanitized = sanitize_stem(&stem);

            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized stem: {}", c);
            }
            prop_assert!(!sanitized.contains("__"));
            prop_assert!(!sanitized.is_empty());
        }
    }

    // Property: storage keys always live under the configured folder and
    // keep the (lowercased) original extension.
    proptest! {
        #[test]
        fn prop_storage_key_format(
            stem in "[a-zA-Z0-9 _-]{1,40}",
            ext in "(jpg|JPEG|png)",
        ) {
            let root = std::env::temp_dir().join("scribe-media-prop");
            let config = MediaConfig::new(
                MediaProvider::local_fs(root),
                "http://localhost/media",
            );
            let service = MediaService::from_config(config).unwrap();

            let key = service
                .storage_key(&format!("{stem}.{ext}"), Utc::now())
                .unwrap();

            let parts: Vec<&str> = key.split('/').collect();
            prop_assert_eq!(parts.len(), 2);
            prop_assert_eq!(parts[0], "blog_images");
            prop_assert!(
                key.ends_with(&format!(".{}", ext.to_ascii_lowercase())),
                "key does not end with lowercased extension: {}",
                key
            );
        }
    }

    // Property: the extension allow-list accepts exactly jpg/jpeg/png.
    proptest! {
        #[test]
        fn prop_extension_allow_list(ext in "[a-z0-9]{1,5}") {
            let root = std::env::temp_dir().join("scribe-media-prop");
            let config = MediaConfig::new(
                MediaProvider::local_fs(root),
                "http://localhost/media",
            );
            let service = MediaService::from_config(config).unwrap();

            let image = UploadedImage::new(format!("file.{ext}"), vec![0u8; 4]);
            let result = service.validate(&image);

            if matches!(ext.as_str(), "jpg" | "jpeg" | "png") {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(
                    matches!(result, Err(MediaError::UnsupportedExtension { .. })),
                    "expected UnsupportedExtension error, got: {:?}",
                    result
                );
            }
        }
    }
}
