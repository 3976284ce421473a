//! Media service for blog post images using Apache OpenDAL.
//!
//! Validates uploads (extension allow-list, size cap), derives
//! human-traceable storage keys, and pushes bytes to a vendor-agnostic
//! object store:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3
//! - Local filesystem (development only)
//!
//! Each stored image yields a public locator URL for readers and an
//! opaque key used only to delete that object later.

mod config;
mod error;
mod service;

pub use config::{MediaConfig, MediaProvider};
pub use error::MediaError;
pub use service::{MediaService, StoredImage, UploadedImage};
