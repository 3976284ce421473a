//! Blog post types and data structures.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::media::UploadedImage;

/// Blog post domain model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPost {
    /// Unique identifier, generated on creation.
    pub id: Uuid,
    /// Post title.
    pub title: String,
    /// Post body text.
    pub description: String,
    /// Authoring principal. Set once at creation, never reassigned.
    pub author: Uuid,
    /// Publicly fetchable URL of the attached image.
    pub image_url: String,
    /// Opaque storage key used only to delete the image.
    pub image_key: Option<String>,
    /// Creation timestamp, set once.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A post joined with its author's display name, for read endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostWithAuthor {
    /// The post record.
    pub post: BlogPost,
    /// Display name of the authoring principal.
    pub author_name: String,
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    /// Post title.
    pub title: String,
    /// Post body text.
    pub description: String,
    /// Attached image. Required; create fails without one.
    pub image: Option<UploadedImage>,
}

/// Input for updating a post. Absent fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    /// New title, if changed.
    pub title: Option<String>,
    /// New body text, if changed.
    pub description: Option<String>,
    /// Replacement image, if one was uploaded.
    pub image: Option<UploadedImage>,
}
