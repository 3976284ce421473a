//! Blog service implementation.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use super::error::BlogError;
use super::types::{BlogPost, CreatePostInput, PostWithAuthor, UpdatePostInput};
use crate::media::{MediaError, MediaService};

/// Repository trait for post persistence.
///
/// This trait is implemented by the db crate to provide actual database
/// operations. It carries no business rules.
pub trait BlogRepository: Send + Sync {
    /// Insert a new post record.
    fn insert(
        &self,
        post: BlogPost,
    ) -> impl std::future::Future<Output = Result<BlogPost, BlogError>> + Send;

    /// Find a post by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<BlogPost>, BlogError>> + Send;

    /// Find a post by ID joined with its author's display name.
    fn find_with_author(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<PostWithAuthor>, BlogError>> + Send;

    /// List all posts, newest first, with author display names.
    fn list_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<PostWithAuthor>, BlogError>> + Send;

    /// List posts by a single author, newest first.
    fn list_by_author(
        &self,
        author: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<PostWithAuthor>, BlogError>> + Send;

    /// Persist the mutable fields of an existing post.
    fn update(
        &self,
        post: &BlogPost,
    ) -> impl std::future::Future<Output = Result<BlogPost, BlogError>> + Send;

    /// Delete a post by ID. Returns whether a record was removed.
    fn delete_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, BlogError>> + Send;
}

/// Coordinates the post store and the external image store.
///
/// Upload-before-insert on create, best-effort asset cleanup on delete.
/// A record insert that fails after a successful upload leaves the
/// asset orphaned; that gap is accepted rather than compensated.
pub struct BlogService<R: BlogRepository> {
    media: Arc<MediaService>,
    repo: Arc<R>,
}

impl<R: BlogRepository> BlogService<R> {
    /// Create a new blog service.
    #[must_use]
    pub fn new(media: Arc<MediaService>, repo: Arc<R>) -> Self {
        Self { media, repo }
    }

    /// Create a post for the given principal.
    ///
    /// The image is mandatory and is uploaded before anything is
    /// written to the database, so a rejected upload produces no
    /// record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No image is attached, or it fails validation
    /// - The media store or the repository fails
    pub async fn create(
        &self,
        principal: Uuid,
        input: CreatePostInput,
    ) -> Result<BlogPost, BlogError> {
        let image = input.image.as_ref().ok_or(MediaError::MissingImage)?;
        let stored = self.media.store(image).await?;

        let now = Utc::now();
        let post = BlogPost {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            author: principal,
            image_url: stored.url,
            image_key: Some(stored.key),
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(post).await
    }

    /// Update a post. Only the author may do this.
    ///
    /// Supplied fields replace the current ones; a new image replaces
    /// the locator and key, leaving the previous asset in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The post does not exist
    /// - The principal is not the author
    /// - A replacement image fails validation or upload
    pub async fn update(
        &self,
        principal: Uuid,
        id: Uuid,
        input: UpdatePostInput,
    ) -> Result<BlogPost, BlogError> {
        let mut post = self.load_owned(id, principal).await?;

        if let Some(title) = input.title {
            post.title = title;
        }
        if let Some(description) = input.description {
            post.description = description;
        }
        if let Some(image) = &input.image {
            let stored = self.media.store(image).await?;
            post.image_url = stored.url;
            post.image_key = Some(stored.key);
        }
        post.updated_at = Utc::now();

        self.repo.update(&post).await
    }

    /// Delete a post. Only the author may do this.
    ///
    /// The image asset is removed best-effort first; a failing store
    /// never blocks record deletion, which is the authoritative success
    /// signal.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The post does not exist
    /// - The principal is not the author
    /// - The repository delete fails
    pub async fn delete(&self, principal: Uuid, id: Uuid) -> Result<(), BlogError> {
        let post = self.load_owned(id, principal).await?;

        if let Some(key) = &post.image_key {
            if let Err(e) = self.media.delete(key).await {
                warn!(post_id = %id, error = %e, "image asset deletion failed; deleting record anyway");
            }
        }

        if self.repo.delete_by_id(id).await? {
            Ok(())
        } else {
            Err(BlogError::NotFound(id))
        }
    }

    /// Get a post with its author's display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the post does not exist or the repository fails.
    pub async fn get(&self, id: Uuid) -> Result<PostWithAuthor, BlogError> {
        self.repo
            .find_with_author(id)
            .await?
            .ok_or(BlogError::NotFound(id))
    }

    /// List all posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn list(&self) -> Result<Vec<PostWithAuthor>, BlogError> {
        self.repo.list_all().await
    }

    /// List the calling principal's posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn list_mine(&self, principal: Uuid) -> Result<Vec<PostWithAuthor>, BlogError> {
        self.repo.list_by_author(principal).await
    }

    /// Load a post and verify the principal owns it.
    ///
    /// Returns the loaded record so callers need not fetch it again.
    async fn load_owned(&self, id: Uuid, principal: Uuid) -> Result<BlogPost, BlogError> {
        let post = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(BlogError::NotFound(id))?;

        if post.author != principal {
            return Err(BlogError::Forbidden);
        }

        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaConfig, MediaProvider, UploadedImage};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock repository for testing.
    struct MockBlogRepository {
        posts: Mutex<HashMap<Uuid, BlogPost>>,
        names: Mutex<HashMap<Uuid, String>>,
    }

    impl MockBlogRepository {
        fn new() -> Self {
            Self {
                posts: Mutex::new(HashMap::new()),
                names: Mutex::new(HashMap::new()),
            }
        }

        fn add_principal(&self, id: Uuid, name: &str) {
            self.names.lock().unwrap().insert(id, name.to_string());
        }

        fn author_name(&self, id: Uuid) -> String {
            self.names
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .unwrap_or_default()
        }

        fn count(&self) -> usize {
            self.posts.lock().unwrap().len()
        }

        fn stored(&self, id: Uuid) -> Option<BlogPost> {
            self.posts.lock().unwrap().get(&id).cloned()
        }
    }

    impl BlogRepository for MockBlogRepository {
        async fn insert(&self, post: BlogPost) -> Result<BlogPost, BlogError> {
            self.posts.lock().unwrap().insert(post.id, post.clone());
            Ok(post)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogPost>, BlogError> {
            Ok(self.posts.lock().unwrap().get(&id).cloned())
        }

        async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, BlogError> {
            Ok(self.posts.lock().unwrap().get(&id).cloned().map(|post| {
                let author_name = self.author_name(post.author);
                PostWithAuthor { post, author_name }
            }))
        }

        async fn list_all(&self) -> Result<Vec<PostWithAuthor>, BlogError> {
            let mut posts: Vec<PostWithAuthor> = self
                .posts
                .lock()
                .unwrap()
                .values()
                .cloned()
                .map(|post| {
                    let author_name = self.author_name(post.author);
                    PostWithAuthor { post, author_name }
                })
                .collect();
            posts.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
            Ok(posts)
        }

        async fn list_by_author(&self, author: Uuid) -> Result<Vec<PostWithAuthor>, BlogError> {
            let mut posts = self.list_all().await?;
            posts.retain(|p| p.post.author == author);
            Ok(posts)
        }

        async fn update(&self, post: &BlogPost) -> Result<BlogPost, BlogError> {
            let mut posts = self.posts.lock().unwrap();
            if !posts.contains_key(&post.id) {
                return Err(BlogError::NotFound(post.id));
            }
            posts.insert(post.id, post.clone());
            Ok(post.clone())
        }

        async fn delete_by_id(&self, id: Uuid) -> Result<bool, BlogError> {
            Ok(self.posts.lock().unwrap().remove(&id).is_some())
        }
    }

    fn test_media() -> Arc<MediaService> {
        test_media_at(std::env::temp_dir().join(format!("scribe-blog-{}", Uuid::new_v4())))
    }

    fn test_media_at(root: std::path::PathBuf) -> Arc<MediaService> {
        let config = MediaConfig::new(MediaProvider::local_fs(root), "http://localhost/media");
        Arc::new(MediaService::from_config(config).expect("should create media service"))
    }

    /// A media service whose store is unreachable; every operation fails.
    fn unreachable_media() -> Arc<MediaService> {
        let config = MediaConfig::new(
            MediaProvider::s3(
                "http://127.0.0.1:1",
                "no-such-bucket",
                "unused",
                "unused",
                "auto",
            ),
            "http://localhost/media",
        );
        Arc::new(MediaService::from_config(config).expect("should create media service"))
    }

    fn test_service() -> (BlogService<MockBlogRepository>, Arc<MockBlogRepository>) {
        let media = test_media();
        let repo = Arc::new(MockBlogRepository::new());
        (BlogService::new(media, repo.clone()), repo)
    }

    fn image(name: &str) -> UploadedImage {
        UploadedImage::new(name, vec![42u8; 32])
    }

    #[tokio::test]
    async fn test_create_sets_author_and_stores_image() {
        let (service, repo) = test_service();
        let principal = Uuid::new_v4();

        let post = service
            .create(
                principal,
                CreatePostInput {
                    title: "A".to_string(),
                    description: "first".to_string(),
                    image: Some(image("a.jpg")),
                },
            )
            .await
            .unwrap();

        assert_eq!(post.author, principal);
        assert!(post.image_url.contains("blog_images/"));
        assert!(post.image_key.is_some());
        assert_eq!(post.created_at, post.updated_at);
        assert_eq!(repo.stored(post.id), Some(post));
    }

    #[tokio::test]
    async fn test_create_without_image_writes_nothing() {
        let root = std::env::temp_dir().join(format!("scribe-blog-{}", Uuid::new_v4()));
        let repo = Arc::new(MockBlogRepository::new());
        let service = BlogService::new(test_media_at(root.clone()), repo.clone());

        let result = service
            .create(
                Uuid::new_v4(),
                CreatePostInput {
                    title: "A".to_string(),
                    description: "no image".to_string(),
                    image: None,
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(BlogError::Media(MediaError::MissingImage))
        ));
        assert_eq!(repo.count(), 0);
        // no object landed in the store either
        assert!(!root.join("blog_images").exists());
    }

    #[tokio::test]
    async fn test_create_with_disallowed_extension_writes_nothing() {
        let root = std::env::temp_dir().join(format!("scribe-blog-{}", Uuid::new_v4()));
        let repo = Arc::new(MockBlogRepository::new());
        let service = BlogService::new(test_media_at(root.clone()), repo.clone());

        let result = service
            .create(
                Uuid::new_v4(),
                CreatePostInput {
                    title: "A".to_string(),
                    description: "bad image".to_string(),
                    image: Some(image("a.svg")),
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(BlogError::Media(MediaError::UnsupportedExtension { .. }))
        ));
        assert_eq!(repo.count(), 0);
        assert!(!root.join("blog_images").exists());
    }

    #[tokio::test]
    async fn test_update_merges_fields_and_keeps_image() {
        let (service, _repo) = test_service();
        let principal = Uuid::new_v4();

        let created = service
            .create(
                principal,
                CreatePostInput {
                    title: "old title".to_string(),
                    description: "old body".to_string(),
                    image: Some(image("keep.png")),
                },
            )
            .await
            .unwrap();

        let updated = service
            .update(
                principal,
                created.id,
                UpdatePostInput {
                    title: Some("new title".to_string()),
                    ..UpdatePostInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "new title");
        assert_eq!(updated.description, "old body");
        assert_eq!(updated.image_url, created.image_url);
        assert_eq!(updated.image_key, created.image_key);
        assert_eq!(updated.author, principal);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_replaces_image_and_orphans_old_asset() {
        let (service, _repo) = test_service();
        let media = service.media.clone();
        let principal = Uuid::new_v4();

        let created = service
            .create(
                principal,
                CreatePostInput {
                    title: "t".to_string(),
                    description: "d".to_string(),
                    image: Some(image("before.jpg")),
                },
            )
            .await
            .unwrap();
        let old_key = created.image_key.clone().unwrap();

        let updated = service
            .update(
                principal,
                created.id,
                UpdatePostInput {
                    image: Some(image("after.jpg")),
                    ..UpdatePostInput::default()
                },
            )
            .await
            .unwrap();

        assert_ne!(updated.image_key, created.image_key);
        // the replaced asset stays in the store
        assert!(media.exists(&old_key).await);
        assert!(media.exists(updated.image_key.as_deref().unwrap()).await);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden_and_unchanged() {
        let (service, repo) = test_service();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();

        let created = service
            .create(
                owner,
                CreatePostInput {
                    title: "mine".to_string(),
                    description: "hands off".to_string(),
                    image: Some(image("mine.jpg")),
                },
            )
            .await
            .unwrap();

        let result = service
            .update(
                intruder,
                created.id,
                UpdatePostInput {
                    title: Some("stolen".to_string()),
                    ..UpdatePostInput::default()
                },
            )
            .await;

        assert!(matches!(result, Err(BlogError::Forbidden)));
        assert_eq!(repo.stored(created.id), Some(created));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_forbidden() {
        let (service, repo) = test_service();
        let owner = Uuid::new_v4();

        let created = service
            .create(
                owner,
                CreatePostInput {
                    title: "t".to_string(),
                    description: "d".to_string(),
                    image: Some(image("t.jpg")),
                },
            )
            .await
            .unwrap();

        let result = service.delete(Uuid::new_v4(), created.id).await;
        assert!(matches!(result, Err(BlogError::Forbidden)));
        assert_eq!(repo.count(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_asset() {
        let (service, repo) = test_service();
        let media = service.media.clone();
        let principal = Uuid::new_v4();

        let created = service
            .create(
                principal,
                CreatePostInput {
                    title: "t".to_string(),
                    description: "d".to_string(),
                    image: Some(image("gone.png")),
                },
            )
            .await
            .unwrap();
        let key = created.image_key.clone().unwrap();

        service.delete(principal, created.id).await.unwrap();

        assert_eq!(repo.count(), 0);
        assert!(!media.exists(&key).await);
        assert!(matches!(
            service.get(created.id).await,
            Err(BlogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_asset_already_gone() {
        let (service, repo) = test_service();
        let media = service.media.clone();
        let principal = Uuid::new_v4();

        let created = service
            .create(
                principal,
                CreatePostInput {
                    title: "t".to_string(),
                    description: "d".to_string(),
                    image: Some(image("flaky.jpg")),
                },
            )
            .await
            .unwrap();

        // the asset disappears out from under us
        media
            .delete(created.image_key.as_deref().unwrap())
            .await
            .unwrap();

        service.delete(principal, created.id).await.unwrap();
        assert_eq!(repo.count(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_record_when_store_delete_fails() {
        let repo = Arc::new(MockBlogRepository::new());
        let service = BlogService::new(unreachable_media(), repo.clone());
        let principal = Uuid::new_v4();

        let now = Utc::now();
        let post = BlogPost {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            author: principal,
            image_url: "http://localhost/media/blog_images/1_t.jpg".to_string(),
            image_key: Some("blog_images/1_t.jpg".to_string()),
            created_at: now,
            updated_at: now,
        };
        repo.insert(post.clone()).await.unwrap();

        // the store call errors out, the record still goes away
        service.delete(principal, post.id).await.unwrap();
        assert_eq!(repo.count(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_post_not_found() {
        let (service, _repo) = test_service();
        let result = service.delete(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(BlogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_projects_author_name() {
        let (service, repo) = test_service();
        let principal = Uuid::new_v4();
        repo.add_principal(principal, "alice");

        let created = service
            .create(
                principal,
                CreatePostInput {
                    title: "t".to_string(),
                    description: "d".to_string(),
                    image: Some(image("t.jpg")),
                },
            )
            .await
            .unwrap();

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched.author_name, "alice");
        assert_eq!(fetched.post, created);
    }

    #[tokio::test]
    async fn test_list_mine_filters_by_author() {
        let (service, repo) = test_service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        repo.add_principal(alice, "alice");
        repo.add_principal(bob, "bob");

        for (principal, title) in [(alice, "a1"), (bob, "b1"), (alice, "a2")] {
            service
                .create(
                    principal,
                    CreatePostInput {
                        title: title.to_string(),
                        description: String::new(),
                        image: Some(image("x.jpg")),
                    },
                )
                .await
                .unwrap();
        }

        let mine = service.list_mine(alice).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|p| p.post.author == alice));

        let all = service.list().await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
