//! Blog post routes.
//!
//! Create, read, update, and delete posts. Writes require a bearer
//! token; update and delete additionally require authorship.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use scribe_core::blog::{
    BlogError, BlogPost, BlogService, CreatePostInput, PostWithAuthor, UpdatePostInput,
};
use scribe_core::media::UploadedImage;
use scribe_db::PostRepository;
use scribe_shared::AppError;

/// Creates the post routes that are readable without authentication.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(get_post))
}

/// Creates the post routes that require a bearer token.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/mine", get(my_posts))
        .route("/posts/{id}", put(update_post))
        .route("/posts/{id}", delete(delete_post))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for a single post.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    /// Post ID.
    pub id: Uuid,
    /// Post title.
    pub title: String,
    /// Post body text.
    pub description: String,
    /// Author's principal ID.
    pub author: Uuid,
    /// Author's display name, when the read projects it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    /// Public URL of the attached image.
    pub image: String,
    /// Created at timestamp (ISO 8601).
    pub created_at: String,
    /// Updated at timestamp (ISO 8601).
    pub updated_at: String,
}

impl PostResponse {
    fn from_post(post: BlogPost) -> Self {
        Self {
            id: post.id,
            title: post.title,
            description: post.description,
            author: post.author,
            author_name: None,
            image: post.image_url,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }

    fn from_projected(projected: PostWithAuthor) -> Self {
        let mut response = Self::from_post(projected.post);
        response.author_name = Some(projected.author_name);
        response
    }
}

/// Fields collected from a multipart post form.
#[derive(Debug, Default)]
struct PostForm {
    title: Option<String>,
    description: Option<String>,
    image: Option<UploadedImage>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Builds a `{success: false, message}` error response.
fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

/// Maps a service error onto the response taxonomy.
fn map_blog_error(err: &BlogError) -> AppError {
    match err {
        BlogError::NotFound(_) => AppError::NotFound("Blog post not found".to_string()),
        BlogError::Forbidden => {
            AppError::Forbidden("You are not the author of this post".to_string())
        }
        BlogError::Media(media) if media.is_invalid_media() => {
            AppError::InvalidMedia(media.to_string())
        }
        BlogError::Media(media) => AppError::Internal(media.to_string()),
        BlogError::Repository(detail) => AppError::Internal(detail.clone()),
    }
}

/// Converts a service error to a response, logging internal faults.
fn blog_error_response(context: &str, err: &BlogError) -> Response {
    let app_error = map_blog_error(err);
    if app_error.status_code() == 500 {
        error!(error = %err, "Failed to {context}");
    }

    let status = StatusCode::from_u16(app_error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    failure(status, app_error.public_message())
}

/// Reads title, description and image fields from a multipart body.
///
/// Unknown fields are skipped; a malformed body short-circuits with a
/// 400 response.
async fn read_post_form(mut multipart: Multipart) -> Result<PostForm, Response> {
    let mut form = PostForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => {
                return Err(failure(
                    StatusCode::BAD_REQUEST,
                    "Malformed multipart request body",
                ));
            }
        };

        match field.name().map(ToString::to_string).as_deref() {
            Some("title") => {
                form.title = Some(read_text_field(field).await?);
            }
            Some("description") => {
                form.description = Some(read_text_field(field).await?);
            }
            Some("image") => {
                let Some(filename) = field.file_name().map(ToString::to_string) else {
                    return Err(failure(
                        StatusCode::BAD_REQUEST,
                        "Image field must carry a filename",
                    ));
                };

                let data = field.bytes().await.map_err(|_| {
                    failure(StatusCode::BAD_REQUEST, "Failed to read image data")
                })?;

                form.image = Some(UploadedImage::new(filename, data));
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, Response> {
    field
        .text()
        .await
        .map_err(|_| failure(StatusCode::BAD_REQUEST, "Failed to read form field"))
}

/// Builds a blog service over a per-request repository.
fn blog_service(state: &AppState) -> BlogService<PostRepository> {
    let repo = PostRepository::new((*state.db).clone());
    BlogService::new(state.media.clone(), Arc::new(repo))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/posts`
/// Create a post with an attached image.
async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Response {
    let form = match read_post_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let Some(title) = form.title else {
        return failure(StatusCode::BAD_REQUEST, "A title is required");
    };
    let Some(description) = form.description else {
        return failure(StatusCode::BAD_REQUEST, "A description is required");
    };

    let input = CreatePostInput {
        title,
        description,
        image: form.image,
    };

    match blog_service(&state).create(auth.principal_id(), input).await {
        Ok(created) => {
            info!(
                post_id = %created.id,
                author = %created.author,
                "Post created"
            );

            (
                StatusCode::CREATED,
                Json(json!({
                    "success": true,
                    "post": PostResponse::from_post(created)
                })),
            )
                .into_response()
        }
        Err(e) => blog_error_response("create post", &e),
    }
}

/// GET `/posts`
/// List all posts, newest first.
async fn list_posts(State(state): State<AppState>) -> Response {
    match blog_service(&state).list().await {
        Ok(posts) => {
            let items: Vec<PostResponse> =
                posts.into_iter().map(PostResponse::from_projected).collect();

            (
                StatusCode::OK,
                Json(json!({ "success": true, "posts": items })),
            )
                .into_response()
        }
        Err(e) => blog_error_response("list posts", &e),
    }
}

/// GET `/posts/mine`
/// List the authenticated principal's posts, newest first.
async fn my_posts(State(state): State<AppState>, auth: AuthUser) -> Response {
    match blog_service(&state).list_mine(auth.principal_id()).await {
        Ok(posts) => {
            let items: Vec<PostResponse> =
                posts.into_iter().map(PostResponse::from_projected).collect();

            (
                StatusCode::OK,
                Json(json!({ "success": true, "posts": items })),
            )
                .into_response()
        }
        Err(e) => blog_error_response("list own posts", &e),
    }
}

/// GET `/posts/{id}`
/// Get a single post with its author's display name.
async fn get_post(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match blog_service(&state).get(id).await {
        Ok(projected) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "post": PostResponse::from_projected(projected)
            })),
        )
            .into_response(),
        Err(e) => blog_error_response("get post", &e),
    }
}

/// PUT `/posts/{id}`
/// Update a post. Only the author may do this.
async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Response {
    let form = match read_post_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let input = UpdatePostInput {
        title: form.title,
        description: form.description,
        image: form.image,
    };

    match blog_service(&state)
        .update(auth.principal_id(), id, input)
        .await
    {
        Ok(updated) => {
            info!(post_id = %updated.id, "Post updated");

            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "post": PostResponse::from_post(updated)
                })),
            )
                .into_response()
        }
        Err(e) => blog_error_response("update post", &e),
    }
}

/// DELETE `/posts/{id}`
/// Delete a post and best-effort its stored image. Only the author may
/// do this.
async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    match blog_service(&state).delete(auth.principal_id(), id).await {
        Ok(()) => {
            info!(post_id = %id, "Post deleted");

            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": "Post deleted successfully"
                })),
            )
                .into_response()
        }
        Err(e) => blog_error_response("delete post", &e),
    }
}
