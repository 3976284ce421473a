//! Post repository for database operations.
//!
//! Implements the core `BlogRepository` contract using SeaORM. CRUD
//! only; ownership and media rules live in the core service.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{posts, users};
use scribe_core::blog::{BlogError, BlogPost, BlogRepository, PostWithAuthor};

/// Post repository implementation.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl BlogRepository for PostRepository {
    async fn insert(&self, post: BlogPost) -> Result<BlogPost, BlogError> {
        let active_model = posts::ActiveModel {
            id: Set(post.id),
            title: Set(post.title.clone()),
            description: Set(post.description.clone()),
            author_id: Set(post.author),
            image_url: Set(post.image_url.clone()),
            image_key: Set(post.image_key.clone()),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| BlogError::repository(e.to_string()))?;

        Ok(to_domain(model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogPost>, BlogError> {
        let model = posts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| BlogError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, BlogError> {
        let result = posts::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .map_err(|e| BlogError::repository(e.to_string()))?;

        Ok(result.map(|(post, user)| to_projected(post, user)))
    }

    async fn list_all(&self) -> Result<Vec<PostWithAuthor>, BlogError> {
        let models = posts::Entity::find()
            .find_also_related(users::Entity)
            .order_by_desc(posts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| BlogError::repository(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|(post, user)| to_projected(post, user))
            .collect())
    }

    async fn list_by_author(&self, author: Uuid) -> Result<Vec<PostWithAuthor>, BlogError> {
        let models = posts::Entity::find()
            .filter(posts::Column::AuthorId.eq(author))
            .find_also_related(users::Entity)
            .order_by_desc(posts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| BlogError::repository(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|(post, user)| to_projected(post, user))
            .collect())
    }

    async fn update(&self, post: &BlogPost) -> Result<BlogPost, BlogError> {
        // author and created_at are immutable after insert
        let active_model = posts::ActiveModel {
            id: Set(post.id),
            title: Set(post.title.clone()),
            description: Set(post.description.clone()),
            image_url: Set(post.image_url.clone()),
            image_key: Set(post.image_key.clone()),
            updated_at: Set(post.updated_at.into()),
            ..Default::default()
        };

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => BlogError::NotFound(post.id),
            other => BlogError::repository(other.to_string()),
        })?;

        Ok(to_domain(model))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, BlogError> {
        let result = posts::Entity::delete_many()
            .filter(posts::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| BlogError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Convert database model to domain model.
fn to_domain(model: posts::Model) -> BlogPost {
    BlogPost {
        id: model.id,
        title: model.title,
        description: model.description,
        author: model.author_id,
        image_url: model.image_url,
        image_key: model.image_key,
        created_at: model.created_at.with_timezone(&chrono::Utc),
        updated_at: model.updated_at.with_timezone(&chrono::Utc),
    }
}

/// Convert a joined row to the author-projected read model.
fn to_projected(post: posts::Model, user: Option<users::Model>) -> PostWithAuthor {
    PostWithAuthor {
        post: to_domain(post),
        author_name: user.map(|u| u.name).unwrap_or_default(),
    }
}
