/// Database access layer
///
/// This module provides:
/// - The store traits the services depend on (`PostStore`, `LikeStore`, `CommentStore`)
/// - PostgreSQL implementations backed by `sqlx`
/// - Connection pool creation
///
/// Stores report "no such row" as `Ok(None)` / `Ok(false)` and leave the
/// mapping to `AppError::NotFound` to the services, except where the storage
/// constraint itself is the signal (duplicate like, like on a missing post).
pub mod comment_repo;
pub mod like_repo;
pub mod pool;
pub mod post_repo;

pub use comment_repo::PgCommentRepository;
pub use like_repo::PgLikeRepository;
pub use pool::{create_pool, DbConfig};
pub use post_repo::PgPostRepository;

use crate::error::Result;
use crate::models::{Comment, Like, NewComment, NewImage, NewPost, Post, PostImage, PostUpdate};
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Persist a post and all of its images atomically: either everything is
    /// visible afterwards or nothing is.
    async fn create_post_with_images(&self, post: NewPost, images: Vec<NewImage>) -> Result<Post>;

    /// Post with its images (without image bytes) and current like count
    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    async fn post_exists(&self, post_id: Uuid) -> Result<bool>;

    /// Newest first
    async fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>>;

    /// Applies the update only when `author_id` owns the post
    async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        update: PostUpdate,
    ) -> Result<Option<Post>>;

    /// Deletes the post and, by cascade, its images, comments and likes
    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool>;

    /// Image including its bytes
    async fn find_image(&self, post_id: Uuid, image_id: Uuid) -> Result<Option<PostImage>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeStore: Send + Sync {
    /// Insert a like. Fails with `Conflict` when the (user, post) pair already
    /// exists and `NotFound` when the post does not exist. The uniqueness check
    /// is the storage constraint, not a prior read.
    async fn insert_like(&self, user_id: Uuid, post_id: Uuid) -> Result<Like>;

    /// Returns true when exactly one like was removed
    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;

    /// Committed like count at call time
    async fn count_likes(&self, post_id: Uuid) -> Result<i64>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(&self, comment: NewComment) -> Result<Comment>;

    /// Newest first
    async fn list_comments(&self, post_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Comment>>;

    async fn find_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Option<Comment>>;

    async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        author_id: Uuid,
        text: String,
    ) -> Result<Option<Comment>>;

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid, author_id: Uuid) -> Result<bool>;
}
