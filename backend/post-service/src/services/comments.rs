/// Comment service - comment lifecycle on existing posts
use super::page_bounds;
use crate::db::{CommentStore, PostStore};
use crate::error::{AppError, Result};
use crate::models::{Comment, NewComment};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    posts: Arc<dyn PostStore>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentStore>, posts: Arc<dyn PostStore>) -> Self {
        Self { comments, posts }
    }

    pub async fn create_comment(&self, post_id: Uuid, author_id: Uuid, text: &str) -> Result<Comment> {
        validate_comment_text(text)?;
        self.ensure_post(post_id).await?;

        let comment = self
            .comments
            .insert_comment(NewComment {
                post_id,
                author_id,
                text: text.to_string(),
            })
            .await?;

        tracing::debug!(comment_id = %comment.id, %post_id, %author_id, "Comment created");
        Ok(comment)
    }

    pub async fn list_comments(
        &self,
        post_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Comment>> {
        self.ensure_post(post_id).await?;
        let (limit, offset) = page_bounds(limit, offset);
        self.comments.list_comments(post_id, limit, offset).await
    }

    pub async fn get_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment> {
        self.comments
            .find_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| comment_not_found(comment_id))
    }

    /// Only the comment's author may edit it
    pub async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        author_id: Uuid,
        text: &str,
    ) -> Result<Comment> {
        validate_comment_text(text)?;

        self.comments
            .update_comment(post_id, comment_id, author_id, text.to_string())
            .await?
            .ok_or_else(|| comment_not_found(comment_id))
    }

    pub async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid, author_id: Uuid) -> Result<()> {
        if self
            .comments
            .delete_comment(post_id, comment_id, author_id)
            .await?
        {
            Ok(())
        } else {
            Err(comment_not_found(comment_id))
        }
    }

    async fn ensure_post(&self, post_id: Uuid) -> Result<()> {
        if !self.posts.post_exists(post_id).await? {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }
        Ok(())
    }
}

fn comment_not_found(comment_id: Uuid) -> AppError {
    AppError::NotFound(format!("Comment {} not found", comment_id))
}

/// Reject empty and whitespace-only comments before they reach storage
pub fn validate_comment_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Comment text cannot be empty".to_string(),
        ));
    }
    Ok(())
}
