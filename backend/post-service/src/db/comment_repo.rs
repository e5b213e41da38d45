use super::CommentStore;
use crate::error::{AppError, Result};
use crate::models::{Comment, NewComment};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgCommentRepository {
    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let inserted = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, text, created_at, updated_at
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(comment) => Ok(comment),
            // Post deleted between the existence check and the insert
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(AppError::NotFound(format!("post {}", comment.post_id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_comments(&self, post_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, text, created_at, updated_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn find_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, text, created_at, updated_at
            FROM comments
            WHERE id = $1 AND post_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        author_id: Uuid,
        text: String,
    ) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET text = $4, updated_at = NOW()
            WHERE id = $1 AND post_id = $2 AND author_id = $3
            RETURNING id, post_id, author_id, text, created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid, author_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1 AND post_id = $2 AND author_id = $3
            "#,
        )
        .bind(comment_id)
        .bind(post_id)
        .bind(author_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
