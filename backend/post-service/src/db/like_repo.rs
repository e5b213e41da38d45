use super::LikeStore;
use crate::error::{AppError, Result};
use crate::models::Like;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL-backed like storage. The `(user_id, post_id)` primary key is
/// the source of truth for uniqueness.
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeStore for PgLikeRepository {
    async fn insert_like(&self, user_id: Uuid, post_id: Uuid) -> Result<Like> {
        // Concurrent inserts for the same pair serialize on the primary key;
        // the loser gets no row back.
        let inserted = sqlx::query_as::<_, Like>(
            r#"
            INSERT INTO likes (user_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, post_id) DO NOTHING
            RETURNING user_id, post_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await;

        match inserted {
            Ok(Some(like)) => Ok(like),
            Ok(None) => Err(AppError::Conflict("post already liked".to_string())),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(AppError::NotFound(format!("post {}", post_id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM likes
            WHERE user_id = $1 AND post_id = $2
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn count_likes(&self, post_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
