/// Like registry - one like per (user, post), counts read from committed state
use crate::db::LikeStore;
use crate::error::{AppError, Result};
use crate::metrics::record_like_operation;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct LikeRegistry {
    store: Arc<dyn LikeStore>,
}

impl LikeRegistry {
    pub fn new(store: Arc<dyn LikeStore>) -> Self {
        Self { store }
    }

    /// Like a post and return the new like count.
    ///
    /// A second like for the same pair fails with `Conflict`; uniqueness is
    /// decided by the store's constraint, so concurrent callers get exactly
    /// one success.
    pub async fn add_like(&self, user_id: Uuid, post_id: Uuid) -> Result<i64> {
        if let Err(err) = self.store.insert_like(user_id, post_id).await {
            record_like_operation("add", result_label(&err));
            if matches!(err, AppError::Conflict(_)) {
                tracing::debug!(%user_id, %post_id, "Duplicate like rejected");
                return Err(AppError::Conflict("Post already liked".to_string()));
            }
            return Err(err);
        }

        record_like_operation("add", "ok");
        tracing::debug!(%user_id, %post_id, "Like added");

        self.store.count_likes(post_id).await
    }

    /// Remove a like and return the new like count
    pub async fn remove_like(&self, user_id: Uuid, post_id: Uuid) -> Result<i64> {
        let removed = match self.store.delete_like(user_id, post_id).await {
            Ok(removed) => removed,
            Err(err) => {
                record_like_operation("remove", result_label(&err));
                return Err(err);
            }
        };

        if !removed {
            record_like_operation("remove", "not_found");
            return Err(AppError::NotFound("Like not found".to_string()));
        }

        record_like_operation("remove", "ok");
        tracing::debug!(%user_id, %post_id, "Like removed");

        self.store.count_likes(post_id).await
    }

    /// Like count as of the latest committed write. Not cached.
    pub async fn count_likes(&self, post_id: Uuid) -> Result<i64> {
        self.store.count_likes(post_id).await
    }
}

fn result_label(err: &AppError) -> &'static str {
    match err {
        AppError::Conflict(_) => "conflict",
        AppError::NotFound(_) => "not_found",
        _ => "error",
    }
}
