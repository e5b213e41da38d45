use super::PostStore;
use crate::error::{AppError, Result};
use crate::models::{NewImage, NewPost, Post, PostImage, PostUpdate};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

const POST_SELECT: &str = r#"
    SELECT p.id, p.author_id, p.text, p.location_query, p.latitude, p.longitude,
           p.location_name, p.created_at, p.updated_at,
           (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count
    FROM posts p
"#;

/// PostgreSQL-backed post and image storage
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Load a post and its image metadata on one connection, so callers inside a
/// transaction see their own uncommitted rows.
async fn load_post(conn: &mut PgConnection, post_id: Uuid) -> Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>(&format!("{POST_SELECT} WHERE p.id = $1"))
        .bind(post_id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(mut post) = post else {
        return Ok(None);
    };

    post.images = sqlx::query_as::<_, PostImage>(
        r#"
        SELECT id, post_id, position, filename, content_type, created_at
        FROM post_images
        WHERE post_id = $1
        ORDER BY position ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(post))
}

#[async_trait]
impl PostStore for PgPostRepository {
    async fn create_post_with_images(&self, post: NewPost, images: Vec<NewImage>) -> Result<Post> {
        let coordinates = post.location.coordinates;
        let location_name = coordinates.and(post.location.name);

        let mut tx = self.pool.begin().await?;

        let post_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO posts (author_id, text, location_query, latitude, longitude, location_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(post.author_id)
        .bind(&post.text)
        .bind(&post.location_query)
        .bind(coordinates.map(|c| c.latitude))
        .bind(coordinates.map(|c| c.longitude))
        .bind(location_name)
        .fetch_one(&mut *tx)
        .await?;

        for image in &images {
            sqlx::query(
                r#"
                INSERT INTO post_images (post_id, position, filename, content_type, data)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(post_id)
            .bind(image.position)
            .bind(&image.filename)
            .bind(image.format.content_type())
            .bind(&image.data)
            .execute(&mut *tx)
            .await?;
        }

        let created = load_post(&mut tx, post_id)
            .await?
            .ok_or_else(|| AppError::Internal("created post not readable".to_string()))?;

        // Dropping `tx` on any error above rolls back the post and every image
        tx.commit().await?;

        Ok(created)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let mut conn = self.pool.acquire().await?;
        load_post(&mut conn, post_id).await
    }

    async fn post_exists(&self, post_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let mut posts = sqlx::query_as::<_, Post>(&format!(
            "{POST_SELECT} ORDER BY p.created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        if posts.is_empty() {
            return Ok(posts);
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let images = sqlx::query_as::<_, PostImage>(
            r#"
            SELECT id, post_id, position, filename, content_type, created_at
            FROM post_images
            WHERE post_id = ANY($1)
            ORDER BY post_id, position ASC
            "#,
        )
        .bind(&post_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_post: HashMap<Uuid, Vec<PostImage>> = HashMap::new();
        for image in images {
            by_post.entry(image.post_id).or_default().push(image);
        }
        for post in &mut posts {
            post.images = by_post.remove(&post.id).unwrap_or_default();
        }

        Ok(posts)
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        update: PostUpdate,
    ) -> Result<Option<Post>> {
        let replace_location = update.location.is_some();
        let (query, coordinates, name) = match update.location {
            Some(location) => {
                let coordinates = location.resolved.coordinates;
                (location.query, coordinates, coordinates.and(location.resolved.name))
            }
            None => (None, None, None),
        };

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET text = COALESCE($3, text),
                location_query = CASE WHEN $4 THEN $5 ELSE location_query END,
                latitude = CASE WHEN $4 THEN $6 ELSE latitude END,
                longitude = CASE WHEN $4 THEN $7 ELSE longitude END,
                location_name = CASE WHEN $4 THEN $8 ELSE location_name END,
                updated_at = NOW()
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(update.text)
        .bind(replace_location)
        .bind(query)
        .bind(coordinates.map(|c| c.latitude))
        .bind(coordinates.map(|c| c.longitude))
        .bind(name)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let updated = load_post(&mut tx, post_id).await?;
        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(post_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_image(&self, post_id: Uuid, image_id: Uuid) -> Result<Option<PostImage>> {
        let image = sqlx::query_as::<_, PostImage>(
            r#"
            SELECT id, post_id, position, filename, content_type, created_at, data
            FROM post_images
            WHERE id = $1 AND post_id = $2
            "#,
        )
        .bind(image_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }
}
