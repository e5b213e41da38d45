/// Post service - creation workflow and post management
use super::location::LocationResolver;
use super::page_bounds;
use crate::db::{CommentStore, PostStore};
use crate::error::{AppError, Result};
use crate::models::{
    ImageFormat, ImagePayload, LocationUpdate, NewImage, NewPost, Post, PostDetails, PostImage,
    PostUpdate, ResolvedLocation,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Comments embedded in a single-post read
const DETAIL_COMMENT_LIMIT: i64 = 50;

/// Column width of `posts.location_query`
pub const MAX_LOCATION_QUERY_CHARS: usize = 255;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
    resolver: LocationResolver,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        comments: Arc<dyn CommentStore>,
        resolver: LocationResolver,
    ) -> Self {
        Self {
            posts,
            comments,
            resolver,
        }
    }

    /// Create a post with its images and, when a location query is given,
    /// its resolved location.
    ///
    /// Every image is validated before anything else happens, so a single bad
    /// file rejects the whole request. Geocoding runs before the write and a
    /// failed lookup only leaves the location fields empty.
    pub async fn create_post(
        &self,
        author_id: Uuid,
        text: &str,
        location_query: Option<&str>,
        images: Vec<ImagePayload>,
    ) -> Result<Post> {
        validate_post_text(text)?;
        let images = prepare_images(images)?;
        let location_query = normalize_query(location_query)?;

        let location = match location_query.as_deref() {
            Some(query) => self.resolver.resolve(query).await,
            None => ResolvedLocation::unresolved(),
        };

        if location_query.is_some() && !location.is_resolved() {
            warn!(%author_id, "Creating post with unresolved location");
        }

        let image_count = images.len();
        let post = self
            .posts
            .create_post_with_images(
                NewPost {
                    author_id,
                    text: text.to_string(),
                    location_query,
                    location,
                },
                images,
            )
            .await?;

        info!(post_id = %post.id, %author_id, image_count, "Post created");

        Ok(post)
    }

    /// Post with images, like count and the newest comments
    pub async fn get_post(&self, post_id: Uuid) -> Result<PostDetails> {
        let post = self.find_post(post_id).await?;
        let comments = self
            .comments
            .list_comments(post_id, DETAIL_COMMENT_LIMIT, 0)
            .await?;

        Ok(PostDetails { post, comments })
    }

    pub async fn list_posts(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<Post>> {
        let (limit, offset) = page_bounds(limit, offset);
        self.posts.list_posts(limit, offset).await
    }

    pub async fn ensure_post_exists(&self, post_id: Uuid) -> Result<()> {
        if self.posts.post_exists(post_id).await? {
            Ok(())
        } else {
            Err(post_not_found(post_id))
        }
    }

    /// Update text and/or location of the caller's own post.
    ///
    /// A location query that differs from the stored one is resolved again
    /// with the same degradation rules as creation; an empty query clears the
    /// location.
    pub async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        text: Option<&str>,
        location_query: Option<&str>,
    ) -> Result<Post> {
        if text.is_none() && location_query.is_none() {
            return Err(AppError::BadRequest("Nothing to update".to_string()));
        }
        if let Some(text) = text {
            validate_post_text(text)?;
        }

        let current = self.find_post(post_id).await?;
        if current.author_id != author_id {
            return Err(post_not_found(post_id));
        }

        let location = match location_query {
            Some(raw) => {
                let query = normalize_query(Some(raw))?;
                if query == current.location_query {
                    None
                } else {
                    let resolved = match query.as_deref() {
                        Some(q) => self.resolver.resolve(q).await,
                        None => ResolvedLocation::unresolved(),
                    };
                    Some(LocationUpdate { query, resolved })
                }
            }
            None => None,
        };

        let update = PostUpdate {
            text: text.map(str::to_string),
            location,
        };
        if update == PostUpdate::default() {
            return Ok(current);
        }

        let post = self
            .posts
            .update_post(post_id, author_id, update)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;

        info!(%post_id, %author_id, "Post updated");

        Ok(post)
    }

    /// Delete the caller's own post; images, comments and likes go with it
    pub async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<()> {
        if !self.posts.delete_post(post_id, author_id).await? {
            return Err(post_not_found(post_id));
        }

        info!(%post_id, %author_id, "Post deleted");
        Ok(())
    }

    /// Image bytes and metadata
    pub async fn get_image(&self, post_id: Uuid, image_id: Uuid) -> Result<PostImage> {
        self.posts
            .find_image(post_id, image_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Image {} not found", image_id)))
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .find_post(post_id)
            .await?
            .ok_or_else(|| post_not_found(post_id))
    }
}

fn post_not_found(post_id: Uuid) -> AppError {
    AppError::NotFound(format!("Post {} not found", post_id))
}

pub fn validate_post_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Post text cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Check every upload's format and assign positions in upload order.
/// Fails on the first disallowed file without keeping any of them.
pub fn prepare_images(images: Vec<ImagePayload>) -> Result<Vec<NewImage>> {
    images
        .into_iter()
        .enumerate()
        .map(|(position, payload)| {
            let format = ImageFormat::from_filename(&payload.filename).ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Unsupported image format for '{}': allowed formats are png, jpg, jpeg",
                    payload.filename
                ))
            })?;
            let position = i32::try_from(position)
                .map_err(|_| AppError::ValidationError("Too many images".to_string()))?;

            Ok(NewImage {
                position,
                filename: payload.filename,
                format,
                data: payload.data,
            })
        })
        .collect()
}

/// Trimmed query, `None` when blank
fn normalize_query(query: Option<&str>) -> Result<Option<String>> {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return Ok(None);
    };

    if query.chars().count() > MAX_LOCATION_QUERY_CHARS {
        return Err(AppError::ValidationError(format!(
            "Location query exceeds {} characters",
            MAX_LOCATION_QUERY_CHARS
        )));
    }

    Ok(Some(query.to_string()))
}
