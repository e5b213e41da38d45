/// Data models for post-service
///
/// - Post: text post with optional resolved location and ordered images
/// - PostImage: photo owned by a post (png/jpg/jpeg only)
/// - Comment: comment on a post
/// - Like: one user's endorsement of one post
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A geographic point. Latitude and longitude only ever travel together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Outcome of resolving a location query.
///
/// `name` is only ever set together with `coordinates`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLocation {
    pub coordinates: Option<Coordinates>,
    pub name: Option<String>,
}

impl ResolvedLocation {
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.coordinates.is_some()
    }
}

/// Post entity as read back from storage
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub location_query: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Derived from the likes table at read time
    pub like_count: i64,
    #[sqlx(skip)]
    pub images: Vec<PostImage>,
}

impl Post {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }
}

/// Image attached to a post. `data` is only loaded when the image itself is requested.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostImage {
    pub id: Uuid,
    pub post_id: Uuid,
    pub position: i32,
    pub filename: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    #[sqlx(default)]
    pub data: Vec<u8>,
}

/// Image formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpg,
    Jpeg,
}

impl ImageFormat {
    /// Format is decided by the filename extension alone, case-insensitively.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" => Some(ImageFormat::Jpg),
            "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub fn mime(&self) -> mime::Mime {
        match self {
            ImageFormat::Png => mime::IMAGE_PNG,
            ImageFormat::Jpg | ImageFormat::Jpeg => mime::IMAGE_JPEG,
        }
    }

    pub fn content_type(&self) -> String {
        self.mime().to_string()
    }
}

/// Raw upload as received from the client
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub filename: String,
    pub data: Vec<u8>,
}

impl ImagePayload {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }
}

/// Image that passed format validation and is ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub position: i32,
    pub filename: String,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

/// Post fields prepared by the creation workflow
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub author_id: Uuid,
    pub text: String,
    pub location_query: Option<String>,
    pub location: ResolvedLocation,
}

/// New location for an existing post
#[derive(Debug, Clone, PartialEq)]
pub struct LocationUpdate {
    pub query: Option<String>,
    pub resolved: ResolvedLocation,
}

/// Partial update of a post; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostUpdate {
    pub text: Option<String>,
    pub location: Option<LocationUpdate>,
}

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
}

/// Like entity, identified by (user_id, post_id)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Post with its comments, as returned by the read endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PostDetails {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}
