//! Shared fixtures for integration tests: an in-memory store that honours
//! the same uniqueness, ownership and cascade rules as the PostgreSQL schema,
//! and a scriptable geocoding provider.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use post_service::db::{CommentStore, LikeStore, PostStore};
use post_service::error::{AppError, Result};
use post_service::geocoding::{GeocodeError, GeocodingClient};
use post_service::models::{
    Comment, Coordinates, Like, NewComment, NewImage, NewPost, Post, PostImage, PostUpdate,
};
use post_service::services::{CommentService, LikeRegistry, LocationResolver, PostService};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

#[derive(Default)]
struct State {
    posts: HashMap<Uuid, Post>,
    images: HashMap<Uuid, PostImage>,
    comments: HashMap<Uuid, Comment>,
    likes: HashMap<(Uuid, Uuid), Like>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    /// When set, the next post write fails after validation, like a
    /// transaction aborting mid-way.
    fail_post_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_post_writes(&self, fail: bool) {
        self.fail_post_writes.store(fail, Ordering::SeqCst);
    }

    pub fn post_count(&self) -> usize {
        self.state.lock().unwrap().posts.len()
    }

    pub fn image_count(&self) -> usize {
        self.state.lock().unwrap().images.len()
    }

    pub fn like_rows(&self, post_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .likes
            .keys()
            .filter(|(_, p)| *p == post_id)
            .count()
    }

    pub fn comment_count(&self) -> usize {
        self.state.lock().unwrap().comments.len()
    }
}

fn assemble(state: &State, post: &Post) -> Post {
    let mut post = post.clone();
    post.like_count = state.likes.keys().filter(|(_, p)| *p == post.id).count() as i64;
    let mut images: Vec<PostImage> = state
        .images
        .values()
        .filter(|image| image.post_id == post.id)
        .cloned()
        .map(|mut image| {
            image.data = Vec::new();
            image
        })
        .collect();
    images.sort_by_key(|image| image.position);
    post.images = images;
    post
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn create_post_with_images(&self, post: NewPost, images: Vec<NewImage>) -> Result<Post> {
        if self.fail_post_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated write failure".into()));
        }

        let now = Utc::now();
        let post_id = Uuid::new_v4();
        let coordinates = post.location.coordinates;
        let stored = Post {
            id: post_id,
            author_id: post.author_id,
            text: post.text,
            location_query: post.location_query,
            latitude: coordinates.map(|c| c.latitude),
            longitude: coordinates.map(|c| c.longitude),
            location_name: coordinates.and(post.location.name),
            created_at: now,
            updated_at: now,
            like_count: 0,
            images: vec![],
        };

        let mut state = self.state.lock().unwrap();
        state.posts.insert(post_id, stored.clone());
        for image in images {
            let id = Uuid::new_v4();
            state.images.insert(
                id,
                PostImage {
                    id,
                    post_id,
                    position: image.position,
                    filename: image.filename,
                    content_type: image.format.content_type(),
                    created_at: now,
                    data: image.data,
                },
            );
        }

        Ok(assemble(&state, &stored))
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let state = self.state.lock().unwrap();
        Ok(state.posts.get(&post_id).map(|post| assemble(&state, post)))
    }

    async fn post_exists(&self, post_id: Uuid) -> Result<bool> {
        Ok(self.state.lock().unwrap().posts.contains_key(&post_id))
    }

    async fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        let mut posts: Vec<&Post> = state.posts.values().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|post| assemble(&state, post))
            .collect())
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        update: PostUpdate,
    ) -> Result<Option<Post>> {
        let mut state = self.state.lock().unwrap();
        let Some(post) = state.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        if post.author_id != author_id {
            return Ok(None);
        }

        if let Some(text) = update.text {
            post.text = text;
        }
        if let Some(location) = update.location {
            let coordinates = location.resolved.coordinates;
            post.location_query = location.query;
            post.latitude = coordinates.map(|c| c.latitude);
            post.longitude = coordinates.map(|c| c.longitude);
            post.location_name = coordinates.and(location.resolved.name);
        }
        post.updated_at = Utc::now();

        let post = post.clone();
        Ok(Some(assemble(&state, &post)))
    }

    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.posts.get(&post_id) {
            Some(post) if post.author_id == author_id => {}
            _ => return Ok(false),
        }

        state.posts.remove(&post_id);
        state.images.retain(|_, image| image.post_id != post_id);
        state.comments.retain(|_, comment| comment.post_id != post_id);
        state.likes.retain(|(_, p), _| *p != post_id);
        Ok(true)
    }

    async fn find_image(&self, post_id: Uuid, image_id: Uuid) -> Result<Option<PostImage>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .images
            .get(&image_id)
            .filter(|image| image.post_id == post_id)
            .cloned())
    }
}

#[async_trait]
impl LikeStore for InMemoryStore {
    async fn insert_like(&self, user_id: Uuid, post_id: Uuid) -> Result<Like> {
        // Single lock around check and insert, standing in for the primary key
        let mut state = self.state.lock().unwrap();
        if !state.posts.contains_key(&post_id) {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }
        if state.likes.contains_key(&(user_id, post_id)) {
            return Err(AppError::Conflict("post already liked".into()));
        }

        let like = Like {
            user_id,
            post_id,
            created_at: Utc::now(),
        };
        state.likes.insert((user_id, post_id), like.clone());
        Ok(like)
    }

    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .likes
            .remove(&(user_id, post_id))
            .is_some())
    }

    async fn count_likes(&self, post_id: Uuid) -> Result<i64> {
        Ok(self.like_rows(post_id) as i64)
    }
}

#[async_trait]
impl CommentStore for InMemoryStore {
    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let mut state = self.state.lock().unwrap();
        if !state.posts.contains_key(&comment.post_id) {
            return Err(AppError::NotFound(format!("post {}", comment.post_id)));
        }

        let now = Utc::now();
        let stored = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: now,
            updated_at: now,
        };
        state.comments.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_comments(&self, post_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Comment>> {
        let state = self.state.lock().unwrap();
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Option<Comment>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .comments
            .get(&comment_id)
            .filter(|comment| comment.post_id == post_id)
            .cloned())
    }

    async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        author_id: Uuid,
        text: String,
    ) -> Result<Option<Comment>> {
        let mut state = self.state.lock().unwrap();
        match state.comments.get_mut(&comment_id) {
            Some(comment) if comment.post_id == post_id && comment.author_id == author_id => {
                comment.text = text;
                comment.updated_at = Utc::now();
                Ok(Some(comment.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.comments.get(&comment_id) {
            Some(comment) if comment.post_id == post_id && comment.author_id == author_id => {
                state.comments.remove(&comment_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// How the stub provider answers
#[derive(Clone)]
pub enum ProviderBehaviour {
    Resolve {
        coordinates: Coordinates,
        address: String,
    },
    NoMatch,
    Unavailable,
    /// Sleeps far past any test timeout
    Hang,
}

pub struct StubGeocoder {
    behaviour: ProviderBehaviour,
    pub forward_calls: AtomicUsize,
    pub reverse_calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn new(behaviour: ProviderBehaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            forward_calls: AtomicUsize::new(0),
            reverse_calls: AtomicUsize::new(0),
        })
    }

    pub fn resolving(latitude: f64, longitude: f64, address: &str) -> Arc<Self> {
        Self::new(ProviderBehaviour::Resolve {
            coordinates: Coordinates::new(latitude, longitude),
            address: address.to_string(),
        })
    }
}

#[async_trait]
impl GeocodingClient for StubGeocoder {
    async fn forward(
        &self,
        _query: &str,
        timeout: Duration,
    ) -> std::result::Result<Option<Coordinates>, GeocodeError> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            ProviderBehaviour::Resolve { coordinates, .. } => Ok(Some(*coordinates)),
            ProviderBehaviour::NoMatch => Ok(None),
            ProviderBehaviour::Unavailable => {
                Err(GeocodeError::Unavailable("connection refused".into()))
            }
            ProviderBehaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(GeocodeError::TimedOut(timeout))
            }
        }
    }

    async fn reverse(
        &self,
        _coordinates: Coordinates,
        timeout: Duration,
    ) -> std::result::Result<Option<String>, GeocodeError> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            ProviderBehaviour::Resolve { address, .. } => Ok(Some(address.clone())),
            ProviderBehaviour::NoMatch => Ok(None),
            ProviderBehaviour::Unavailable => {
                Err(GeocodeError::Unavailable("connection refused".into()))
            }
            ProviderBehaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(GeocodeError::TimedOut(timeout))
            }
        }
    }
}

pub const TEST_GEOCODING_TIMEOUT: Duration = Duration::from_millis(100);

/// Services wired to one in-memory store
pub struct TestServices {
    pub store: Arc<InMemoryStore>,
    pub posts: PostService,
    pub likes: LikeRegistry,
    pub comments: CommentService,
}

pub fn build_services(geocoder: Arc<StubGeocoder>) -> TestServices {
    let store = InMemoryStore::new();
    let resolver = LocationResolver::new(geocoder, TEST_GEOCODING_TIMEOUT);

    TestServices {
        posts: PostService::new(store.clone(), store.clone(), resolver),
        likes: LikeRegistry::new(store.clone()),
        comments: CommentService::new(store.clone(), store.clone()),
        store,
    }
}

pub const FORM_BOUNDARY: &str = "post-service-test-boundary";

/// `multipart/form-data` body builder for upload requests
#[derive(Default)]
pub struct FormBody {
    bytes: Vec<u8>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.part(&format!("form-data; name=\"{}\"", name), value.as_bytes());
        self
    }

    pub fn file(mut self, filename: &str, data: &[u8]) -> Self {
        self.part(
            &format!("form-data; name=\"images\"; filename=\"{}\"", filename),
            data,
        );
        self
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={}", FORM_BOUNDARY)
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{}--\r\n", FORM_BOUNDARY).as_bytes());
        self.bytes
    }

    fn part(&mut self, disposition: &str, data: &[u8]) {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: {}\r\n\r\n",
                FORM_BOUNDARY, disposition
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
    }
}
