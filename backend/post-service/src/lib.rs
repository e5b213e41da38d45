/// Post Service Library
///
/// Text posts with photos and an optional geocoded location, plus likes and
/// comments from other users.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Posts, images, comments, likes
/// - `services`: Location resolution, post creation workflow, like registry, comments
/// - `geocoding`: Geocoding provider boundary and the Nominatim client
/// - `db`: Store traits and PostgreSQL repositories
/// - `middleware`: Caller identity extraction
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod geocoding;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
