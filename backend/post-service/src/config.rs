/// Configuration management for Post Service
///
/// Loads configuration from environment variables. `main` calls
/// `dotenvy::dotenv()` first so a local `.env` file is honoured.
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Geocoding provider configuration
    pub geocoding: GeocodingConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Min connections in pool
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
}

/// Geocoding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Provider base URL (Nominatim-compatible)
    pub base_url: String,
    /// User agent sent with every provider request
    pub user_agent: String,
    /// Upper bound for a single provider call
    pub timeout_ms: u64,
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_geocoding_timeout_ms() -> u64 {
    10_000
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let is_production = app_env.eq_ignore_ascii_case("production");

        let cors = {
            let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                Ok(value) => value,
                Err(_) if is_production => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                Err(_) => "http://localhost:3000".to_string(),
            };

            if is_production && allowed_origins.trim() == "*" {
                return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
            }

            CorsConfig { allowed_origins }
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .map_err(|_| "DATABASE_URL environment variable not set".to_string())?,
            max_connections: parse_env_or("DATABASE_MAX_CONNECTIONS", default_max_connections()),
            min_connections: parse_env_or("DATABASE_MIN_CONNECTIONS", default_min_connections()),
            acquire_timeout_secs: parse_env_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 10),
        };

        let geocoding = GeocodingConfig {
            base_url: std::env::var("GEOCODING_BASE_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            user_agent: std::env::var("GEOCODING_USER_AGENT")
                .unwrap_or_else(|_| "social_network".to_string()),
            // Zero would expire every lookup before it starts
            timeout_ms: match parse_env_or("GEOCODING_TIMEOUT_MS", default_geocoding_timeout_ms()) {
                0 => default_geocoding_timeout_ms(),
                ms => ms,
            },
        };

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("POST_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("POST_SERVICE_PORT", 8084),
            },
            cors,
            database,
            geocoding,
        })
    }
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
