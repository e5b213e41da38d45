/// Geocoding provider boundary
///
/// A `GeocodingClient` wraps exactly one external provider call per method and
/// carries no policy. Timeout enforcement and degradation live in
/// `services::location::LocationResolver`.
pub mod nominatim;

pub use nominatim::NominatimClient;

use crate::models::Coordinates;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Provider failure. Every variant is treated the same way by the resolver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("geocoding provider unavailable: {0}")]
    Unavailable(String),

    #[error("geocoding provider timed out after {0:?}")]
    TimedOut(Duration),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Best match for a free-text query; `Ok(None)` when the provider has no match.
    async fn forward(
        &self,
        query: &str,
        timeout: Duration,
    ) -> Result<Option<Coordinates>, GeocodeError>;

    /// Human-readable address for a point; `Ok(None)` when the provider has no match.
    async fn reverse(
        &self,
        coordinates: Coordinates,
        timeout: Duration,
    ) -> Result<Option<String>, GeocodeError>;
}
