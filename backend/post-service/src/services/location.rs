/// Location resolution on top of a geocoding provider.
///
/// Every provider failure (unavailable, timed out, unusable answer) becomes an
/// absent result plus a `warn!`. Nothing here returns an error to the caller.
use crate::geocoding::{GeocodeError, GeocodingClient};
use crate::metrics::record_geocoding;
use crate::models::{Coordinates, ResolvedLocation};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const FORWARD: &str = "forward";
const REVERSE: &str = "reverse";

/// Turns free-text location queries into coordinates and place names.
///
/// One provider attempt per call, bounded by `timeout`. A call that overruns
/// is dropped and reported as "no result".
#[derive(Clone)]
pub struct LocationResolver {
    client: Arc<dyn GeocodingClient>,
    timeout: Duration,
}

impl LocationResolver {
    pub fn new(client: Arc<dyn GeocodingClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Coordinates for the provider's best match, if any.
    ///
    /// An empty or whitespace-only query never reaches the provider.
    pub async fn resolve_forward(&self, query: &str) -> Option<Coordinates> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let outcome = self
            .bounded(self.client.forward(query, self.timeout))
            .await;

        match outcome {
            Ok(Some(coordinates)) if coordinates.is_finite() => {
                record_geocoding(FORWARD, "resolved");
                Some(coordinates)
            }
            Ok(Some(coordinates)) => {
                warn!(
                    direction = FORWARD,
                    query,
                    latitude = coordinates.latitude,
                    longitude = coordinates.longitude,
                    "Geocoding provider returned non-finite coordinates; continuing without location"
                );
                record_geocoding(FORWARD, "no_match");
                None
            }
            Ok(None) => {
                debug!(direction = FORWARD, query, "No geocoding match");
                record_geocoding(FORWARD, "no_match");
                None
            }
            Err(err) => {
                warn!(
                    direction = FORWARD,
                    query,
                    error = %err,
                    "Geocoding degraded; continuing without location"
                );
                record_geocoding(FORWARD, outcome_label(&err));
                None
            }
        }
    }

    /// Human-readable address for a point, if any.
    ///
    /// Non-finite coordinates short-circuit without a provider call.
    pub async fn resolve_reverse(&self, coordinates: Coordinates) -> Option<String> {
        if !coordinates.is_finite() {
            return None;
        }

        let outcome = self
            .bounded(self.client.reverse(coordinates, self.timeout))
            .await;

        match outcome {
            Ok(Some(address)) if !address.trim().is_empty() => {
                record_geocoding(REVERSE, "resolved");
                Some(address)
            }
            Ok(_) => {
                debug!(
                    direction = REVERSE,
                    latitude = coordinates.latitude,
                    longitude = coordinates.longitude,
                    "No reverse geocoding match"
                );
                record_geocoding(REVERSE, "no_match");
                None
            }
            Err(err) => {
                warn!(
                    direction = REVERSE,
                    latitude = coordinates.latitude,
                    longitude = coordinates.longitude,
                    error = %err,
                    "Reverse geocoding degraded; continuing without location name"
                );
                record_geocoding(REVERSE, outcome_label(&err));
                None
            }
        }
    }

    /// Forward resolution followed by reverse resolution of the result.
    ///
    /// The name is only looked up when coordinates were found, so a resolved
    /// location never carries a name without coordinates.
    pub async fn resolve(&self, query: &str) -> ResolvedLocation {
        let Some(coordinates) = self.resolve_forward(query).await else {
            return ResolvedLocation::unresolved();
        };

        let name = self.resolve_reverse(coordinates).await;

        ResolvedLocation {
            coordinates: Some(coordinates),
            name,
        }
    }

    /// Outer bound in case the client ignores its own timeout.
    async fn bounded<F, T>(&self, call: F) -> Result<T, GeocodeError>
    where
        F: std::future::Future<Output = Result<T, GeocodeError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GeocodeError::TimedOut(self.timeout)),
        }
    }
}

fn outcome_label(err: &GeocodeError) -> &'static str {
    match err {
        GeocodeError::Unavailable(_) => "unavailable",
        GeocodeError::TimedOut(_) => "timed_out",
    }
}
