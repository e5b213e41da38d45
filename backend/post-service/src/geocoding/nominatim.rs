/// Nominatim (OpenStreetMap) implementation of `GeocodingClient`.
use super::{GeocodeError, GeocodingClient};
use crate::config::GeocodingConfig;
use crate::models::Coordinates;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// One entry of a `/search` response. Nominatim encodes numbers as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct ReverseHit {
    display_name: Option<String>,
    error: Option<String>,
}

pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodeError::Unavailable(format!("client build failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T, GeocodeError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Unavailable(format!(
                "provider returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| map_transport_error(e, timeout))
    }
}

fn map_transport_error(err: reqwest::Error, timeout: Duration) -> GeocodeError {
    if err.is_timeout() {
        GeocodeError::TimedOut(timeout)
    } else {
        GeocodeError::Unavailable(err.to_string())
    }
}

fn parse_search_hits(hits: Vec<SearchHit>) -> Result<Option<Coordinates>, GeocodeError> {
    let Some(best) = hits.into_iter().next() else {
        return Ok(None);
    };

    let latitude = best
        .lat
        .parse::<f64>()
        .map_err(|_| GeocodeError::Unavailable(format!("invalid latitude '{}'", best.lat)))?;
    let longitude = best
        .lon
        .parse::<f64>()
        .map_err(|_| GeocodeError::Unavailable(format!("invalid longitude '{}'", best.lon)))?;

    Ok(Some(Coordinates::new(latitude, longitude)))
}

fn parse_reverse_hit(hit: ReverseHit) -> Option<String> {
    if let Some(error) = hit.error {
        debug!(%error, "reverse geocoding returned no match");
        return None;
    }
    hit.display_name.filter(|name| !name.trim().is_empty())
}

#[async_trait]
impl GeocodingClient for NominatimClient {
    async fn forward(
        &self,
        query: &str,
        timeout: Duration,
    ) -> Result<Option<Coordinates>, GeocodeError> {
        let hits: Vec<SearchHit> = self
            .get_json(
                "search",
                &[
                    ("q", query.to_string()),
                    ("format", "jsonv2".to_string()),
                    ("limit", "1".to_string()),
                ],
                timeout,
            )
            .await?;

        parse_search_hits(hits)
    }

    async fn reverse(
        &self,
        coordinates: Coordinates,
        timeout: Duration,
    ) -> Result<Option<String>, GeocodeError> {
        let hit: ReverseHit = self
            .get_json(
                "reverse",
                &[
                    ("lat", coordinates.latitude.to_string()),
                    ("lon", coordinates.longitude.to_string()),
                    ("format", "jsonv2".to_string()),
                ],
                timeout,
            )
            .await?;

        Ok(parse_reverse_hit(hit))
    }
}
