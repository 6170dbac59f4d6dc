//! Geocoding against a Nominatim-compatible search service
//!
//! [`PlaceSearch`] is the seam between the planner and the network: the
//! [`NominatimClient`] implements it over HTTP, and the [`Geocoder`] turns
//! the first search hit into a [`Place`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::GeocodingConfig;
use crate::models::Place;

/// Errors that can occur during a lookup
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// Connection to the search service failed
    #[error("Geocoding connection failed: {0}")]
    ConnectionFailed(String),

    /// The service answered with a non-success status
    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the service response
    #[error("Geocoding parse error: {0}")]
    ParseError(String),

    /// The query matched nothing
    #[error("Destination not found: {0}")]
    NotFound(String),

    /// Request timeout
    #[error("Geocoding request timed out")]
    Timeout,
}

/// One raw search result. Coordinates arrive as strings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SearchHit {
    /// Parse the latitude/longitude strings
    pub fn coordinates(&self) -> Result<(f64, f64), GeocodingError> {
        let lat: f64 = self
            .lat
            .trim()
            .parse()
            .map_err(|_| GeocodingError::ParseError(format!("Invalid latitude '{}'", self.lat)))?;
        let lon: f64 = self
            .lon
            .trim()
            .parse()
            .map_err(|_| GeocodingError::ParseError(format!("Invalid longitude '{}'", self.lon)))?;
        Ok((lat, lon))
    }
}

/// Free-text place search
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Search for `query`, optionally capping the number of results
    async fn search(&self, query: &str, limit: Option<u32>)
    -> Result<Vec<SearchHit>, GeocodingError>;
}

/// HTTP client for the Nominatim `/search` endpoint
#[derive(Debug)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    /// Create a new Nominatim client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodingError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self, query: &str, limit: Option<u32>) -> String {
        let mut url = format!(
            "{}/search?format=json&q={}",
            self.base_url,
            urlencoding::encode(query)
        );
        if let Some(limit) = limit {
            url.push_str(&format!("&limit={limit}"));
        }
        url
    }
}

#[async_trait]
impl PlaceSearch for NominatimClient {
    #[instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> Result<Vec<SearchHit>, GeocodingError> {
        let url = self.search_url(query, limit);
        debug!("Nominatim request URL: {}", url);
        let start_time = Instant::now();

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                GeocodingError::Timeout
            } else {
                GeocodingError::ConnectionFailed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            warn!("Search for '{}' answered with {}", query, response.status());
            return Err(GeocodingError::RequestFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let hits: Vec<SearchHit> = response
            .json()
            .await
            .map_err(|e| GeocodingError::ParseError(e.to_string()))?;

        debug!(
            "Search for '{}' returned {} results in {:.3}s",
            query,
            hits.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(hits)
    }
}

/// Resolves free-text destinations to coordinates
#[derive(Clone)]
pub struct Geocoder {
    search: Arc<dyn PlaceSearch>,
}

impl Geocoder {
    pub fn new(search: Arc<dyn PlaceSearch>) -> Self {
        Self { search }
    }

    /// Resolve `query` to a place named after the query itself
    #[instrument(skip(self))]
    pub async fn resolve(&self, query: &str) -> Result<Place, GeocodingError> {
        let hits = self.search.search(query, None).await?;
        let Some(first) = hits.first() else {
            warn!("No results found for destination '{}'", query);
            return Err(GeocodingError::NotFound(query.to_string()));
        };

        let (lat, lon) = first.coordinates()?;
        info!("Resolved '{}' to ({:.4}, {:.4})", query, lat, lon);
        Ok(Place::new(query, lat, lon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query() {
        let client = NominatimClient::new(&GeocodingConfig {
            base_url: "http://localhost:1234/".to_string(),
            ..GeocodingConfig::default()
        })
        .unwrap();

        assert_eq!(
            client.search_url("museum in Paris, France", Some(1)),
            "http://localhost:1234/search?format=json&q=museum%20in%20Paris%2C%20France&limit=1"
        );
        assert_eq!(
            client.search_url("Manila", None),
            "http://localhost:1234/search?format=json&q=Manila"
        );
    }

    #[test]
    fn test_hit_parsing() {
        let json = r#"[{"lat": "14.5906", "lon": "120.9799", "display_name": "Manila, Philippines"}]"#;
        let hits: Vec<SearchHit> = serde_json::from_str(json).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].coordinates().unwrap(), (14.5906, 120.9799));
        assert_eq!(hits[0].display_name.as_deref(), Some("Manila, Philippines"));
    }

    #[test]
    fn test_invalid_latitude() {
        let hit = SearchHit {
            lat: "north".to_string(),
            lon: "1.0".to_string(),
            display_name: None,
        };
        assert!(matches!(hit.coordinates(), Err(GeocodingError::ParseError(_))));
    }

    #[test]
    fn test_error_display() {
        let err = GeocodingError::NotFound("Qwxyzzzz".to_string());
        assert!(err.to_string().contains("Qwxyzzzz"));
        assert!(GeocodingError::Timeout.to_string().contains("timed out"));
    }
}
