//! Itinerary generation
//!
//! Geocode the destination, then look up its points of interest and lay
//! out the route: destination center first, stops after it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::PlannerConfig;
use crate::geocoding::{Geocoder, NominatimClient, PlaceSearch};
use crate::models::{Itinerary, TripPreferences, Waypoint};
use crate::poi::PoiFinder;
use crate::{PlannerError, Result};

/// A generated itinerary together with the waypoints to route through
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedRoute {
    pub itinerary: Itinerary,
    pub waypoints: Vec<Waypoint>,
}

impl PlannedRoute {
    #[must_use]
    pub fn new(itinerary: Itinerary) -> Self {
        let waypoints = itinerary.waypoints();
        Self {
            itinerary,
            waypoints,
        }
    }

    #[must_use]
    pub fn center(&self) -> Waypoint {
        self.itinerary.destination.waypoint()
    }
}

#[derive(Clone)]
pub struct ItineraryBuilder {
    geocoder: Geocoder,
    poi_finder: PoiFinder,
    default_destination: String,
}

impl ItineraryBuilder {
    pub fn new(search: Arc<dyn PlaceSearch>, config: &PlannerConfig) -> Self {
        Self {
            geocoder: Geocoder::new(search.clone()),
            poi_finder: PoiFinder::new(search, config.planner.poi_lookup),
            default_destination: config.planner.default_destination.clone(),
        }
    }

    /// Build against the configured Nominatim service
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let client = NominatimClient::new(&config.geocoding)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// The destination that will actually be searched for
    #[must_use]
    pub fn destination_for(&self, preferences: &TripPreferences) -> String {
        if preferences.destination.trim().is_empty() {
            self.default_destination.clone()
        } else {
            preferences.destination.clone()
        }
    }

    /// Generate a fresh itinerary. Budget, pace and interests are ignored.
    #[instrument(skip(self, preferences), fields(destination))]
    pub async fn generate(&self, preferences: &TripPreferences) -> Result<PlannedRoute> {
        let destination = self.destination_for(preferences);
        tracing::Span::current().record("destination", destination.as_str());
        debug!("Generating itinerary for '{}'", destination);

        let center = self
            .geocoder
            .resolve(&destination)
            .await
            .map_err(|source| PlannerError::route_generation(destination.clone(), source))?;

        let stops = self.poi_finder.find_pois(&destination).await;
        let route = PlannedRoute::new(Itinerary::new(center, stops));

        info!(
            "Generated itinerary for '{}' with {} waypoints",
            destination,
            route.waypoints.len()
        );
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoding::{GeocodingError, SearchHit};
    use crate::poi::LookupMode;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Every query resolves to the same single hit, except `"Qwxyzzzz"`
    struct EchoSearch {
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PlaceSearch for EchoSearch {
        async fn search(
            &self,
            query: &str,
            _limit: Option<u32>,
        ) -> std::result::Result<Vec<SearchHit>, GeocodingError> {
            self.queries.lock().unwrap().push(query.to_string());
            if query.contains("Qwxyzzzz") {
                return Ok(Vec::new());
            }
            Ok(vec![SearchHit {
                lat: "14.5995".to_string(),
                lon: "120.9842".to_string(),
                display_name: Some(format!("{query}, Somewhere")),
            }])
        }
    }

    fn builder() -> (Arc<EchoSearch>, ItineraryBuilder) {
        let search = Arc::new(EchoSearch {
            queries: Mutex::new(Vec::new()),
        });
        let mut config = PlannerConfig::default();
        config.planner.poi_lookup = LookupMode::Sequential;
        let builder = ItineraryBuilder::new(search.clone(), &config);
        (search, builder)
    }

    #[tokio::test]
    async fn test_empty_destination_falls_back_to_default() {
        let (search, builder) = builder();

        let route = builder.generate(&TripPreferences::new("  ")).await.unwrap();

        assert_eq!(route.itinerary.destination.name, "Manila, Philippines");
        let queries = search.queries.lock().unwrap();
        assert_eq!(queries[0], "Manila, Philippines");
        assert_eq!(queries[1], "museum in Manila, Philippines");
    }

    #[tokio::test]
    async fn test_not_found_names_destination() {
        let (search, builder) = builder();

        let err = builder
            .generate(&TripPreferences::new("Qwxyzzzz"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Could not generate route for \"Qwxyzzzz\"");
        // no POI lookups after a failed geocode
        assert_eq!(search.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_preferences_do_not_change_the_route() {
        let (_, builder) = builder();
        let plain = TripPreferences::new("Paris, France");
        let dressed = plain
            .clone()
            .with_budget("luxury")
            .with_pace("relaxed")
            .with_interests(["art"]);

        let a = builder.generate(&plain).await.unwrap();
        let b = builder.generate(&dressed).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.waypoints.len(), 5);
        assert_eq!(a.center(), a.waypoints[0]);
    }
}
