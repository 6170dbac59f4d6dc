//! Point-of-interest lookup around a destination
//!
//! One search per [`Category`], at most one stop each. A category whose
//! lookup fails is skipped, so finding stops never fails as a whole.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::geocoding::{GeocodingError, PlaceSearch};
use crate::models::{Category, Place};

/// How the per-category lookups are issued
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    /// One request at a time, in category order
    Sequential,
    /// All categories at once; results are put back in category order
    #[default]
    Concurrent,
}

#[derive(Clone)]
pub struct PoiFinder {
    search: Arc<dyn PlaceSearch>,
    mode: LookupMode,
}

impl PoiFinder {
    pub fn new(search: Arc<dyn PlaceSearch>, mode: LookupMode) -> Self {
        Self { search, mode }
    }

    /// Find up to one stop per category, in [`Category::ALL`] order
    #[instrument(skip(self), fields(mode = ?self.mode))]
    pub async fn find_pois(&self, destination: &str) -> Vec<Place> {
        let results = match self.mode {
            LookupMode::Sequential => {
                let mut results = Vec::with_capacity(Category::ALL.len());
                for category in Category::ALL {
                    results.push(self.lookup_or_skip(category, destination).await);
                }
                results
            }
            // join_all yields in input order, not completion order
            LookupMode::Concurrent => {
                join_all(
                    Category::ALL
                        .into_iter()
                        .map(|category| self.lookup_or_skip(category, destination)),
                )
                .await
            }
        };

        let pois: Vec<Place> = results.into_iter().flatten().collect();
        info!("Found {} points of interest in '{}'", pois.len(), destination);
        pois
    }

    /// First match for `category` around `destination`, if any
    pub async fn lookup(
        &self,
        category: Category,
        destination: &str,
    ) -> Result<Option<Place>, GeocodingError> {
        let query = category.query(destination);
        let hits = self.search.search(&query, Some(1)).await?;
        let Some(hit) = hits.first() else {
            debug!("No {} found in '{}'", category, destination);
            return Ok(None);
        };

        let (lat, lon) = hit.coordinates()?;
        let display_name = hit.display_name.as_deref().ok_or_else(|| {
            GeocodingError::ParseError(format!("{category} result without display_name"))
        })?;
        Ok(Some(Place::from_display_name(display_name, lat, lon)))
    }

    async fn lookup_or_skip(&self, category: Category, destination: &str) -> Option<Place> {
        match self.lookup(category, destination).await {
            Ok(place) => place,
            Err(e) => {
                warn!("Skipping {} lookup for '{}': {}", category, destination, e);
                None
            }
        }
    }
}
