//! `travelplanner` - Trip planning wizard
//!
//! This library geocodes a destination, finds points of interest around it
//! and lays out a route and a textual itinerary, driven by a small wizard
//! that the CLI and the HTTP API share.

pub mod api;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod itinerary;
pub mod logging;
pub mod models;
pub mod poi;
pub mod routing;
pub mod web;
pub mod wizard;

// Re-export core types for public API
pub use config::PlannerConfig;
pub use error::PlannerError;
pub use geocoding::{Geocoder, GeocodingError, NominatimClient, PlaceSearch, SearchHit};
pub use itinerary::{ItineraryBuilder, PlannedRoute};
pub use models::{Category, Itinerary, Place, TripPreferences, Waypoint};
pub use poi::{LookupMode, PoiFinder};
pub use routing::{GeoJsonRenderer, MapView, RouteHandle, RouteRenderer, RouteSummary, ViewState};
pub use wizard::{ItineraryPanel, TripPlanner, WizardStep};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlannerError>;
