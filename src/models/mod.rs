//! Data models for the trip planner
//!
//! This module contains the core domain models organized by concern:
//! - Place: Named geographic coordinates and route waypoints
//! - Category: The fixed set of point-of-interest categories
//! - Preferences: What the wizard collects from the traveller
//! - Itinerary: Destination plus stops, in route order

pub mod category;
pub mod itinerary;
pub mod place;
pub mod preferences;

// Re-export all public types for convenient access
pub use category::Category;
pub use itinerary::Itinerary;
pub use place::{Place, Waypoint};
pub use preferences::TripPreferences;
