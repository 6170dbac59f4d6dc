//! Place model for named geographic coordinates

use serde::{Deserialize, Serialize};

/// A named location, either a geocoded destination or a point of interest
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Place {
    /// Display name
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Place {
    /// Create a new place
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Create a place named after the part of `display_name` before the first comma
    #[must_use]
    pub fn from_display_name(display_name: &str, latitude: f64, longitude: f64) -> Self {
        let name = display_name.split(',').next().unwrap_or_default();
        Self::new(name, latitude, longitude)
    }

    #[must_use]
    pub fn waypoint(&self) -> Waypoint {
        Waypoint::new(self.latitude, self.longitude)
    }

    /// Format place as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A coordinate pair handed to the route renderer
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl Waypoint {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<&Place> for Waypoint {
    fn from(place: &Place) -> Self {
        place.waypoint()
    }
}
