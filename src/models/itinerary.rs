//! Itinerary model: the destination followed by its stops

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::{Place, Waypoint};

/// Ordered destination + points of interest. The destination always comes
/// first; stops follow category order and are not deduplicated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Itinerary {
    pub destination: Place,
    pub stops: Vec<Place>,
}

impl Itinerary {
    #[must_use]
    pub fn new(destination: Place, stops: Vec<Place>) -> Self {
        Self { destination, stops }
    }

    /// Destination first, then every stop
    pub fn places(&self) -> impl Iterator<Item = &Place> {
        std::iter::once(&self.destination).chain(self.stops.iter())
    }

    /// Number of places, destination included
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.stops.len()
    }

    /// Never true, an itinerary always holds its destination
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Route waypoints in visiting order
    #[must_use]
    pub fn waypoints(&self) -> Vec<Waypoint> {
        self.places().map(Waypoint::from).collect()
    }

    /// Human-readable stop list
    #[must_use]
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.len());
        lines.push(format!("Main Destination: {}", self.destination.name));
        for (i, stop) in self.stops.iter().enumerate() {
            lines.push(format!("Stop {}: {}", i + 1, stop.name));
        }
        lines
    }
}

impl Display for Itinerary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.display_lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
