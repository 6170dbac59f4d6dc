//! Error types and handling for the trip planner

use thiserror::Error;

use crate::geocoding::GeocodingError;

/// Main error type for the trip planner
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Lookup failures outside of route generation
    #[error("Geocoding error: {0}")]
    Geocoding(#[from] GeocodingError),

    /// The destination could not be turned into a route
    #[error("Could not generate route for \"{destination}\"")]
    RouteGeneration {
        destination: String,
        #[source]
        source: GeocodingError,
    },

    /// Another itinerary generation is still running
    #[error("An itinerary is already being generated")]
    Busy,

    /// A reset happened while the itinerary was being generated
    #[error("Itinerary discarded after a reset")]
    Discarded,

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a route generation error for `destination`
    pub fn route_generation<S: Into<String>>(destination: S, source: GeocodingError) -> Self {
        Self::RouteGeneration {
            destination: destination.into(),
            source,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            PlannerError::Geocoding(_) => {
                "Unable to reach the geocoding service. Please check your internet connection."
                    .to_string()
            }
            // Not-found and transport failures read the same to the user.
            PlannerError::RouteGeneration { .. } => format!("{self}."),
            PlannerError::Busy => {
                "Your itinerary is still being generated. Please wait.".to_string()
            }
            PlannerError::Discarded => "The trip was reset before it was ready.".to_string(),
            PlannerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
