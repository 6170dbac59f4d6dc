//! Trip preferences collected by the wizard

use serde::{Deserialize, Serialize};

/// What the traveller entered. Budget, pace and interests are shown back
/// in the itinerary panel but never influence the generated route.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TripPreferences {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub pace: String,
    /// Insertion-ordered, without duplicates
    #[serde(default)]
    pub interests: Vec<String>,
}

impl TripPreferences {
    #[must_use]
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_budget(mut self, budget: impl Into<String>) -> Self {
        self.budget = budget.into();
        self
    }

    #[must_use]
    pub fn with_pace(mut self, pace: impl Into<String>) -> Self {
        self.pace = pace.into();
        self
    }

    #[must_use]
    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for interest in interests {
            self.add_interest(interest);
        }
        self
    }

    /// Add an interest unless it is blank or already selected
    pub fn add_interest(&mut self, interest: impl Into<String>) {
        let interest = interest.into();
        if !interest.trim().is_empty() && !self.interests.contains(&interest) {
            self.interests.push(interest);
        }
    }

    /// Drop duplicate and blank interests, e.g. after deserialization
    pub fn normalize(&mut self) {
        let interests = std::mem::take(&mut self.interests);
        for interest in interests {
            self.add_interest(interest);
        }
    }

    /// `"a, b"` or `"None"` when nothing was selected
    #[must_use]
    pub fn interests_label(&self) -> String {
        if self.interests.is_empty() {
            "None".to_string()
        } else {
            self.interests.join(", ")
        }
    }
}
