//! Point-of-interest categories

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Kind of stop searched for around a destination
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Museum,
    Park,
    Restaurant,
    Shopping,
}

impl Category {
    /// Every category, in the order stops appear in an itinerary
    pub const ALL: [Category; 4] = [
        Category::Museum,
        Category::Park,
        Category::Restaurant,
        Category::Shopping,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Museum => "museum",
            Category::Park => "park",
            Category::Restaurant => "restaurant",
            Category::Shopping => "shopping",
        }
    }

    /// Free-text search query for this category around `destination`
    #[must_use]
    pub fn query(self, destination: &str) -> String {
        format!("{} in {}", self.as_str(), destination)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Category::Museum, "museum in Paris, France")]
    #[case(Category::Park, "park in Paris, France")]
    #[case(Category::Restaurant, "restaurant in Paris, France")]
    #[case(Category::Shopping, "shopping in Paris, France")]
    fn test_query(#[case] category: Category, #[case] expected: &str) {
        assert_eq!(category.query("Paris, France"), expected);
    }

    #[test]
    fn test_fixed_order() {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, ["museum", "park", "restaurant", "shopping"]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Park".parse::<Category>(), Ok(Category::Park));
        assert!("beach".parse::<Category>().is_err());
    }
}
