//! AQI banding: numeric value to category, display color and health guidance.
//!
//! Everything here is pure and synchronous.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder guidance used when live measurements are unavailable.
pub const FALLBACK_ADVICE: &str =
    "Live air quality data is temporarily unavailable for this location. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Good,
    Moderate,
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
    /// Sentinel for "no numeric AQI"; `classify` never returns it.
    Unavailable,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Good,
        Category::Moderate,
        Category::Unhealthy,
        Category::VeryUnhealthy,
        Category::Hazardous,
        Category::Unavailable,
    ];

    /// Categories that `classify` can produce, in ascending severity.
    pub const RATED: [Category; 5] = [
        Category::Good,
        Category::Moderate,
        Category::Unhealthy,
        Category::VeryUnhealthy,
        Category::Hazardous,
    ];

    /// Severity order, `None` for `Unavailable`.
    pub fn rank(self) -> Option<u8> {
        match self {
            Category::Good => Some(0),
            Category::Moderate => Some(1),
            Category::Unhealthy => Some(2),
            Category::VeryUnhealthy => Some(3),
            Category::Hazardous => Some(4),
            Category::Unavailable => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::Unhealthy => "Unhealthy",
            Category::VeryUnhealthy => "Very Unhealthy",
            Category::Hazardous => "Hazardous",
            Category::Unavailable => "Unavailable",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Inclusive upper bounds, ascending.
const BANDS: [(i64, Category); 4] = [
    (50, Category::Good),
    (100, Category::Moderate),
    (150, Category::Unhealthy),
    (200, Category::VeryUnhealthy),
];

/// Maps an AQI value to its band. Anything above the last bound is
/// `Hazardous`.
pub fn classify(aqi: i64) -> Category {
    BANDS
        .iter()
        .find(|(upper, _)| aqi <= *upper)
        .map(|(_, category)| *category)
        .unwrap_or(Category::Hazardous)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorToken {
    Neutral,
    Emerald,
    Amber,
    Rose,
    Purple,
    Maroon,
}

impl ColorToken {
    /// Solid color for terminals and other flat surfaces.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ColorToken::Neutral => (100, 116, 139),
            ColorToken::Emerald => (52, 211, 153),
            ColorToken::Amber => (251, 191, 36),
            ColorToken::Rose => (244, 63, 94),
            ColorToken::Purple => (168, 85, 247),
            ColorToken::Maroon => (185, 28, 28),
        }
    }
}

pub fn color_encoding(category: Option<Category>) -> ColorToken {
    let Some(category) = category else {
        return ColorToken::Neutral;
    };
    match category {
        Category::Good => ColorToken::Emerald,
        Category::Moderate => ColorToken::Amber,
        Category::Unhealthy => ColorToken::Rose,
        Category::VeryUnhealthy => ColorToken::Purple,
        Category::Hazardous => ColorToken::Maroon,
        Category::Unavailable => ColorToken::Neutral,
    }
}

/// Health guidance for a rated category. `Unavailable` has none.
pub fn advisory(category: Category) -> Option<&'static str> {
    match category {
        Category::Good => {
            Some("Air quality is excellent. Outdoor activities are safe for everyone.")
        }
        Category::Moderate => Some(
            "Air quality is acceptable. Sensitive individuals should limit prolonged outdoor exertion.",
        ),
        Category::Unhealthy => Some(
            "Sensitive groups should avoid outdoor exertion. Consider wearing a mask outdoors.",
        ),
        Category::VeryUnhealthy => {
            Some("Everyone should limit outdoor exertion. Stay indoors when possible.")
        }
        Category::Hazardous => {
            Some("Health warnings of emergency conditions. Avoid all outdoor activities.")
        }
        Category::Unavailable => None,
    }
}

#[cfg(test)]
#[path = "tests/category_tests.rs"]
mod tests;
