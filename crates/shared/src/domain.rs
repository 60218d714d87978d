use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::{classify, Category};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityOption {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One pollutant's latest observation. `value` and `aqi` are absent when the
/// provider could not compute that pollutant's sub-index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub aqi: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub time: String,
    #[serde(default)]
    pub aqi: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    #[default]
    Live,
    Fallback,
}

/// Current air-quality snapshot for one city as served by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AqiInsight {
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub aqi: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_pollutant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub pollutants: Vec<PollutantReading>,
    /// Chronological hourly samples, oldest first.
    #[serde(default)]
    pub trend: Vec<TrendPoint>,
    #[serde(default)]
    pub source: DataSource,
}

impl AqiInsight {
    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }

    /// Provider category when supplied, otherwise derived from the numeric AQI.
    pub fn effective_category(&self) -> Category {
        match (self.category, self.aqi) {
            (Some(category), _) => category,
            (None, Some(aqi)) => classify(aqi),
            (None, None) => Category::Unavailable,
        }
    }

    /// Parses `timestamp`. Offset-less values are read as UTC since that is
    /// what the provider emits for naive datetimes.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
