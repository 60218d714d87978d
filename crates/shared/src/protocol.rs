use serde::{Deserialize, Serialize};

use crate::domain::{AqiInsight, CityOption};

pub const CITIES_ROUTE: &str = "/api/cities";
pub const CURRENT_AQI_ROUTE: &str = "/api/aqi/current";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityListResponse {
    pub data: Vec<CityOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AqiResponse {
    pub data: AqiInsight,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAqiQuery {
    pub city: String,
}
