use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{AqiInsight, CityOption},
    error::{ErrorDetail, ProviderError},
    protocol::{AqiResponse, CityListResponse, CurrentAqiQuery, CITIES_ROUTE, CURRENT_AQI_ROUTE},
};
use tracing::{debug, warn};

use crate::{config::ProviderSettings, AqiProvider};

/// Single-shot HTTP client for the AQI provider. Holds no retry state.
#[derive(Debug, Clone)]
pub struct HttpAqiProvider {
    http: Client,
    base_url: String,
}

impl HttpAqiProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|err| ProviderError::network(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorDetail>()
                .await
                .ok()
                .and_then(|body| body.detail);
            let err = if status == StatusCode::NOT_FOUND {
                ProviderError::not_found(format!("provider returned {status}"))
            } else {
                ProviderError::network(format!("provider returned {status}"))
            };
            return Err(err.with_detail(detail));
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| ProviderError::malformed(format!("unexpected response body: {err}")))
    }
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::network(format!("request timed out: {err}"))
    } else if err.is_decode() {
        ProviderError::malformed(format!("unreadable response body: {err}"))
    } else {
        ProviderError::network(format!("request failed: {err}"))
    }
}

#[async_trait]
impl AqiProvider for HttpAqiProvider {
    async fn list_cities(&self) -> Result<Vec<CityOption>, ProviderError> {
        let url = format!("{}{CITIES_ROUTE}", self.base_url);
        debug!("aqi: GET {url}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)
            .inspect_err(|err| warn!("aqi: city list request failed: {err}"))?;
        let body: CityListResponse = Self::decode(response)
            .await
            .inspect_err(|err| warn!("aqi: city list response rejected: {err}"))?;
        Ok(body.data)
    }

    async fn current_insight(&self, city: &str) -> Result<AqiInsight, ProviderError> {
        let url = format!("{}{CURRENT_AQI_ROUTE}", self.base_url);
        debug!("aqi: GET {url} city={city}");
        let response = self
            .http
            .get(&url)
            .query(&CurrentAqiQuery {
                city: city.to_string(),
            })
            .send()
            .await
            .map_err(map_transport_error)
            .inspect_err(|err| warn!("aqi: insight request failed city={city}: {err}"))?;
        let body: AqiResponse = Self::decode(response)
            .await
            .inspect_err(|err| warn!("aqi: insight response rejected city={city}: {err}"))?;
        Ok(body.data)
    }
}

#[cfg(test)]
#[path = "tests/provider_tests.rs"]
mod tests;
