use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{AqiInsight, CityOption},
    error::ProviderError,
};

pub mod config;
pub mod controller;
pub mod provider;

pub use config::{load_settings, ProviderSettings};
pub use controller::{SyncController, SyncState};
pub use provider::HttpAqiProvider;

/// Read boundary to the remote AQI provider. Implementations are single-shot:
/// retries belong to the caller.
#[async_trait]
pub trait AqiProvider: Send + Sync {
    async fn list_cities(&self) -> Result<Vec<CityOption>, ProviderError>;
    async fn current_insight(&self, city: &str) -> Result<AqiInsight, ProviderError>;
}

/// Builds a controller backed by the HTTP provider described by `settings`.
pub fn connect(settings: &ProviderSettings) -> Result<Arc<SyncController>, ProviderError> {
    let provider = HttpAqiProvider::new(settings)?;
    Ok(SyncController::new(Arc::new(provider)))
}
