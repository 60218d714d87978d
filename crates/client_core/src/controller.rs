use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use serde::Serialize;
use shared::{
    category::{advisory, classify, Category, FALLBACK_ADVICE},
    domain::{AqiInsight, CityOption},
    error::ProviderError,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::AqiProvider;

pub const CITY_LIST_ERROR: &str = "Unable to load city list";
pub const INSIGHT_ERROR: &str = "Unable to fetch AQI data";
/// Hourly samples kept on a committed insight.
pub const TREND_WINDOW: usize = 24;

/// Everything the presentation layer may read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncState {
    pub cities: Vec<CityOption>,
    pub insight: Option<AqiInsight>,
    pub loading: bool,
    pub error: Option<String>,
    /// Bumped by every refresh; results carrying an older value are dropped.
    pub generation: u64,
}

impl SyncState {
    /// City shown as selected: the insight's city, else the first listed one.
    pub fn selected_city(&self) -> Option<&str> {
        self.insight
            .as_ref()
            .map(|insight| insight.city.as_str())
            .or_else(|| self.cities.first().map(|city| city.city.as_str()))
    }
}

/// Owns `SyncState` and is its only writer.
///
/// Refreshes are last-requested-wins: each one captures the generation it
/// started under and only commits if no later refresh has started since.
/// After `teardown` no write happens at all; in-flight calls still run to
/// completion but their results are ignored.
pub struct SyncController {
    provider: Arc<dyn AqiProvider>,
    state: watch::Sender<SyncState>,
    torn_down: AtomicBool,
    default_city: Mutex<Option<String>>,
}

impl SyncController {
    pub fn new(provider: Arc<dyn AqiProvider>) -> Arc<Self> {
        let (state, _) = watch::channel(SyncState::default());
        Arc::new(Self {
            provider,
            state,
            torn_down: AtomicBool::new(false),
            default_city: Mutex::new(None),
        })
    }

    pub fn snapshot(&self) -> SyncState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    /// Loads the city list, then refreshes `default_city`. A failed city list
    /// stops here without requesting any insight.
    ///
    /// Calling it again performs a full reload of the list.
    pub async fn initialize(&self, default_city: &str) {
        if self.is_torn_down() {
            return;
        }
        *self.remembered_default() = Some(default_city.to_string());
        info!("aqi: initializing default_city={default_city}");

        let cities = match self.provider.list_cities().await {
            Ok(cities) => cities,
            Err(err) => {
                error!("aqi: city list unavailable kind={:?}: {err}", err.kind);
                // Supersede any refresh still in flight so `loading` and
                // `error` are never both set.
                self.commit(|state| {
                    state.generation += 1;
                    state.loading = false;
                    state.error = Some(CITY_LIST_ERROR.to_string());
                });
                return;
            }
        };

        let initial_city = resolve_default_city(&cities, default_city);
        let count = cities.len();
        if !self.commit(|state| state.cities = cities) {
            return;
        }
        info!("aqi: loaded cities count={count} initial_city={initial_city}");

        self.refresh_now(&initial_city).await;
    }

    /// Starts a refresh in the background. `loading` is already set when this
    /// returns; the handle may be dropped.
    pub fn refresh(self: &Arc<Self>, city: impl Into<String>) -> JoinHandle<()> {
        let city = city.into();
        let generation = self.begin_refresh(&city);
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let Some(generation) = generation else {
                return;
            };
            let result = controller.provider.current_insight(&city).await;
            controller.finish_refresh(generation, &city, result);
        })
    }

    /// Same transition as `refresh`, awaited inline.
    pub async fn refresh_now(&self, city: &str) {
        let Some(generation) = self.begin_refresh(city) else {
            return;
        };
        let result = self.provider.current_insight(city).await;
        self.finish_refresh(generation, city, result);
    }

    /// Refreshes the selected city, or the default passed to `initialize`
    /// when nothing is selected yet.
    pub fn retry(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let city = self
            .snapshot()
            .selected_city()
            .map(str::to_string)
            .or_else(|| self.remembered_default().clone())?;
        Some(self.refresh(city))
    }

    pub fn teardown(&self) {
        // Flip the flag under the channel lock so no commit can interleave.
        self.state.send_if_modified(|_| {
            self.torn_down.store(true, Ordering::Release);
            false
        });
        info!("aqi: controller torn down");
    }

    fn begin_refresh(&self, city: &str) -> Option<u64> {
        let mut generation = None;
        self.commit(|state| {
            state.generation += 1;
            state.loading = true;
            state.error = None;
            generation = Some(state.generation);
        });
        if let Some(generation) = generation {
            debug!("aqi: refresh started city={city} generation={generation}");
        }
        generation
    }

    fn finish_refresh(
        &self,
        generation: u64,
        city: &str,
        result: Result<AqiInsight, ProviderError>,
    ) {
        let committed = match result {
            Ok(insight) => {
                let insight = normalize_insight(insight);
                info!(
                    "aqi: insight city={} aqi={:?} category={} source={:?}",
                    insight.city,
                    insight.aqi,
                    insight.effective_category(),
                    insight.source
                );
                self.commit_if_current(generation, |state| {
                    state.insight = Some(insight);
                    state.loading = false;
                })
            }
            Err(err) => {
                warn!("aqi: refresh failed city={city} kind={:?}: {err}", err.kind);
                let message = err.user_message(INSIGHT_ERROR);
                self.commit_if_current(generation, |state| {
                    state.error = Some(message);
                    state.loading = false;
                })
            }
        };

        if !committed {
            debug!("aqi: discarded stale result city={city} generation={generation}");
        }
    }

    fn commit(&self, apply: impl FnOnce(&mut SyncState)) -> bool {
        self.state.send_if_modified(|state| {
            if self.torn_down.load(Ordering::Acquire) {
                return false;
            }
            apply(state);
            true
        })
    }

    fn commit_if_current(&self, generation: u64, apply: impl FnOnce(&mut SyncState)) -> bool {
        self.state.send_if_modified(|state| {
            if self.torn_down.load(Ordering::Acquire) || state.generation != generation {
                return false;
            }
            apply(state);
            true
        })
    }

    fn remembered_default(&self) -> MutexGuard<'_, Option<String>> {
        self.default_city
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// The listed entry matching `default_city`, else `default_city` verbatim so
/// the provider decides whether it is valid.
fn resolve_default_city(cities: &[CityOption], default_city: &str) -> String {
    cities
        .iter()
        .find(|option| option.city == default_city)
        .map(|option| option.city.clone())
        .unwrap_or_else(|| default_city.to_string())
}

fn normalize_insight(mut insight: AqiInsight) -> AqiInsight {
    if insight.is_fallback() {
        insight.aqi = None;
        insight.dominant_pollutant = None;
        insight.category = Some(Category::Unavailable);
        insight.pollutants.clear();
        insight.trend.clear();
        if insight
            .advice
            .as_deref()
            .map_or(true, |advice| advice.trim().is_empty())
        {
            insight.advice = Some(FALLBACK_ADVICE.to_string());
        }
        return insight;
    }

    if insight.category.is_none() {
        insight.category = insight.aqi.map(classify);
    }
    if insight.advice.is_none() {
        insight.advice = insight
            .category
            .and_then(advisory)
            .map(str::to_string);
    }
    if insight.trend.len() > TREND_WINDOW {
        let excess = insight.trend.len() - TREND_WINDOW;
        insight.trend.drain(..excess);
    }
    insight
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
