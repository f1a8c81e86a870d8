//! Fetch-or-cache orchestration.
//!
//! A fetch checks the cache first; on a miss it calls the current-conditions
//! endpoint, then the forecast endpoint, merges both into one record and
//! caches it. Every failure ends up in [`WeatherOutcome::Failure`]; nothing
//! is raised past this module.

use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use weathercast_core::{CredentialSource, WeatherConfig};

use crate::cache::CacheStore;
use crate::geocode::Geocoder;
use crate::provider::{CurrentConditions, ForecastSample, ProviderError, WeatherProvider};
use crate::types::{
    FetchError, ForecastEntry, WeatherOutcome, WeatherRecord, DEFAULT_COUNTRY_CODE,
    FETCH_FAILED_MESSAGE, MAX_FORECAST_ENTRIES, MIDDAY_MARKER,
};

const CACHE_KEY_PREFIX: &str = "weather_forecast_";

/// Explicit settings for [`WeatherFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherSettings {
    pub api_key: Option<String>,
    pub cache_ttl: Duration,
}

impl FetcherSettings {
    pub fn from_config(config: &WeatherConfig, credentials: &dyn CredentialSource) -> Self {
        Self {
            api_key: config.resolve_api_key(credentials),
            cache_ttl: Duration::from_secs(u64::from(config.cache_ttl_minutes) * 60),
        }
    }
}

pub struct WeatherFetcher {
    provider: WeatherProvider,
    geocoder: Arc<dyn Geocoder>,
    cache: Arc<dyn CacheStore>,
    settings: FetcherSettings,
}

impl WeatherFetcher {
    pub fn new(
        provider: WeatherProvider,
        geocoder: Arc<dyn Geocoder>,
        cache: Arc<dyn CacheStore>,
        settings: FetcherSettings,
    ) -> Self {
        Self {
            provider,
            geocoder,
            cache,
            settings,
        }
    }

    pub fn cache_key(postal_code: &str) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, postal_code)
    }

    /// Weather for `postal_code`, and whether it came from the cache.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, postal_code: &str) -> (WeatherOutcome, bool) {
        let cache_key = Self::cache_key(postal_code);

        if let Some(record) = self.cache.read(&cache_key) {
            tracing::info!("Serving {} from cache", cache_key);
            return (WeatherOutcome::Success(record), true);
        }

        (self.fetch_upstream(postal_code, &cache_key).await, false)
    }

    /// Fetch from upstream regardless of the cache and store the result.
    #[instrument(skip(self), level = "info")]
    pub async fn refresh(&self, postal_code: &str) -> WeatherOutcome {
        let cache_key = Self::cache_key(postal_code);
        self.fetch_upstream(postal_code, &cache_key).await
    }

    async fn fetch_upstream(&self, postal_code: &str, cache_key: &str) -> WeatherOutcome {
        let Some(api_key) = self.settings.api_key.as_deref().filter(|k| !k.trim().is_empty())
        else {
            tracing::warn!("No weather API key configured");
            return FetchError::MissingApiKey.into();
        };

        let country_code = self.country_code(postal_code).await;

        let current = match self.provider.current(postal_code, &country_code, api_key).await {
            Ok(current) => current,
            Err(e) => {
                let err = current_failure(e);
                tracing::warn!("Current conditions for {} failed: {}", postal_code, err);
                return err.into();
            }
        };

        let mut record = base_record(&current);

        match self.provider.forecast(postal_code, &country_code, api_key).await {
            Ok(samples) => record.forecast = select_midday(&samples),
            Err(e) => tracing::warn!("Forecast fetch failed for {}: {}", postal_code, e),
        }

        self.cache.write(cache_key, record.clone(), self.settings.cache_ttl);
        tracing::info!(
            "Fetched weather for {} ({} forecast days)",
            postal_code,
            record.forecast.len()
        );

        WeatherOutcome::Success(record)
    }

    /// Country used to disambiguate the postal code upstream.
    async fn country_code(&self, postal_code: &str) -> String {
        match self.geocoder.search(postal_code).await {
            Ok(Some(found)) => found
                .country_code
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string()),
            Ok(None) => DEFAULT_COUNTRY_CODE.to_string(),
            Err(e) => {
                tracing::debug!("Country lookup for {} failed: {}", postal_code, e);
                DEFAULT_COUNTRY_CODE.to_string()
            }
        }
    }
}

fn current_failure(e: ProviderError) -> FetchError {
    match e {
        ProviderError::Status { message, .. } => {
            FetchError::Upstream(message.unwrap_or_else(|| FETCH_FAILED_MESSAGE.to_string()))
        }
        ProviderError::Network(e) => FetchError::Transport(e.to_string()),
        ProviderError::Parse(msg) => FetchError::Transport(msg),
    }
}

fn base_record(current: &CurrentConditions) -> WeatherRecord {
    let main = current.main.as_ref();
    WeatherRecord {
        location_name: current.name.clone(),
        temperature_c: main.and_then(|m| m.temp),
        temp_max_c: main.and_then(|m| m.temp_max),
        temp_min_c: main.and_then(|m| m.temp_min),
        condition: current.primary_condition().map(str::to_string),
        forecast: Vec::new(),
    }
}

/// Keep the samples stamped at midday, first five, in upstream order.
///
/// Matching is on the time-of-day text only; an upstream schedule without a
/// 12:00:00 slot yields fewer entries.
pub fn select_midday(samples: &[ForecastSample]) -> Vec<ForecastEntry> {
    samples
        .iter()
        .filter(|sample| sample.dt_txt.contains(MIDDAY_MARKER))
        .take(MAX_FORECAST_ENTRIES)
        .map(|sample| ForecastEntry {
            date: sample.dt_txt.clone(),
            temp_c: sample.main.temp,
            condition: sample
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_default(),
        })
        .collect()
}
