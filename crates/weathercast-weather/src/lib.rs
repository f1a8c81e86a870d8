//! Weather fetch-or-cache service for Weathercast
//!
//! Resolves postal codes, pulls current conditions and a short daily
//! forecast from OpenWeatherMap, and keeps results in a TTL cache.

pub mod cache;
pub mod fetcher;
pub mod formatter;
pub mod geocode;
pub mod provider;
pub mod refresh;
pub mod types;

pub use cache::{CacheStore, Clock, ManualClock, MemoryCache, SystemClock};
pub use fetcher::{select_midday, FetcherSettings, WeatherFetcher};
pub use formatter::WeatherFormatter;
pub use geocode::{postal_code_for, GeoMatch, GeocodeError, Geocoder, NominatimGeocoder};
pub use provider::{ProviderError, WeatherProvider};
pub use refresh::{refresh_channel, RefreshQueue, RefreshWorker};
pub use types::*;
