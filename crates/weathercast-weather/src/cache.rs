//! TTL cache for fetched weather records.
//!
//! Entries expire passively: a read past `expires_at` is a miss and drops the
//! entry, and every write sweeps out whatever else has expired. Writes replace
//! the whole entry, so concurrent writers to one key simply race and the last
//! one wins.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::types::WeatherRecord;

/// Source of the current time, injectable so tests can move it forward.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += to_time_delta(by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Key-value store shared by the request path and the refresh job.
pub trait CacheStore: Send + Sync {
    /// True if a non-expired entry exists for `key`.
    fn exists(&self, key: &str) -> bool;

    /// The non-expired record stored under `key`, if any.
    fn read(&self, key: &str) -> Option<WeatherRecord>;

    /// Store `value` under `key`, replacing any previous entry.
    fn write(&self, key: &str, value: WeatherRecord, ttl: Duration);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: WeatherRecord,
    expires_at: DateTime<Utc>,
}

/// In-process [`CacheStore`].
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Expiry time of the live entry under `key`.
    pub fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.expires_at)
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCache {
    fn exists(&self, key: &str) -> bool {
        self.expires_at(key).is_some()
    }

    fn read(&self, key: &str) -> Option<WeatherRecord> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it unless a writer replaced it in the meantime.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
            tracing::debug!("Cache entry {} expired", key);
        }
        None
    }

    fn write(&self, key: &str, value: WeatherRecord, ttl: Duration) {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(to_time_delta(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let purged = before - entries.len();
        entries.insert(key.to_string(), CacheEntry { value, expires_at });
        drop(entries);

        if purged > 0 {
            tracing::debug!("Purged {} expired cache entries", purged);
        }
        tracing::debug!("Cached {} until {}", key, expires_at);
    }
}

fn to_time_delta(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::days(365 * 100))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::TimeZone;

    const THIRTY_MINUTES: Duration = Duration::from_secs(30 * 60);

    fn record(name: &str) -> WeatherRecord {
        WeatherRecord {
            location_name: Some(name.to_string()),
            temperature_c: Some(10.0),
            ..WeatherRecord::default()
        }
    }

    fn cache_at_noon() -> (Arc<ManualClock>, MemoryCache) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let cache = MemoryCache::with_clock(clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_write_then_read() {
        let (_, cache) = cache_at_noon();
        cache.write("weather_forecast_10001", record("New York"), THIRTY_MINUTES);

        assert!(cache.exists("weather_forecast_10001"));
        assert_eq!(
            cache.read("weather_forecast_10001"),
            Some(record("New York"))
        );
    }

    #[test]
    fn test_missing_key() {
        let (_, cache) = cache_at_noon();
        assert!(!cache.exists("nope"));
        assert!(cache.read("nope").is_none());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let (clock, cache) = cache_at_noon();
        cache.write("k", record("A"), THIRTY_MINUTES);

        clock.advance(Duration::from_secs(29 * 60));
        assert!(cache.read("k").is_some());

        clock.advance(Duration::from_secs(60));
        assert!(!cache.exists("k"));
        assert!(cache.read("k").is_none());
        assert!(cache.is_empty(), "expired entry should be dropped on read");
    }

    #[test]
    fn test_overwrite_replaces_value_and_expiry() {
        let (clock, cache) = cache_at_noon();
        cache.write("k", record("Old"), THIRTY_MINUTES);
        let first_expiry = cache.expires_at("k").unwrap();

        clock.advance(Duration::from_secs(10 * 60));
        cache.write("k", record("New"), THIRTY_MINUTES);

        assert_eq!(cache.read("k"), Some(record("New")));
        assert!(cache.expires_at("k").unwrap() > first_expiry);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expiry_is_write_time_plus_ttl() {
        let (clock, cache) = cache_at_noon();
        cache.write("k", record("A"), THIRTY_MINUTES);
        assert_eq!(
            cache.expires_at("k").unwrap(),
            clock.now() + chrono::Duration::minutes(30)
        );
    }

    #[test]
    fn test_write_sweeps_expired_single_use_keys() {
        let (clock, cache) = cache_at_noon();
        for i in 0..1000 {
            cache.write(&format!("weather_forecast_{i:05}"), record("A"), Duration::from_secs(60));
            clock.advance(Duration::from_secs(60 * 60));
        }

        assert_eq!(cache.len(), 1);
        assert!(!cache.exists("weather_forecast_00999"));

        cache.write("weather_forecast_live", record("B"), THIRTY_MINUTES);
        assert_eq!(cache.len(), 1);
        assert!(cache.exists("weather_forecast_live"));
    }

    #[test]
    fn test_write_keeps_live_entries() {
        let (clock, cache) = cache_at_noon();
        cache.write("a", record("A"), THIRTY_MINUTES);
        clock.advance(Duration::from_secs(60));
        cache.write("b", record("B"), THIRTY_MINUTES);

        assert_eq!(cache.len(), 2);
        assert!(cache.exists("a"));
    }

    #[test]
    fn test_purge_expired() {
        let (clock, cache) = cache_at_noon();
        cache.write("short", record("A"), Duration::from_secs(60));
        cache.write("long", record("B"), THIRTY_MINUTES);

        clock.advance(Duration::from_secs(5 * 60));
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.exists("long"));
    }
}
