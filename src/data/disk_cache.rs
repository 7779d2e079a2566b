//! On-disk Response Cache
//! Keeps each indicator's raw observations as JSON so restarts skip the network
//! while the entry is younger than the configured TTL.

use crate::data::source::{IndicatorSource, RawObservation, SourceError};
use crate::data::Indicator;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cache entry {path:?} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    fetched_at: u64,
    observations: Vec<RawObservation>,
}

/// Directory of per-indicator JSON entries.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, indicator: Indicator) -> PathBuf {
        self.dir
            .join(format!("{}.json", indicator.code().replace('.', "_")))
    }

    /// Fresh cached observations, `Ok(None)` when missing or expired.
    pub fn load(&self, indicator: Indicator) -> Result<Option<Vec<RawObservation>>, CacheError> {
        self.load_at(indicator, SystemTime::now())
    }

    pub fn load_at(
        &self,
        indicator: Indicator,
        now: SystemTime,
    ) -> Result<Option<Vec<RawObservation>>, CacheError> {
        let path = self.entry_path(indicator);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;
        let entry: CacheEntry =
            serde_json::from_str(&content).map_err(|source| CacheError::Json {
                path: path.clone(),
                source,
            })?;

        let age = now
            .duration_since(UNIX_EPOCH + Duration::from_secs(entry.fetched_at))
            .unwrap_or_default();
        if age > self.ttl {
            debug!(path = ?path, age_secs = age.as_secs(), "cache entry expired");
            return Ok(None);
        }

        Ok(Some(entry.observations))
    }

    pub fn store(
        &self,
        indicator: Indicator,
        observations: &[RawObservation],
    ) -> Result<(), CacheError> {
        self.store_at(indicator, observations, SystemTime::now())
    }

    pub fn store_at(
        &self,
        indicator: Indicator,
        observations: &[RawObservation],
        now: SystemTime,
    ) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.entry_path(indicator);
        let entry = CacheEntry {
            fetched_at: now
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            observations: observations.to_vec(),
        };
        let json = serde_json::to_string(&entry).map_err(|source| CacheError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| CacheError::Io { path, source })
    }
}

/// Wraps a source with the response cache. Cache failures only log.
pub struct CachedSource<S> {
    inner: S,
    cache: Option<ResponseCache>,
}

impl<S: IndicatorSource> CachedSource<S> {
    pub fn new(inner: S, cache: Option<ResponseCache>) -> Self {
        Self { inner, cache }
    }
}

impl<S: IndicatorSource> IndicatorSource for CachedSource<S> {
    fn fetch(&self, indicator: Indicator) -> Result<Vec<RawObservation>, SourceError> {
        let Some(cache) = &self.cache else {
            return self.inner.fetch(indicator);
        };

        match cache.load(indicator) {
            Ok(Some(observations)) => {
                debug!(code = indicator.code(), "using cached indicator series");
                return Ok(observations);
            }
            Ok(None) => {}
            Err(e) => warn!("ignoring unreadable cache entry: {}", e),
        }

        let observations = self.inner.fetch(indicator)?;
        if !observations.is_empty() {
            if let Err(e) = cache.store(indicator, &observations) {
                warn!("failed to write cache entry: {}", e);
            }
        }
        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> Vec<RawObservation> {
        vec![RawObservation {
            indicator: Indicator::Gdp,
            country: "Chile".to_string(),
            date: "2001".to_string(),
            value: Some(4_575.0),
        }]
    }

    struct CountingSource(AtomicUsize);

    impl IndicatorSource for CountingSource {
        fn fetch(&self, _indicator: Indicator) -> Result<Vec<RawObservation>, SourceError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(sample())
        }
    }

    #[test]
    fn fresh_entry_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), Duration::from_secs(3600));
        let now = SystemTime::now();

        cache.store_at(Indicator::Gdp, &sample(), now).unwrap();
        let loaded = cache.load_at(Indicator::Gdp, now + Duration::from_secs(60)).unwrap();
        assert_eq!(loaded, Some(sample()));
        assert!(cache.load_at(Indicator::NetMigration, now).unwrap().is_none());
    }

    #[test]
    fn expired_entry_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), Duration::from_secs(3600));
        let now = SystemTime::now();

        cache.store_at(Indicator::Gdp, &sample(), now).unwrap();
        let later = now + Duration::from_secs(2 * 3600);
        assert!(cache.load_at(Indicator::Gdp, later).unwrap().is_none());
    }

    #[test]
    fn corrupt_entry_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), Duration::from_secs(3600));
        fs::write(cache.entry_path(Indicator::Gdp), "not json").unwrap();
        assert!(matches!(
            cache.load(Indicator::Gdp),
            Err(CacheError::Json { .. })
        ));
    }

    #[test]
    fn cached_source_fetches_once_then_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), Duration::from_secs(3600));
        let source = CachedSource::new(CountingSource(AtomicUsize::new(0)), Some(cache));

        assert_eq!(source.fetch(Indicator::Gdp).unwrap(), sample());
        assert_eq!(source.fetch(Indicator::Gdp).unwrap(), sample());
        assert_eq!(source.inner.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn corrupt_entry_falls_back_to_source_and_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), Duration::from_secs(3600));
        fs::write(cache.entry_path(Indicator::Gdp), "not json").unwrap();
        let source = CachedSource::new(CountingSource(AtomicUsize::new(0)), Some(cache));

        assert_eq!(source.fetch(Indicator::Gdp).unwrap(), sample());
        assert_eq!(source.inner.0.load(Ordering::SeqCst), 1);

        let refreshed = ResponseCache::new(dir.path(), Duration::from_secs(3600));
        assert_eq!(refreshed.load(Indicator::Gdp).unwrap(), Some(sample()));
    }

    #[test]
    fn unwritable_cache_dir_still_returns_data() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the cache directory should be.
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, "").unwrap();
        let cache = ResponseCache::new(&blocked, Duration::from_secs(3600));
        let source = CachedSource::new(CountingSource(AtomicUsize::new(0)), Some(cache));

        assert_eq!(source.fetch(Indicator::Gdp).unwrap(), sample());
        assert_eq!(source.fetch(Indicator::Gdp).unwrap(), sample());
        assert_eq!(source.inner.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn disabled_cache_always_delegates() {
        let source = CachedSource::new(CountingSource(AtomicUsize::new(0)), None);
        source.fetch(Indicator::Gdp).unwrap();
        source.fetch(Indicator::Gdp).unwrap();
        assert_eq!(source.inner.0.load(Ordering::SeqCst), 2);
    }
}
