//! In-memory cache of finished PDFs.
//!
//! Rendering a resume costs one metadata request plus one large image per
//! page, so hosts that serve the same token repeatedly (a web front-end, a
//! retrying client) keep recent results here. Entries are keyed by
//! [`crate::DownloadConfig::cache_key`] and expire after a fixed TTL.
//!
//! When full, expired entries are purged first; if that frees nothing, the
//! entry closest to expiry is evicted. A TTL too large to represent as an
//! [`Instant`] (e.g. `Duration::MAX`) means entries never expire.

use crate::output::ResumePdf;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

struct CacheEntry {
    value: ResumePdf,
    /// `None` never expires.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |t| now <= t)
    }
}

/// Thread-safe TTL cache of [`ResumePdf`] results.
pub struct PdfCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_entries: usize,
    pub ttl_secs: u64,
}

impl Default for PdfCache {
    /// One hour TTL, 100 entries.
    fn default() -> Self {
        Self::new(Duration::from_secs(3600), 100)
    }
}

impl PdfCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return a fresh entry for `key`, dropping it if it has expired.
    pub fn get(&self, key: &str) -> Option<ResumePdf> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(Instant::now()) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                debug!("Cache entry expired: {}", key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: ResumePdf) {
        let key = key.into();
        let mut entries = self.lock();
        let now = Instant::now();

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            entries.retain(|_, e| e.is_fresh(now));
        }
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| (e.expires_at.is_none(), e.expires_at))
                .map(|(k, _)| k.clone())
            {
                debug!("Cache full, evicting {}", oldest);
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now.checked_add(self.ttl),
            },
        );
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            max_entries: self.max_entries,
            ttl_secs: self.ttl.as_secs(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
