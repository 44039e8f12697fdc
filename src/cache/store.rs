//! Single-slot storage for the serialized home feed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use metrics::counter;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::util::clock::{Clock, SystemClock};
use crate::util::http_date::format_imf_fixdate;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

pub const METRIC_HOME_CACHE_HIT: &str = "newsdesk_home_cache_hit_total";
pub const METRIC_HOME_CACHE_MISS: &str = "newsdesk_home_cache_miss_total";
pub const METRIC_HOME_CACHE_INVALIDATE: &str = "newsdesk_home_cache_invalidate_total";

/// Invalidation counter observed before a recompute starts.
pub type Generation = u64;

/// A serialized home feed ready to be written to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedHomeFeed {
    pub body: Bytes,
    pub etag: String,
    pub last_modified: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl CachedHomeFeed {
    pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }

    pub fn last_modified_header(&self) -> String {
        format_imf_fixdate(self.last_modified)
    }

    /// Evaluate an `If-None-Match` header value against this entry.
    pub fn matches_if_none_match(&self, header: &str) -> bool {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == self.etag
        })
    }
}

/// Quoted hex SHA-256 of `body`.
pub fn strong_etag(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// The process-wide home feed cache.
///
/// Owned by the application context and shared via `Arc`; there is no global
/// instance.
pub struct HomeFeedCache {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    slot: RwLock<Option<Arc<CachedHomeFeed>>>,
    generation: AtomicU64,
}

impl HomeFeedCache {
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            slot: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_system_clock(config: CacheConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    pub fn generation(&self) -> Generation {
        self.generation.load(Ordering::SeqCst)
    }

    /// Return the stored entry if it is still fresh.
    ///
    /// A disabled cache, an empty or expired slot and a poisoned lock all
    /// count as a miss.
    pub fn lookup(&self) -> Option<Arc<CachedHomeFeed>> {
        if !self.config.enabled {
            return None;
        }

        let now = self.now();
        let cached = rw_read(&self.slot, SOURCE, "lookup")
            .and_then(|slot| slot.as_ref().filter(|entry| entry.is_fresh_at(now)).cloned());

        match cached {
            Some(entry) => {
                counter!(METRIC_HOME_CACHE_HIT).increment(1);
                debug!(cache = "home", outcome = "hit", "serving cached home feed");
                Some(entry)
            }
            None => {
                counter!(METRIC_HOME_CACHE_MISS).increment(1);
                debug!(cache = "home", outcome = "miss", "home feed must be recomputed");
                None
            }
        }
    }

    /// Wrap a freshly serialized body, stamping validator and expiry.
    ///
    /// `last_modified` falls back to the current time for an empty feed.
    pub fn build_entry(&self, body: Bytes, last_modified: Option<OffsetDateTime>) -> CachedHomeFeed {
        let now = self.now();
        CachedHomeFeed {
            etag: strong_etag(&body),
            body,
            last_modified: last_modified.unwrap_or(now),
            expires_at: now + self.config.ttl(),
        }
    }

    /// Store `entry` unless an invalidation happened after `generation` was
    /// observed. The entry is returned either way so the caller can serve it.
    pub fn store(&self, generation: Generation, entry: CachedHomeFeed) -> Arc<CachedHomeFeed> {
        let entry = Arc::new(entry);
        if !self.config.enabled {
            return entry;
        }

        let mut slot = rw_write(&self.slot, SOURCE, "store");
        if self.generation.load(Ordering::SeqCst) == generation {
            *slot = Some(Arc::clone(&entry));
        } else {
            debug!(
                cache = "home",
                observed = generation,
                "discarding recompute that raced an invalidation"
            );
        }
        entry
    }

    /// Drop the stored entry and reject in-flight recomputes.
    pub fn invalidate(&self) {
        let mut slot = rw_write(&self.slot, SOURCE, "invalidate");
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let had_entry = slot.take().is_some();
        drop(slot);

        counter!(METRIC_HOME_CACHE_INVALIDATE).increment(1);
        info!(cache = "home", generation, had_entry, "Home feed cache invalidated");
    }

    /// Whether an entry is currently stored, fresh or not.
    pub fn is_populated(&self) -> bool {
        rw_read(&self.slot, SOURCE, "is_populated").is_some_and(|slot| slot.is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use time::{Duration, macros::datetime};

    use super::*;
    use crate::util::clock::ManualClock;

    fn cache_with_clock() -> (HomeFeedCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(datetime!(2024-06-01 12:00 UTC)));
        let cache = HomeFeedCache::new(CacheConfig::default(), clock.clone());
        (cache, clock)
    }

    fn fill(cache: &HomeFeedCache, body: &'static str) -> Arc<CachedHomeFeed> {
        let generation = cache.generation();
        let entry = cache.build_entry(Bytes::from_static(body.as_bytes()), None);
        cache.store(generation, entry)
    }

    #[test]
    fn etag_is_quoted_sha256_hex() {
        let etag = strong_etag(b"abc");
        assert_eq!(
            etag,
            "\"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad\""
        );
    }

    #[test]
    fn entry_is_served_until_ttl_elapses() {
        let (cache, clock) = cache_with_clock();
        assert!(cache.lookup().is_none());

        let stored = fill(&cache, "{}");
        clock.advance(Duration::seconds(59));
        assert_eq!(cache.lookup().as_deref(), Some(stored.as_ref()));

        clock.advance(Duration::seconds(1));
        assert!(cache.lookup().is_none());
    }

    #[test]
    fn empty_feed_falls_back_to_now_for_last_modified() {
        let (cache, _clock) = cache_with_clock();
        let entry = cache.build_entry(Bytes::from_static(b"{}"), None);
        assert_eq!(entry.last_modified, datetime!(2024-06-01 12:00 UTC));
        assert_eq!(entry.expires_at, datetime!(2024-06-01 12:01 UTC));
        assert_eq!(entry.last_modified_header(), "Sat, 01 Jun 2024 12:00:00 GMT");
    }

    #[test]
    fn invalidate_clears_slot() {
        let (cache, _clock) = cache_with_clock();
        fill(&cache, "{}");
        assert!(cache.is_populated());

        cache.invalidate();
        assert!(!cache.is_populated());
        assert!(cache.lookup().is_none());
    }

    #[test]
    fn recompute_started_before_invalidation_is_not_stored() {
        let (cache, _clock) = cache_with_clock();
        let observed = cache.generation();
        let stale = cache.build_entry(Bytes::from_static(b"stale"), None);

        cache.invalidate();
        let served = cache.store(observed, stale);

        assert_eq!(served.body, Bytes::from_static(b"stale"));
        assert!(!cache.is_populated());
    }

    #[test]
    fn disabled_cache_never_stores() {
        let clock = Arc::new(ManualClock::new(datetime!(2024-06-01 12:00 UTC)));
        let config = CacheConfig {
            enabled: false,
            ..Default::default()
        };
        let cache = HomeFeedCache::new(config, clock);
        fill(&cache, "{}");
        assert!(!cache.is_populated());
        assert!(cache.lookup().is_none());
    }

    #[test]
    fn poisoned_slot_fails_open_then_heals_on_store() {
        let (cache, _clock) = cache_with_clock();
        fill(&cache, "old");

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = cache.slot.write().expect("write guard");
            panic!("poison the slot");
        }));
        assert!(cache.slot.is_poisoned());
        assert!(cache.lookup().is_none());

        let fresh = fill(&cache, "new");
        assert!(!cache.slot.is_poisoned());
        assert_eq!(cache.lookup().map(|entry| entry.body.clone()), Some(fresh.body.clone()));
    }

    #[test]
    fn if_none_match_accepts_lists_weak_tags_and_wildcard() {
        let (cache, _clock) = cache_with_clock();
        let entry = fill(&cache, "{}");
        let etag = entry.etag.clone();

        assert!(entry.matches_if_none_match(&etag));
        assert!(entry.matches_if_none_match(&format!("\"nope\", W/{etag}")));
        assert!(entry.matches_if_none_match("*"));
        assert!(!entry.matches_if_none_match("\"nope\""));
    }
}
