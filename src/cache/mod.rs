//! Home feed response cache.
//!
//! A single process-wide slot holding the serialized home feed, its strong
//! validator and its expiry. Any placement write clears the slot; a
//! generation counter keeps recomputes that raced an invalidation from
//! storing stale bodies.
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 60
//! ```

mod config;
mod lock;
mod store;

pub use config::CacheConfig;
pub use store::{
    CachedHomeFeed, Generation, HomeFeedCache, METRIC_HOME_CACHE_HIT, METRIC_HOME_CACHE_INVALIDATE,
    METRIC_HOME_CACHE_MISS, strong_etag,
};
