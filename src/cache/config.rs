//! Cache configuration.

use serde::Deserialize;
use time::Duration;

const DEFAULT_TTL_SECONDS: u64 = 60;

/// Home feed cache settings from `newsdesk.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve the home feed from the cache slot.
    pub enabled: bool,
    /// Freshness window of a stored entry, also advertised via `max-age`.
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl_seconds: settings.ttl_seconds.get(),
        }
    }
}

impl CacheConfig {
    /// Returns the TTL as a `time::Duration`, clamping to at least one second.
    pub fn ttl(&self) -> Duration {
        let seconds = i64::try_from(self.ttl_seconds.max(1)).unwrap_or(i64::MAX);
        Duration::seconds(seconds)
    }

    /// Value for the `Cache-Control` header of home responses.
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.ttl_seconds)
    }
}
