use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use metrics::histogram;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::application::repos::{ArticlesRepo, RepoError};
use crate::cache::{CachedHomeFeed, HomeFeedCache};
use crate::domain::home::{HomeFeed, HomeLimits, compose_home};
use crate::presentation::views::home_feed_response;

pub const METRIC_HOME_COMPOSE_MS: &str = "newsdesk_home_compose_ms";

#[derive(Debug, Error)]
pub enum HomeFeedError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("failed to serialize home feed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct HomeFeedService {
    reader: Arc<dyn ArticlesRepo>,
    cache: Arc<HomeFeedCache>,
    limits: HomeLimits,
}

impl HomeFeedService {
    pub fn new(reader: Arc<dyn ArticlesRepo>, cache: Arc<HomeFeedCache>) -> Self {
        Self {
            reader,
            cache,
            limits: HomeLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: HomeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn cache(&self) -> &Arc<HomeFeedCache> {
        &self.cache
    }

    /// Compose the home feed straight from the store, bypassing the cache.
    pub async fn compose(&self) -> Result<HomeFeed, HomeFeedError> {
        let started_at = Instant::now();
        let window = self.reader.scan_recent(self.limits.window_size).await?;
        let feed = compose_home(&window, self.limits);
        histogram!(METRIC_HOME_COMPOSE_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        debug!(
            window = window.len(),
            hero = ?feed.hero.as_ref().map(|article| article.id),
            hero_promoted = feed.hero_promoted,
            featured = feed.featured.len(),
            general = feed.general.len(),
            "Home feed composed"
        );
        Ok(feed)
    }

    /// The serialized home feed, served from the cache while fresh.
    #[instrument(skip(self))]
    pub async fn home(&self) -> Result<Arc<CachedHomeFeed>, HomeFeedError> {
        if let Some(cached) = self.cache.lookup() {
            return Ok(cached);
        }

        let generation = self.cache.generation();
        let feed = self.compose().await?;
        let body = serde_json::to_vec(&home_feed_response(&feed))?;
        let entry = self
            .cache
            .build_entry(Bytes::from(body), feed.last_modified());
        Ok(self.cache.store(generation, entry))
    }
}
