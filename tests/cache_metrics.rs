use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;
use newsdesk::application::feed::{HomeFeedService, METRIC_HOME_COMPOSE_MS};
use newsdesk::application::placement::{
    CreateArticleCommand, METRIC_PLACEMENT_CASCADE_FAILURES, METRIC_PLACEMENT_DEMOTIONS,
    PlacementService,
};
use newsdesk::application::repos::{ArticlesWriteRepo, NewArticle, RepoError};
use newsdesk::cache::{
    CacheConfig, HomeFeedCache, METRIC_HOME_CACHE_HIT, METRIC_HOME_CACHE_INVALIDATE,
    METRIC_HOME_CACHE_MISS,
};
use newsdesk::domain::entities::ArticleRecord;
use newsdesk::domain::types::{ArticleId, Position};
use newsdesk::infra::memory::InMemoryArticles;

/// Accepts inserts but refuses every position rewrite.
struct ReadOnlyDemotions {
    inner: Arc<InMemoryArticles>,
}

#[async_trait]
impl ArticlesWriteRepo for ReadOnlyDemotions {
    async fn insert_article(&self, article: NewArticle) -> Result<ArticleRecord, RepoError> {
        self.inner.insert_article(article).await
    }

    async fn update_position(
        &self,
        _id: ArticleId,
        _position: Position,
    ) -> Result<ArticleRecord, RepoError> {
        Err(RepoError::from_persistence("read-only replica"))
    }
}

fn command(title: &str, position: &str) -> CreateArticleCommand {
    CreateArticleCommand {
        title: title.to_string(),
        summary: String::new(),
        body: String::new(),
        position: Some(position.to_string()),
        category: None,
        published_at: None,
    }
}

#[tokio::test]
async fn placement_and_cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let store = Arc::new(InMemoryArticles::new());
    let cache = Arc::new(HomeFeedCache::with_system_clock(CacheConfig::default()));
    let placement = PlacementService::new(store.clone(), store.clone(), cache.clone());
    let home = HomeFeedService::new(store.clone(), cache.clone());

    placement
        .create_article(command("Primeira manchete", "top_headline"))
        .await
        .expect("first headline");
    placement
        .create_article(command("Segunda manchete", "top_headline"))
        .await
        .expect("second headline demotes the first");

    home.home().await.expect("miss");
    home.home().await.expect("hit");

    let failing = PlacementService::new(
        store.clone(),
        Arc::new(ReadOnlyDemotions {
            inner: store.clone(),
        }),
        cache,
    );
    let outcome = failing
        .create_article(command("Terceira manchete", "top_headline"))
        .await
        .expect("cascade failures do not fail the placement");
    assert!(!outcome.failed.is_empty());

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for metric in [
        METRIC_HOME_CACHE_HIT,
        METRIC_HOME_CACHE_MISS,
        METRIC_HOME_CACHE_INVALIDATE,
        METRIC_HOME_COMPOSE_MS,
        METRIC_PLACEMENT_DEMOTIONS,
        METRIC_PLACEMENT_CASCADE_FAILURES,
    ] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
