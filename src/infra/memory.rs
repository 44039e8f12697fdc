//! In-process article store used when no database is configured and by tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::repos::{ArticlesRepo, ArticlesWriteRepo, NewArticle, RepoError};
use crate::domain::entities::ArticleRecord;
use crate::domain::types::{ArticleId, Position};
use crate::util::clock::{Clock, SystemClock};

#[derive(Default)]
struct Articles {
    rows: BTreeMap<ArticleId, ArticleRecord>,
    last_id: ArticleId,
}

pub struct InMemoryArticles {
    articles: RwLock<Articles>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryArticles {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryArticles {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            articles: RwLock::new(Articles::default()),
            clock,
        }
    }

    /// Store a record verbatim, keeping its id. Later inserts continue after
    /// the highest id seen.
    pub async fn seed(&self, record: ArticleRecord) {
        let mut articles = self.articles.write().await;
        articles.last_id = articles.last_id.max(record.id);
        articles.rows.insert(record.id, record);
    }

    pub async fn len(&self) -> usize {
        self.articles.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Every stored record, id ascending.
    pub async fn snapshot(&self) -> Vec<ArticleRecord> {
        self.articles.read().await.rows.values().cloned().collect()
    }
}

#[async_trait]
impl ArticlesRepo for InMemoryArticles {
    async fn find_by_id(&self, id: ArticleId) -> Result<Option<ArticleRecord>, RepoError> {
        Ok(self.articles.read().await.rows.get(&id).cloned())
    }

    async fn scan_recent(&self, limit: usize) -> Result<Vec<ArticleRecord>, RepoError> {
        let articles = self.articles.read().await;
        Ok(articles.rows.values().rev().take(limit).cloned().collect())
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

#[async_trait]
impl ArticlesWriteRepo for InMemoryArticles {
    async fn insert_article(&self, article: NewArticle) -> Result<ArticleRecord, RepoError> {
        let mut articles = self.articles.write().await;
        let id = articles
            .last_id
            .checked_add(1)
            .ok_or_else(|| RepoError::Integrity {
                message: "article id sequence exhausted".to_string(),
            })?;
        articles.last_id = id;

        let record = ArticleRecord {
            id,
            title: article.title,
            summary: article.summary,
            body: article.body,
            position: article.position,
            category: article.category,
            published_at: article.published_at,
            created_at: Some(self.clock.now()),
        };
        articles.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update_position(
        &self,
        id: ArticleId,
        position: Position,
    ) -> Result<ArticleRecord, RepoError> {
        let mut articles = self.articles.write().await;
        let record = articles.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        record.position = position;
        Ok(record.clone())
    }
}
