//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::domain::entities::ArticleRecord;
use crate::domain::types::{ArticleId, Category, Position};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Fields of an article about to be inserted. Position and category are
/// already canonical.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub summary: String,
    pub body: String,
    pub position: Position,
    pub category: Category,
    pub published_at: Option<OffsetDateTime>,
}

#[async_trait]
pub trait ArticlesRepo: Send + Sync {
    async fn find_by_id(&self, id: ArticleId) -> Result<Option<ArticleRecord>, RepoError>;

    /// The `limit` most recent articles, id descending.
    async fn scan_recent(&self, limit: usize) -> Result<Vec<ArticleRecord>, RepoError>;

    async fn health_check(&self) -> Result<(), RepoError>;
}

#[async_trait]
pub trait ArticlesWriteRepo: Send + Sync {
    async fn insert_article(&self, article: NewArticle) -> Result<ArticleRecord, RepoError>;

    /// Rewrite only `position`. Missing ids yield [`RepoError::NotFound`].
    async fn update_position(
        &self,
        id: ArticleId,
        position: Position,
    ) -> Result<ArticleRecord, RepoError>;
}
