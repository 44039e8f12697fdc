//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::types::{ArticleId, Category, Position};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleRecord {
    pub id: ArticleId,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub position: Position,
    pub category: Category,
    pub published_at: Option<OffsetDateTime>,
    pub created_at: Option<OffsetDateTime>,
}

impl ArticleRecord {
    /// Most recent of the publication and creation timestamps, if any.
    pub fn latest_timestamp(&self) -> Option<OffsetDateTime> {
        self.published_at.max(self.created_at)
    }
}
