use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{ArticlesRepo, ArticlesWriteRepo, NewArticle, RepoError};
use crate::domain::entities::ArticleRecord;
use crate::domain::normalize::{normalize_category, normalize_position};
use crate::domain::types::{ArticleId, Position};

use super::{PostgresRepositories, map_sqlx_error};

const ARTICLE_COLUMNS: &str =
    "id, title, summary, body, position, category, published_at, created_at";

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    summary: String,
    body: String,
    position: String,
    category: String,
    published_at: Option<OffsetDateTime>,
    created_at: Option<OffsetDateTime>,
}

/// Stored labels may predate the canonical vocabulary; fold them on read.
impl From<ArticleRow> for ArticleRecord {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            summary: row.summary,
            body: row.body,
            position: normalize_position(&row.position),
            category: normalize_category(&row.category),
            published_at: row.published_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ArticlesRepo for PostgresRepositories {
    async fn find_by_id(&self, id: ArticleId) -> Result<Option<ArticleRecord>, RepoError> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1");
        let row = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ArticleRecord::from))
    }

    async fn scan_recent(&self, limit: usize) -> Result<Vec<ArticleRecord>, RepoError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY id DESC LIMIT $1");
        let rows = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(limit)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ArticleRecord::from).collect())
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        sqlx::query("SELECT 1")
            .execute(self.pool())
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl ArticlesWriteRepo for PostgresRepositories {
    async fn insert_article(&self, article: NewArticle) -> Result<ArticleRecord, RepoError> {
        let sql = format!(
            "INSERT INTO articles (title, summary, body, position, category, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ARTICLE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(article.title)
            .bind(article.summary)
            .bind(article.body)
            .bind(article.position.as_str())
            .bind(article.category.as_str())
            .bind(article.published_at)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_position(
        &self,
        id: ArticleId,
        position: Position,
    ) -> Result<ArticleRecord, RepoError> {
        let sql = format!(
            "UPDATE articles SET position = $2 WHERE id = $1 RETURNING {ARTICLE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(id)
            .bind(position.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(ArticleRecord::from).ok_or(RepoError::NotFound)
    }
}
