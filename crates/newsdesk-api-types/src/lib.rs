//! Wire types shared by the newsdesk HTTP surface and its clients.
//!
//! Positions and categories travel as their canonical string tokens
//! (`top_headline`, `featured`, `municipalities`, `general`). Requests may
//! carry any label; the server normalizes it before it reaches the
//! placement engine.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Public projection of a stored article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleView {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub position: String,
    pub category: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// Home page composition returned by `GET /api/home`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeFeedResponse {
    pub hero: Option<ArticleView>,
    /// `true` when no article holds the top headline and the hero was
    /// promoted from the window for this response only.
    pub hero_promoted: bool,
    pub featured: Vec<ArticleView>,
    pub general: Vec<ArticleView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePositionRequest {
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementUpdateView {
    pub id: i64,
    pub position: String,
}

/// Result of a placement write: the placed article plus every cascading
/// demotion that was applied alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementResponse {
    pub article: ArticleView,
    pub demotions: Vec<PlacementUpdateView>,
    /// Demotions the engine asked for but the store failed to apply.
    #[serde(default)]
    pub failed_demotions: Vec<PlacementUpdateView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleListResponse {
    pub items: Vec<ArticleView>,
}
