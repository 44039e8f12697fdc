use newsdesk_api_types::{
    ArticleListResponse, ArticleView, HomeFeedResponse, PlacementResponse, PlacementUpdateView,
};

use crate::application::placement::PlacementOutcome;
use crate::domain::entities::ArticleRecord;
use crate::domain::home::HomeFeed;
use crate::domain::placement::PlacementUpdate;

pub fn article_view(article: &ArticleRecord) -> ArticleView {
    ArticleView {
        id: article.id,
        title: article.title.clone(),
        summary: article.summary.clone(),
        position: article.position.as_str().to_string(),
        category: article.category.as_str().to_string(),
        published_at: article.published_at,
        created_at: article.created_at,
    }
}

pub fn home_feed_response(feed: &HomeFeed) -> HomeFeedResponse {
    HomeFeedResponse {
        hero: feed.hero.as_ref().map(article_view),
        hero_promoted: feed.hero_promoted,
        featured: feed.featured.iter().map(article_view).collect(),
        general: feed.general.iter().map(article_view).collect(),
    }
}

fn update_view(update: &PlacementUpdate) -> PlacementUpdateView {
    PlacementUpdateView {
        id: update.id,
        position: update.position.as_str().to_string(),
    }
}

pub fn placement_response(outcome: &PlacementOutcome) -> PlacementResponse {
    PlacementResponse {
        article: article_view(&outcome.article),
        demotions: outcome.applied.iter().map(update_view).collect(),
        failed_demotions: outcome.failed.iter().map(update_view).collect(),
    }
}

pub fn article_list_response(articles: &[ArticleRecord]) -> ArticleListResponse {
    ArticleListResponse {
        items: articles.iter().map(article_view).collect(),
    }
}
