//! Home page composition over a bounded window of recent articles.
//!
//! The composer never sees the full archive: callers hand it the most recent
//! `window_size` articles and it partitions them into hero, featured and
//! general buckets. All buckets keep window order (id descending).

use std::collections::HashSet;

use time::OffsetDateTime;

use crate::domain::entities::ArticleRecord;
use crate::domain::types::{ArticleId, Position};

pub const DEFAULT_WINDOW_SIZE: usize = 200;
pub const DEFAULT_FEATURED_LIMIT: usize = 6;
pub const DEFAULT_GENERAL_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeLimits {
    pub window_size: usize,
    pub featured: usize,
    pub general: usize,
}

impl Default for HomeLimits {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            featured: DEFAULT_FEATURED_LIMIT,
            general: DEFAULT_GENERAL_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeFeed {
    pub hero: Option<ArticleRecord>,
    /// The hero was promoted from the window because nothing holds the top
    /// headline. Nothing is persisted for the promotion.
    pub hero_promoted: bool,
    pub featured: Vec<ArticleRecord>,
    pub general: Vec<ArticleRecord>,
}

impl HomeFeed {
    pub fn is_empty(&self) -> bool {
        self.hero.is_none() && self.featured.is_empty() && self.general.is_empty()
    }

    pub fn articles(&self) -> impl Iterator<Item = &ArticleRecord> {
        self.hero
            .iter()
            .chain(self.featured.iter())
            .chain(self.general.iter())
    }

    /// Newest `published_at`/`created_at` across every placed article.
    pub fn last_modified(&self) -> Option<OffsetDateTime> {
        self.articles()
            .filter_map(ArticleRecord::latest_timestamp)
            .max()
    }
}

/// Partition the window into the home page buckets.
///
/// The window is re-sorted by id descending and truncated to
/// `limits.window_size`, so callers may pass a larger scan.
pub fn compose_home(window: &[ArticleRecord], limits: HomeLimits) -> HomeFeed {
    let mut ordered: Vec<&ArticleRecord> = window.iter().collect();
    ordered.sort_by(|left, right| right.id.cmp(&left.id));
    ordered.dedup_by_key(|article| article.id);
    ordered.truncate(limits.window_size);

    let mut hero = ordered
        .iter()
        .copied()
        .find(|article| article.position == Position::TopHeadline);
    let hero_id = hero.map(|article| article.id);

    let mut featured: Vec<&ArticleRecord> = ordered
        .iter()
        .copied()
        .filter(|article| article.position == Position::Featured && Some(article.id) != hero_id)
        .take(limits.featured)
        .collect();

    let mut hero_promoted = false;
    if hero.is_none() {
        let featured_ids: HashSet<ArticleId> = featured.iter().map(|article| article.id).collect();
        hero = ordered
            .iter()
            .copied()
            .find(|article| !featured_ids.contains(&article.id))
            .or_else(|| ordered.first().copied());

        if let Some(promoted) = hero {
            featured.retain(|article| article.id != promoted.id);
            hero_promoted = true;
        }
    }

    let hero_id = hero.map(|article| article.id);
    let general = ordered
        .iter()
        .copied()
        .filter(|article| article.position == Position::General && Some(article.id) != hero_id)
        .take(limits.general)
        .cloned()
        .collect();

    HomeFeed {
        hero: hero.cloned(),
        hero_promoted,
        featured: featured.into_iter().cloned().collect(),
        general,
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::datetime};

    use super::*;
    use crate::domain::types::Category;

    fn article(id: ArticleId, position: Position) -> ArticleRecord {
        let created = datetime!(2024-02-01 00:00 UTC) + Duration::hours(id);
        ArticleRecord {
            id,
            title: format!("article {id}"),
            summary: String::new(),
            body: String::new(),
            position,
            category: Category::GENERAL,
            published_at: Some(created),
            created_at: Some(created),
        }
    }

    fn ids(articles: &[ArticleRecord]) -> Vec<ArticleId> {
        articles.iter().map(|article| article.id).collect()
    }

    #[test]
    fn buckets_follow_positions_in_window_order() {
        let window = vec![
            article(9, Position::General),
            article(8, Position::Featured),
            article(7, Position::TopHeadline),
            article(6, Position::Municipalities),
            article(5, Position::Featured),
            article(4, Position::General),
        ];

        let feed = compose_home(&window, HomeLimits::default());

        assert_eq!(feed.hero.as_ref().map(|a| a.id), Some(7));
        assert!(!feed.hero_promoted);
        assert_eq!(ids(&feed.featured), vec![8, 5]);
        assert_eq!(ids(&feed.general), vec![9, 4]);
    }

    #[test]
    fn bucket_limits_are_applied_after_exclusions() {
        let mut window: Vec<ArticleRecord> = (1..=10).map(|id| article(id, Position::Featured)).collect();
        window.extend((11..=40).map(|id| article(id, Position::General)));
        window.push(article(41, Position::TopHeadline));

        let feed = compose_home(&window, HomeLimits::default());

        assert_eq!(feed.hero.as_ref().map(|a| a.id), Some(41));
        assert_eq!(ids(&feed.featured), vec![10, 9, 8, 7, 6, 5]);
        assert_eq!(feed.general.len(), DEFAULT_GENERAL_LIMIT);
        assert_eq!(feed.general.first().map(|a| a.id), Some(40));
        assert_eq!(feed.general.last().map(|a| a.id), Some(21));
    }

    #[test]
    fn heroless_window_promotes_first_unused_article() {
        let window = vec![
            article(5, Position::Featured),
            article(4, Position::General),
            article(3, Position::General),
        ];

        let feed = compose_home(&window, HomeLimits::default());

        assert!(feed.hero_promoted);
        assert_eq!(feed.hero.as_ref().map(|a| a.id), Some(4));
        assert_eq!(ids(&feed.featured), vec![5]);
        assert_eq!(ids(&feed.general), vec![3]);
    }

    #[test]
    fn promoted_hero_never_repeats_in_general() {
        let window = vec![article(2, Position::General), article(1, Position::General)];
        let feed = compose_home(&window, HomeLimits::default());

        let hero = feed.hero.expect("hero promoted");
        assert_eq!(hero.id, 2);
        assert!(feed.general.iter().all(|a| a.id != hero.id));
        assert_eq!(ids(&feed.general), vec![1]);
    }

    #[test]
    fn all_featured_window_still_gets_a_hero() {
        let window = vec![article(2, Position::Featured), article(1, Position::Featured)];
        let feed = compose_home(&window, HomeLimits::default());

        assert_eq!(feed.hero.as_ref().map(|a| a.id), Some(2));
        assert_eq!(ids(&feed.featured), vec![1]);
    }

    #[test]
    fn window_is_sorted_and_truncated() {
        let window = vec![
            article(1, Position::TopHeadline),
            article(3, Position::General),
            article(2, Position::General),
        ];
        let limits = HomeLimits {
            window_size: 2,
            ..HomeLimits::default()
        };

        let feed = compose_home(&window, limits);

        // Article 1 falls outside the window, so the hero is promoted.
        assert!(feed.hero_promoted);
        assert_eq!(feed.hero.as_ref().map(|a| a.id), Some(3));
        assert_eq!(ids(&feed.general), vec![2]);
    }

    #[test]
    fn empty_window_composes_empty_feed() {
        let feed = compose_home(&[], HomeLimits::default());
        assert!(feed.is_empty());
        assert!(!feed.hero_promoted);
        assert_eq!(feed.last_modified(), None);
    }

    #[test]
    fn last_modified_tracks_newest_placed_article() {
        let window = vec![article(3, Position::General), article(12, Position::TopHeadline)];
        let feed = compose_home(&window, HomeLimits::default());
        assert_eq!(
            feed.last_modified(),
            Some(datetime!(2024-02-01 00:00 UTC) + Duration::hours(12))
        );
    }
}
