//! Placement hierarchy: capacity invariants over the constrained positions.
//!
//! At most one article holds [`Position::TopHeadline`] and at most
//! `featured_capacity` articles hold [`Position::Featured`]. Placing an
//! article into either slot cascades demotions down the hierarchy:
//! headline → featured → general. Demotion only ever rewrites `position`.
//!
//! The engine is pure. It reads the current population, returns the updates
//! that restore the invariants, and leaves applying them to the caller.

use std::cmp::Ordering;
use std::num::NonZeroUsize;

use crate::domain::entities::ArticleRecord;
use crate::domain::types::{ArticleId, Position};

pub const DEFAULT_FEATURED_CAPACITY: usize = 5;

/// A single position rewrite emitted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementUpdate {
    pub id: ArticleId,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPolicy {
    featured_capacity: NonZeroUsize,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            featured_capacity: NonZeroUsize::new(DEFAULT_FEATURED_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl PlacementPolicy {
    pub fn new(featured_capacity: NonZeroUsize) -> Self {
        Self { featured_capacity }
    }

    pub fn featured_capacity(&self) -> usize {
        self.featured_capacity.get()
    }

    /// Compute the cascading updates required to place `changed_id` at
    /// `new_position`.
    ///
    /// `articles` is the current population (or a recent window of it). The
    /// article being placed is ignored if present. The returned updates are
    /// ordered, carry each article at most once, and are individually
    /// idempotent.
    pub fn reorganize(
        &self,
        articles: &[ArticleRecord],
        changed_id: ArticleId,
        new_position: Position,
    ) -> Vec<PlacementUpdate> {
        let capacity = self.featured_capacity();
        let mut updates = Vec::new();

        match new_position {
            Position::TopHeadline => {
                let mut shelf = Vec::new();
                for article in articles.iter().filter(|article| article.id != changed_id) {
                    match article.position {
                        Position::TopHeadline => {
                            push_update(&mut updates, article.id, Position::Featured);
                            shelf.push(article);
                        }
                        Position::Featured => shelf.push(article),
                        _ => {}
                    }
                }

                if shelf.len() >= capacity {
                    let excess = shelf.len().saturating_sub(capacity).max(1);
                    demote_oldest(shelf, excess, &mut updates);
                }
            }
            Position::Featured => {
                let shelf: Vec<&ArticleRecord> = articles
                    .iter()
                    .filter(|article| {
                        article.id != changed_id && article.position == Position::Featured
                    })
                    .collect();

                if shelf.len() >= capacity {
                    // Leave exactly one free seat for the article being placed.
                    let excess = shelf.len() + 1 - capacity;
                    demote_oldest(shelf, excess, &mut updates);
                }
            }
            Position::Municipalities | Position::General => {}
        }

        updates
    }
}

/// [`PlacementPolicy::reorganize`] with the default featured capacity.
pub fn reorganize(
    articles: &[ArticleRecord],
    changed_id: ArticleId,
    new_position: Position,
) -> Vec<PlacementUpdate> {
    PlacementPolicy::default().reorganize(articles, changed_id, new_position)
}

/// Order used to pick demotion victims: earliest `published_at` first, with a
/// missing timestamp counting as the oldest, then lower id first.
pub fn demotion_order(left: &ArticleRecord, right: &ArticleRecord) -> Ordering {
    left.published_at
        .cmp(&right.published_at)
        .then_with(|| left.id.cmp(&right.id))
}

fn demote_oldest(
    mut shelf: Vec<&ArticleRecord>,
    count: usize,
    updates: &mut Vec<PlacementUpdate>,
) {
    shelf.sort_by(|left, right| demotion_order(left, right));
    for article in shelf.into_iter().take(count) {
        push_update(updates, article.id, Position::General);
    }
}

fn push_update(updates: &mut Vec<PlacementUpdate>, id: ArticleId, position: Position) {
    match updates.iter_mut().find(|update| update.id == id) {
        Some(existing) => existing.position = position,
        None => updates.push(PlacementUpdate { id, position }),
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime, macros::datetime};

    use super::*;
    use crate::domain::types::Category;

    fn day(n: i64) -> OffsetDateTime {
        datetime!(2024-01-01 08:00 UTC) + Duration::days(n - 1)
    }

    fn article(id: ArticleId, position: Position, published_at: Option<OffsetDateTime>) -> ArticleRecord {
        ArticleRecord {
            id,
            title: format!("article {id}"),
            summary: String::new(),
            body: String::new(),
            position,
            category: Category::GENERAL,
            published_at,
            created_at: published_at,
        }
    }

    fn apply(population: &mut Vec<ArticleRecord>, changed_id: ArticleId, position: Position) {
        let updates = reorganize(&population[..], changed_id, position);
        for update in updates {
            if let Some(article) = population.iter_mut().find(|a| a.id == update.id) {
                article.position = update.position;
            }
        }
        match population.iter_mut().find(|a| a.id == changed_id) {
            Some(article) => article.position = position,
            None => population.push(article(changed_id, position, Some(day(30)))),
        }
    }

    fn count(population: &[ArticleRecord], position: Position) -> usize {
        population.iter().filter(|a| a.position == position).count()
    }

    #[test]
    fn headline_cascade_demotes_previous_holder_and_oldest_featured() {
        let population = vec![
            article(1, Position::TopHeadline, Some(day(6))),
            article(2, Position::Featured, Some(day(1))),
            article(3, Position::Featured, Some(day(2))),
            article(4, Position::Featured, Some(day(3))),
            article(5, Position::Featured, Some(day(4))),
            article(6, Position::Featured, Some(day(5))),
        ];

        let updates = reorganize(&population, 7, Position::TopHeadline);

        assert_eq!(
            updates,
            vec![
                PlacementUpdate { id: 1, position: Position::Featured },
                PlacementUpdate { id: 2, position: Position::General },
            ]
        );
    }

    #[test]
    fn featured_placement_demotes_exactly_the_earliest_published() {
        let population = vec![
            article(10, Position::Featured, Some(day(4))),
            article(11, Position::Featured, Some(day(2))),
            article(12, Position::Featured, Some(day(5))),
            article(13, Position::Featured, Some(day(3))),
            article(14, Position::Featured, Some(day(9))),
        ];

        let updates = reorganize(&population, 20, Position::Featured);

        assert_eq!(
            updates,
            vec![PlacementUpdate { id: 11, position: Position::General }]
        );
    }

    #[test]
    fn equal_timestamps_demote_the_lower_id() {
        let stamp = Some(day(3));
        let population = vec![
            article(42, Position::Featured, stamp),
            article(17, Position::Featured, stamp),
            article(50, Position::Featured, Some(day(4))),
            article(51, Position::Featured, Some(day(5))),
            article(52, Position::Featured, Some(day(6))),
        ];

        let updates = reorganize(&population, 99, Position::Featured);
        assert_eq!(updates, vec![PlacementUpdate { id: 17, position: Position::General }]);
    }

    #[test]
    fn missing_timestamps_count_as_oldest_and_tie_on_id() {
        let population = vec![
            article(8, Position::Featured, None),
            article(3, Position::Featured, None),
            article(4, Position::Featured, Some(day(1))),
            article(5, Position::Featured, Some(day(2))),
            article(6, Position::Featured, Some(day(3))),
        ];

        let updates = reorganize(&population, 9, Position::Featured);
        assert_eq!(updates, vec![PlacementUpdate { id: 3, position: Position::General }]);
    }

    #[test]
    fn shelf_below_capacity_needs_no_demotion() {
        let population = vec![
            article(1, Position::Featured, Some(day(1))),
            article(2, Position::Featured, Some(day(2))),
        ];
        assert!(reorganize(&population, 3, Position::Featured).is_empty());
        assert!(reorganize(&population, 3, Position::TopHeadline).is_empty());
    }

    #[test]
    fn unconstrained_targets_emit_nothing() {
        let population = vec![
            article(1, Position::TopHeadline, Some(day(1))),
            article(2, Position::Featured, Some(day(2))),
        ];
        assert!(reorganize(&population, 1, Position::General).is_empty());
        assert!(reorganize(&population, 3, Position::Municipalities).is_empty());
    }

    #[test]
    fn placed_article_is_never_its_own_victim() {
        let population = vec![
            article(1, Position::Featured, None),
            article(2, Position::Featured, Some(day(2))),
            article(3, Position::Featured, Some(day(3))),
            article(4, Position::Featured, Some(day(4))),
            article(5, Position::Featured, Some(day(5))),
        ];

        // Re-placing an existing featured article leaves the shelf at capacity.
        assert!(reorganize(&population, 1, Position::Featured).is_empty());
        // Promoting it to headline frees its seat.
        assert!(reorganize(&population, 1, Position::TopHeadline).is_empty());
    }

    #[test]
    fn demoted_headline_can_fall_through_to_general() {
        let population = vec![
            article(1, Position::TopHeadline, None),
            article(2, Position::Featured, Some(day(1))),
            article(3, Position::Featured, Some(day(2))),
            article(4, Position::Featured, Some(day(3))),
            article(5, Position::Featured, Some(day(4))),
            article(6, Position::Featured, Some(day(5))),
        ];

        let updates = reorganize(&population, 7, Position::TopHeadline);
        assert_eq!(updates, vec![PlacementUpdate { id: 1, position: Position::General }]);
    }

    #[test]
    fn violated_invariants_heal_on_next_placement() {
        let mut population = vec![
            article(1, Position::TopHeadline, Some(day(1))),
            article(2, Position::TopHeadline, Some(day(2))),
        ];
        for id in 3..=9 {
            population.push(article(id, Position::Featured, Some(day(id))));
        }

        apply(&mut population, 10, Position::TopHeadline);

        assert_eq!(count(&population, Position::TopHeadline), 1);
        assert_eq!(count(&population, Position::Featured), 5);
        assert_eq!(population.len(), 10);
    }

    #[test]
    fn custom_capacity_is_respected() {
        let policy = PlacementPolicy::new(NonZeroUsize::new(2).expect("non-zero"));
        let population = vec![
            article(1, Position::Featured, Some(day(1))),
            article(2, Position::Featured, Some(day(2))),
        ];
        let updates = policy.reorganize(&population, 3, Position::Featured);
        assert_eq!(updates, vec![PlacementUpdate { id: 1, position: Position::General }]);
    }

    #[test]
    fn invariants_hold_across_placement_sequences() {
        let targets = [
            Position::TopHeadline,
            Position::Featured,
            Position::General,
            Position::Featured,
            Position::TopHeadline,
            Position::Municipalities,
            Position::Featured,
        ];
        let mut population: Vec<ArticleRecord> = Vec::new();
        let mut next_id = 1;

        for round in 0..60usize {
            let target = targets[round % targets.len()];
            let changed_id = if round % 3 == 0 && !population.is_empty() {
                population[(round * 7) % population.len()].id
            } else {
                next_id += 1;
                next_id
            };
            apply(&mut population, changed_id, target);

            assert!(count(&population, Position::TopHeadline) <= 1, "round {round}");
            assert!(count(&population, Position::Featured) <= DEFAULT_FEATURED_CAPACITY, "round {round}");
        }
    }
}
