//! Placement writes: persist the placed article, cascade demotions, drop the
//! cached home feed.
//!
//! Every write runs under one process-wide async mutex, so the scan that feeds
//! the hierarchy engine always sees the effects of the previous placement.

use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::application::repos::{ArticlesRepo, ArticlesWriteRepo, NewArticle, RepoError};
use crate::cache::HomeFeedCache;
use crate::domain::entities::ArticleRecord;
use crate::domain::normalize::{normalize_category_opt, normalize_position_opt};
use crate::domain::placement::{PlacementPolicy, PlacementUpdate};
use crate::domain::types::{ArticleId, Position};

pub const DEFAULT_SCAN_WINDOW: usize = 500;

pub const METRIC_PLACEMENT_DEMOTIONS: &str = "newsdesk_placement_demotions_total";
pub const METRIC_PLACEMENT_CASCADE_FAILURES: &str = "newsdesk_placement_cascade_failures_total";

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("article {0} not found")]
    NotFound(ArticleId),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateArticleCommand {
    pub title: String,
    pub summary: String,
    pub body: String,
    pub position: Option<String>,
    pub category: Option<String>,
    pub published_at: Option<OffsetDateTime>,
}

/// The placed article plus the demotions applied (or attempted) with it.
#[derive(Debug, Clone)]
pub struct PlacementOutcome {
    pub article: ArticleRecord,
    pub applied: Vec<PlacementUpdate>,
    pub failed: Vec<PlacementUpdate>,
}

#[derive(Default)]
struct CascadeReport {
    applied: Vec<PlacementUpdate>,
    failed: Vec<PlacementUpdate>,
}

#[derive(Clone)]
pub struct PlacementService {
    reader: Arc<dyn ArticlesRepo>,
    writer: Arc<dyn ArticlesWriteRepo>,
    cache: Arc<HomeFeedCache>,
    policy: PlacementPolicy,
    scan_window: usize,
    write_lock: Arc<Mutex<()>>,
}

impl PlacementService {
    pub fn new(
        reader: Arc<dyn ArticlesRepo>,
        writer: Arc<dyn ArticlesWriteRepo>,
        cache: Arc<HomeFeedCache>,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
            policy: PlacementPolicy::default(),
            scan_window: DEFAULT_SCAN_WINDOW,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_policy(mut self, policy: PlacementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of recent articles inspected when cascading demotions.
    pub fn with_scan_window(mut self, scan_window: usize) -> Self {
        self.scan_window = scan_window.max(1);
        self
    }

    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    #[instrument(skip_all, fields(position = tracing::field::Empty, id = tracing::field::Empty))]
    pub async fn create_article(
        &self,
        command: CreateArticleCommand,
    ) -> Result<PlacementOutcome, PlacementError> {
        ensure_non_empty(&command.title, "title")?;

        let position = normalize_position_opt(command.position.as_deref());
        let category = normalize_category_opt(command.category.as_deref());
        tracing::Span::current().record("position", position.as_str());

        let _guard = self.write_lock.lock().await;

        let article = self
            .writer
            .insert_article(NewArticle {
                title: command.title.trim().to_string(),
                summary: command.summary,
                body: command.body,
                position,
                category,
                published_at: command.published_at,
            })
            .await?;
        tracing::Span::current().record("id", article.id);

        let report = self.cascade(article.id, position).await;
        self.cache.invalidate();

        info!(
            id = article.id,
            position = %position,
            category = %article.category,
            demotions = report.applied.len(),
            failed = report.failed.len(),
            "Article created"
        );

        Ok(PlacementOutcome {
            article,
            applied: report.applied,
            failed: report.failed,
        })
    }

    /// Place an existing article. `raw_position` may be any label, including
    /// `None`, which places the article in `general`.
    #[instrument(skip(self), fields(position = tracing::field::Empty))]
    pub async fn update_position(
        &self,
        id: ArticleId,
        raw_position: Option<&str>,
    ) -> Result<PlacementOutcome, PlacementError> {
        let position = normalize_position_opt(raw_position);
        tracing::Span::current().record("position", position.as_str());

        let _guard = self.write_lock.lock().await;

        let article = match self.writer.update_position(id, position).await {
            Ok(article) => article,
            Err(RepoError::NotFound) => return Err(PlacementError::NotFound(id)),
            Err(err) => return Err(err.into()),
        };

        let report = self.cascade(id, position).await;
        self.cache.invalidate();

        info!(
            id,
            position = %position,
            demotions = report.applied.len(),
            failed = report.failed.len(),
            "Article placed"
        );

        Ok(PlacementOutcome {
            article,
            applied: report.applied,
            failed: report.failed,
        })
    }

    async fn cascade(&self, changed_id: ArticleId, position: Position) -> CascadeReport {
        let mut report = CascadeReport::default();
        if !position.is_constrained() {
            return report;
        }

        let population = match self.reader.scan_recent(self.scan_window).await {
            Ok(population) => population,
            Err(err) => {
                counter!(METRIC_PLACEMENT_CASCADE_FAILURES, "stage" => "scan").increment(1);
                warn!(
                    id = changed_id,
                    position = %position,
                    error = %err,
                    "Cascade skipped: recent articles could not be scanned"
                );
                return report;
            }
        };

        for update in self.policy.reorganize(&population, changed_id, position) {
            match self.writer.update_position(update.id, update.position).await {
                Ok(_) => {
                    counter!(METRIC_PLACEMENT_DEMOTIONS, "to" => update.position.as_str())
                        .increment(1);
                    info!(
                        trigger = changed_id,
                        id = update.id,
                        to = %update.position,
                        "Article demoted"
                    );
                    report.applied.push(update);
                }
                Err(err) => {
                    counter!(METRIC_PLACEMENT_CASCADE_FAILURES, "stage" => "apply").increment(1);
                    warn!(
                        trigger = changed_id,
                        id = update.id,
                        to = %update.position,
                        error = %err,
                        "Cascading demotion failed"
                    );
                    report.failed.push(update);
                }
            }
        }

        report
    }
}

pub fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), PlacementError> {
    if value.trim().is_empty() {
        return Err(PlacementError::ConstraintViolation(field));
    }
    Ok(())
}
