use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use newsdesk_api_types::{CreateArticleRequest, UpdatePositionRequest};
use serde::Deserialize;

use crate::{
    application::{
        error::{HttpError, repo_error_to_http},
        placement::{CreateArticleCommand, PlacementService},
        repos::ArticlesRepo,
    },
    domain::types::ArticleId,
    presentation::views::{article_list_response, article_view, placement_response},
};

use super::{
    db_health_response,
    middleware::{log_responses, set_request_context},
};

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 500;
const SOURCE: &str = "infra::http::admin";

#[derive(Clone)]
pub struct AdminState {
    pub placement: Arc<PlacementService>,
    pub articles: Arc<dyn ArticlesRepo>,
}

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/articles", get(list_articles).post(create_article))
        .route("/articles/{id}", get(get_article))
        .route("/articles/{id}/position", put(update_position))
        .route("/_health", get(admin_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListQuery {
    limit: Option<usize>,
}

async fn create_article(
    State(state): State<AdminState>,
    Json(payload): Json<CreateArticleRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let command = CreateArticleCommand {
        title: payload.title,
        summary: payload.summary,
        body: payload.body,
        position: payload.position,
        category: payload.category,
        published_at: payload.published_at,
    };

    let outcome = state.placement.create_article(command).await?;
    Ok((StatusCode::CREATED, Json(placement_response(&outcome))))
}

async fn update_position(
    State(state): State<AdminState>,
    Path(id): Path<ArticleId>,
    Json(payload): Json<UpdatePositionRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let outcome = state
        .placement
        .update_position(id, payload.position.as_deref())
        .await?;
    Ok(Json(placement_response(&outcome)))
}

async fn list_articles(
    State(state): State<AdminState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let articles = state
        .articles
        .scan_recent(limit)
        .await
        .map_err(|err| repo_error_to_http(SOURCE, err))?;
    Ok(Json(article_list_response(&articles)))
}

async fn get_article(
    State(state): State<AdminState>,
    Path(id): Path<ArticleId>,
) -> Result<impl IntoResponse, HttpError> {
    let article = state
        .articles
        .find_by_id(id)
        .await
        .map_err(|err| repo_error_to_http(SOURCE, err))?
        .ok_or_else(|| {
            HttpError::new(
                SOURCE,
                StatusCode::NOT_FOUND,
                "Article not found",
                format!("article {id} does not exist"),
            )
        })?;
    Ok(Json(article_view(&article)))
}

async fn admin_health(State(state): State<AdminState>) -> Response {
    db_health_response(state.articles.health_check().await)
}
