use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH, LAST_MODIFIED},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    application::{error::HttpError, feed::HomeFeedService, repos::ArticlesRepo},
    cache::CachedHomeFeed,
};

use super::{
    db_health_response,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub home: Arc<HomeFeedService>,
    pub articles: Arc<dyn ArticlesRepo>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/home", get(home))
        .route("/_health", get(public_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn home(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    let entry = match state.home.home().await {
        Ok(entry) => entry,
        Err(err) => return HttpError::from(err).into_response(),
    };

    let cache_control = state.home.cache().config().cache_control();
    let not_modified = headers
        .get(IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| entry.matches_if_none_match(value));

    if not_modified {
        let mut response = StatusCode::NOT_MODIFIED.into_response();
        apply_validators(response.headers_mut(), &entry, &cache_control);
        return response;
    }

    let mut response = Response::new(Body::from(entry.body.clone()));
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    apply_validators(headers, &entry, &cache_control);
    response
}

fn apply_validators(headers: &mut HeaderMap, entry: &CachedHomeFeed, cache_control: &str) {
    if let Ok(value) = HeaderValue::from_str(cache_control) {
        headers.insert(CACHE_CONTROL, value);
    }
    if let Ok(value) = HeaderValue::from_str(&entry.etag) {
        headers.insert(ETAG, value);
    }
    if let Ok(value) = HeaderValue::from_str(&entry.last_modified_header()) {
        headers.insert(LAST_MODIFIED, value);
    }
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.articles.health_check().await)
}
