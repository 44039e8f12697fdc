use std::error::Error as StdError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{
    application::{feed::HomeFeedError, placement::PlacementError, repos::RepoError},
    infra::error::InfraError,
};

/// Diagnostic chain attached to error responses for the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// HTTP-facing error: a public message for the client, a report for the logs.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            public_message,
            report: ErrorReport::from_message(source, status, detail),
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        Self {
            status,
            public_message,
            report: ErrorReport::from_error(source, status, error),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.public_message }));
        let mut response = (self.status, body).into_response();
        self.report.attach(&mut response);
        response
    }
}

pub fn repo_error_to_http(source: &'static str, error: RepoError) -> HttpError {
    match &error {
        RepoError::NotFound => {
            HttpError::from_error(source, StatusCode::NOT_FOUND, "Resource not found", &error)
        }
        RepoError::InvalidInput { .. } => HttpError::from_error(
            source,
            StatusCode::BAD_REQUEST,
            "Request could not be processed",
            &error,
        ),
        RepoError::Integrity { .. } => HttpError::from_error(
            source,
            StatusCode::CONFLICT,
            "Request conflicts with stored data",
            &error,
        ),
        RepoError::Timeout => HttpError::from_error(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily unavailable",
            &error,
        ),
        RepoError::Persistence(_) => HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            &error,
        ),
    }
}

impl From<PlacementError> for HttpError {
    fn from(error: PlacementError) -> Self {
        const SOURCE: &str = "application::placement";
        match error {
            PlacementError::ConstraintViolation(field) => HttpError::new(
                SOURCE,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Request could not be processed",
                format!("`{field}` must not be empty"),
            ),
            PlacementError::NotFound(id) => HttpError::new(
                SOURCE,
                StatusCode::NOT_FOUND,
                "Article not found",
                format!("article {id} does not exist"),
            ),
            PlacementError::Repo(err) => repo_error_to_http(SOURCE, err),
        }
    }
}

impl From<HomeFeedError> for HttpError {
    fn from(error: HomeFeedError) -> Self {
        const SOURCE: &str = "application::feed";
        match error {
            HomeFeedError::Repo(err) => repo_error_to_http(SOURCE, err),
            HomeFeedError::Serialize(err) => HttpError::from_error(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                &err,
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_collects_the_source_chain() {
        let error = PlacementError::Repo(RepoError::from_persistence("connection reset"));
        let report = ErrorReport::from_error("test", StatusCode::INTERNAL_SERVER_ERROR, &error);
        assert_eq!(report.messages, vec!["persistence error: connection reset"]);
    }

    #[test]
    fn placement_errors_map_to_status_codes() {
        assert_eq!(
            HttpError::from(PlacementError::NotFound(9)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HttpError::from(PlacementError::ConstraintViolation("title")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            HttpError::from(PlacementError::Repo(RepoError::Timeout)).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn error_response_carries_report_extension() {
        let response = HttpError::from(PlacementError::NotFound(3)).into_response();
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(report.status, StatusCode::NOT_FOUND);
        assert_eq!(report.messages, vec!["article 3 does not exist"]);
    }
}
