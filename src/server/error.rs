//! Maps handler faults onto the four statuses the API answers with.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreResult;
use crate::telemetry::API_ERRORS_CNTR;

/// Each variant carries an optional context appended to the fixed message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request")]
    BadRequest(Option<String>),
    #[error("Not Found")]
    NotFound(Option<String>),
    #[error("Method Not Allowed")]
    MethodNotAllowed(Option<String>),
    #[error("Unprocessable Entity")]
    Unprocessable(Option<String>),
}

pub type ApiResponse<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest(context)
            | ApiError::NotFound(context)
            | ApiError::MethodNotAllowed(context)
            | ApiError::Unprocessable(context) => context.as_deref(),
        }
    }

    pub fn message(&self) -> String {
        match self.context() {
            Some(context) => format!("{self}: {context}"),
            None => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        API_ERRORS_CNTR
            .with_label_values(&[status.as_str()])
            .inc();
        tracing::debug!(status = status.as_u16(), message = %self.message(), "request failed");
        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(Some(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(Some(rejection.body_text()))
    }
}

// Ids are integer path segments; anything else names no resource.
impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::NotFound(None)
    }
}

/// Lets a handler choose, per store call, which status a store fault maps to.
pub trait OrFailWith<T> {
    fn or_fail_with(self, error: fn(Option<String>) -> ApiError) -> ApiResponse<T>;
}

impl<T> OrFailWith<T> for StoreResult<T> {
    fn or_fail_with(self, error: fn(Option<String>) -> ApiError) -> ApiResponse<T> {
        self.map_err(|err| {
            tracing::error!(error = %err, "store operation failed");
            error(None)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreError;

    #[test]
    fn statuses_match_variants() {
        assert_eq!(ApiError::BadRequest(None).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound(None).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed(None).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::Unprocessable(None).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn message_appends_context() {
        assert_eq!(ApiError::NotFound(None).message(), "Not Found");
        assert_eq!(
            ApiError::NotFound(Some("question 7".to_owned())).message(),
            "Not Found: question 7"
        );
    }

    #[test]
    fn store_faults_map_to_the_chosen_status() {
        let result: StoreResult<()> = Err(StoreError::Missing {
            entity: "question",
            id: 1,
        });
        let err = result.or_fail_with(ApiError::Unprocessable).unwrap_err();
        assert!(matches!(err, ApiError::Unprocessable(None)));
    }
}
