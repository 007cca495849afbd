//! Mapping of domain errors onto HTTP responses.
//!
//! Every failure leaves the server as `{"error": <message>, "code": <status>}`.
//! Storage, crypto and internal failures are logged and answered with a
//! generic body so that no internal detail reaches the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quire_auth::AuthError;
use quire_core::QuireError;
use quire_db::DbError;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}

#[derive(Debug)]
pub struct ApiError(pub QuireError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(QuireError::validation(message))
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self(QuireError::AuthenticationFailed {
            reason: reason.into(),
        })
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self(QuireError::Forbidden {
            reason: reason.into(),
        })
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            QuireError::Validation { .. } => StatusCode::BAD_REQUEST,
            QuireError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            QuireError::Forbidden { .. } => StatusCode::FORBIDDEN,
            QuireError::NotFound { .. } => StatusCode::NOT_FOUND,
            QuireError::Conflict { .. } => StatusCode::CONFLICT,
            QuireError::Database(_) | QuireError::Crypto(_) | QuireError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            QuireError::Validation { message } => message.clone(),
            QuireError::AuthenticationFailed { reason } | QuireError::Forbidden { reason } => {
                reason.clone()
            }
            QuireError::NotFound { entity, .. } => format!("{entity} not found"),
            QuireError::Conflict { .. } => self.0.to_string(),
            QuireError::Database(_) | QuireError::Crypto(_) | QuireError::Internal(_) => {
                "internal server error".into()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        let body = ErrorBody {
            error: self.message(),
            code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<QuireError> for ApiError {
    fn from(err: QuireError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self(err.into())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (QuireError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                QuireError::AuthenticationFailed {
                    reason: "no".into(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                QuireError::Forbidden {
                    reason: "no".into(),
                },
                StatusCode::FORBIDDEN,
            ),
            (QuireError::not_found("Page", "x"), StatusCode::NOT_FOUND),
            (QuireError::conflict("Page", "slug"), StatusCode::CONFLICT),
            (
                QuireError::Database("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = ApiError(QuireError::Database("connection refused at 10.0.0.3".into()));
        assert_eq!(err.message(), "internal server error");

        let err = ApiError(QuireError::not_found("page", "123"));
        assert_eq!(err.message(), "page not found");
    }
}
