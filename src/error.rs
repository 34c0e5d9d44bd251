use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Every failure a handler can produce. Conversion to an HTTP response
/// happens in one place so status-code policy stays consistent.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("resource not found")]
    NotFound,

    #[error("invalid or missing credentials")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    /// Permission denied on an edit/delete action. Instead of a hard
    /// error the client is redirected to the resource's detail page.
    #[error("denied, redirecting to {0}")]
    Denied(String),

    #[error("{field} {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("password hashing failed")]
    Hashing,

    #[error("token could not be issued")]
    Token,

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("i/o error")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => error_body(StatusCode::NOT_FOUND, "resource not found"),
            AppError::Unauthorized => {
                error_body(StatusCode::UNAUTHORIZED, "invalid or missing credentials")
            }
            AppError::Forbidden => error_body(StatusCode::FORBIDDEN, "forbidden"),
            AppError::Denied(location) => {
                (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
            }
            AppError::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": { field: message } })),
            )
                .into_response(),
            AppError::Conflict(what) => {
                error_body(StatusCode::CONFLICT, &format!("{what} already exists"))
            }
            AppError::Database(sqlx::Error::RowNotFound) => {
                error_body(StatusCode::NOT_FOUND, "resource not found")
            }
            AppError::Database(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                error_body(StatusCode::CONFLICT, "already exists")
            }
            AppError::Database(e) => {
                tracing::error!("database error: {e:?}");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
            AppError::Hashing | AppError::Token | AppError::Io(_) => {
                tracing::error!("internal error: {self:?}");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Minimal form validation: a required text field must be non-blank.
pub fn require_field(field: &'static str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation {
            field,
            message: "must not be empty",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_redirects_to_detail_page() {
        let resp = AppError::Denied("/api/posts/7".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[header::LOCATION], "/api/posts/7");
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let resp = AppError::from(sqlx::Error::RowNotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn blank_field_fails_validation() {
        assert!(require_field("title", "  ").is_err());
        assert!(require_field("title", "hello").is_ok());
    }
}
