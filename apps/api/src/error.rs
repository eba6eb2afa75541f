//! Error handling for the Riskboard API
//!
//! [`ApiError`] is the one error type resolvers, routes and services return.
//! Every variant carries an HTTP status (for REST routes, via Axum's
//! `IntoResponse`) and a machine-readable code that GraphQL errors expose in
//! `extensions.code`. Server-side failures are logged in full and reported
//! to clients with a generic message.

use async_graphql::ErrorExtensions;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::graphql::loaders::LoadError;
use crate::repositories::StoreError;

/// REST error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client-side handling
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Main API error type
#[derive(Error, Debug)]
pub enum ApiError {
    // ========== Authentication ==========
    /// Mutation issued without a caller identity
    #[error("authentication required")]
    Unauthorized,

    // ========== Input ==========
    /// Argument failed validation
    #[error("{0}")]
    ValidationError(String),

    /// Argument is not a well-formed id
    #[error("invalid {field}: '{value}' is not a valid id")]
    InvalidId { field: &'static str, value: String },

    // ========== Resources ==========
    /// Referenced entity does not exist
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    // ========== Storage ==========
    /// Entity store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Batched lookup failure
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A dependency cannot serve requests right now
    #[error("service unavailable: {0}")]
    Unavailable(String),

    // ========== Internal ==========
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Catch-all for unexpected failures
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,

            Self::ValidationError(_) | Self::InvalidId { .. } => StatusCode::BAD_REQUEST,

            Self::NotFound { .. } => StatusCode::NOT_FOUND,

            Self::Store(err) => store_status(err),

            Self::Load(err) => match err {
                LoadError::NotFound { .. } => StatusCode::NOT_FOUND,
                LoadError::Store(err) => store_status(err),
                LoadError::Interrupted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },

            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,

            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error code string for client-side handling
    ///
    /// The same codes appear in GraphQL `extensions.code`.
    pub fn error_code(&self) -> &'static str {
        let status = self.status_code();
        match status {
            StatusCode::UNAUTHORIZED => "UNAUTHENTICATED",
            StatusCode::BAD_REQUEST => "BAD_USER_INPUT",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::SERVICE_UNAVAILABLE => "SERVICE_UNAVAILABLE",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Message safe to show to API clients
    pub fn client_message(&self) -> String {
        if self.status_code().is_server_error() {
            match self {
                Self::Unavailable(_) => "service temporarily unavailable".to_string(),
                _ => "an unexpected error occurred".to_string(),
            }
        } else {
            self.to_string()
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Log the error with severity matching its status code
    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Server error occurred"
            );
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                error = %self,
                code = self.error_code(),
                "Authorization error"
            );
        } else {
            tracing::debug!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Client error"
            );
        }
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::InvalidReference(_) => StatusCode::BAD_REQUEST,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Database(_) | StoreError::MissingResult { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        self.log();
        let code = self.error_code();
        async_graphql::Error::new(self.client_message()).extend_with(|_, e| {
            e.set("code", code);
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let body = ErrorResponse {
            code: self.error_code(),
            message: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api_err) => api_err,
            Err(err) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracing_test::traced_test;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::not_found("Risk", "123").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::validation("name must not be empty").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Store(StoreError::InvalidReference("category x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Store(StoreError::Unavailable("down".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_load_errors_follow_their_cause() {
        let not_found = ApiError::from(LoadError::NotFound {
            entity: "Category",
            key: "abc".into(),
        });
        assert_eq!(not_found.error_code(), "NOT_FOUND");
        assert_eq!(not_found.to_string(), "Category with id abc not found");

        let failed = ApiError::from(LoadError::Store(Arc::new(StoreError::MissingResult {
            entity: "Category",
            key: "abc".into(),
        })));
        assert_eq!(failed.error_code(), "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::Unauthorized.error_code(), "UNAUTHENTICATED");
        assert_eq!(
            ApiError::InvalidId {
                field: "id",
                value: "nope".into()
            }
            .error_code(),
            "BAD_USER_INPUT"
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = ApiError::Internal("connection string leaked".into());
        assert_eq!(err.client_message(), "an unexpected error occurred");

        let err = ApiError::validation("name must not be empty");
        assert_eq!(err.client_message(), "name must not be empty");
    }

    #[test]
    fn test_graphql_extension_code() {
        let err = ApiError::Unauthorized.extend();
        assert_eq!(err.message, "authentication required");
        let code = err
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::String("UNAUTHENTICATED".to_string())));
    }

    #[test]
    #[traced_test]
    fn test_server_errors_keep_details_in_logs() {
        ApiError::Internal("pool exhausted".into()).log();
        assert!(logs_contain("Server error occurred"));
        assert!(logs_contain("pool exhausted"));
    }
}
