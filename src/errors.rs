//! # Error Handling for CRUD Endpoints
//!
//! Every handler returns `Result<_, ApiError>`. The error maps to an HTTP
//! status code and a JSON body of the form `{"error": "..."}`; internal details
//! (database errors in particular) are logged with `tracing` and never sent to
//! the client.
//!
//! | variant            | status | cause                                         |
//! |--------------------|--------|-----------------------------------------------|
//! | `NotFound`         | 404    | no row with the requested primary key         |
//! | `MethodNotAllowed` | 405    | allowed verb without a handler (e.g. POST)    |
//! | `Parameter`        | 500    | bad `name::type` key, value, field or body    |
//! | `Database`         | 500    | any other `DbErr`                             |
//! | `Internal`         | 500    | serialization and other internal failures     |
//!
//! A verb that a model does not allow never reaches this type: it is answered
//! with a plain-text 400 by [`crate::response::respond_bad_request_verb`].

use axum::{
    Json,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use crate::params::ParamError;
use crate::payload::PayloadError;

#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found
    NotFound {
        /// Model name, e.g. "person"
        resource: String,
        /// Primary key that was looked up
        id: Option<String>,
    },

    /// 405 Method Not Allowed
    MethodNotAllowed { method: Method },

    /// 500 Internal Server Error raised by malformed request parameters.
    ///
    /// The message names the offending key so it is sent to the client.
    Parameter { message: String },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database {
        message: String,
        internal: DbErr,
    },

    /// 500 Internal Server Error - Generic internal error
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    #[must_use]
    pub fn method_not_allowed(method: Method) -> Self {
        Self::MethodNotAllowed { method }
    }

    /// Create a 500 error from a database error.
    ///
    /// The database error details are logged but NOT sent to the user.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Parameter { .. } | Self::Database { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The sanitized message sent to the client
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => {
                if let Some(id) = id {
                    format!("{resource} not found with a primary key of: {id}")
                } else {
                    format!("{resource} not found")
                }
            }
            Self::MethodNotAllowed { method } => format!("Method \"{method}\" not allowed"),
            Self::Parameter { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message.clone(),
        }
    }

    /// Log internal error details (not sent to user)
    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                message,
            } => {
                tracing::error!(details = %details, message = %message, "Internal error occurred");
            }
            Self::Parameter { message } => {
                tracing::error!(error = %message, "Malformed request parameters");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error body sent to clients
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// `DbErr::RecordNotFound` becomes 404, everything else a sanitized 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(msg) => {
                let resource = msg.split_whitespace().next().unwrap_or("Resource");
                Self::NotFound {
                    resource: resource.to_string(),
                    id: None,
                }
            }
            _ => Self::database(err),
        }
    }
}

impl From<ParamError> for ApiError {
    fn from(err: ParamError) -> Self {
        Self::Parameter {
            message: err.to_string(),
        }
    }
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        Self::Parameter {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal("Failed to serialize the response", Some(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_with_id() {
        let err = ApiError::not_found("person", Some("5".to_string()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "person not found with a primary key of: 5");
    }

    #[test]
    fn test_not_found_without_id() {
        let err = ApiError::not_found("person", None);
        assert_eq!(err.user_message(), "person not found");
    }

    #[test]
    fn test_method_not_allowed() {
        let err = ApiError::method_not_allowed(Method::POST);
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.user_message(), "Method \"POST\" not allowed");
    }

    #[test]
    fn test_param_error_is_server_error_with_message() {
        let err: ApiError = ParamError::BadKeyFormat {
            key: "age".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.user_message().contains("Error on GET parameter key: age."));
    }

    #[test]
    fn test_payload_error_is_server_error() {
        let err: ApiError = PayloadError::NotUtf8.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "Request body is not valid UTF-8");
    }

    #[test]
    fn test_dberr_record_not_found_becomes_404() {
        let api_err: ApiError = DbErr::RecordNotFound("person not found".to_string()).into();
        assert_eq!(api_err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(api_err.user_message(), "person not found");
    }

    #[test]
    fn test_all_other_dberr_become_sanitized_500() {
        let test_cases = vec![
            DbErr::Custom("Any custom error".to_string()),
            DbErr::Type("Type error".to_string()),
            DbErr::Json("JSON error".to_string()),
        ];

        for db_err in test_cases {
            let api_err: ApiError = db_err.into();
            assert_eq!(api_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(api_err.user_message(), "A database error occurred");
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        let err = ApiError::internal("Processing failed", Some("secret".to_string()));
        assert_eq!(err.user_message(), "Processing failed");
        assert_eq!(format!("{err}"), "Processing failed");
    }
}
