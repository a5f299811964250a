// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::access::AccessError;
use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::services::ServiceError;
use crate::tree::TreeError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 422 Unprocessable Entity
    UnprocessableEntity {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::UnprocessableEntity { .. } => 422,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::UnprocessableEntity { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        if let ApiError::UnprocessableEntity { field_errors, .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UnprocessableEntity { .. } => "UNPROCESSABLE_ENTITY",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn unprocessable_entity(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ApiError::UnprocessableEntity {
            message: message.into(),
            field_errors,
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert domain error types to ApiError
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::not_found(format!("{} not found", msg)),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Validation { message, field_errors } => {
                ApiError::unprocessable_entity(message, field_errors)
            }
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            err @ ServiceError::RevisionMismatch { .. } => ApiError::conflict(err.to_string()),
            ServiceError::Access(err) => err.into(),
            ServiceError::Tree(err) => err.into(),
            ServiceError::Filter(err) => err.into(),
            ServiceError::Database(err) => err.into(),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::InvalidPermission(key) => {
                let mut field_errors = HashMap::new();
                field_errors.insert("permissions".to_string(), format!("Invalid permission key: {}", key));
                ApiError::unprocessable_entity("Invalid permission key", field_errors)
            }
            err @ (AccessError::NotMember { .. } | AccessError::Forbidden(_) | AccessError::Escalation(_)) => {
                ApiError::forbidden(err.to_string())
            }
        }
    }
}

impl From<TreeError> for ApiError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NotFound(id) => ApiError::not_found(format!("Tree item {} not found", id)),
            other => ApiError::unprocessable_entity(other.to_string(), HashMap::new()),
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::JsonError(e) => ApiError::invalid_json(e.to_string()),
            other => ApiError::bad_request(other.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::TeamNotFound(team) => ApiError::not_found(format!("Team {} not found", team)),
            DatabaseError::SlugTaken(slug) => ApiError::conflict(format!("Team slug {} is already in use", slug)),
            DatabaseError::InvalidTeamName(msg) => {
                let mut field_errors = HashMap::new();
                field_errors.insert("name".to_string(), msg.clone());
                ApiError::unprocessable_entity(msg, field_errors)
            }
            other => {
                // Log the real error but return generic message
                tracing::error!("Store error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn service_errors_map_to_status_codes() {
        let cases: Vec<(ServiceError, u16)> = vec![
            (ServiceError::not_found("Role x"), 404),
            (ServiceError::conflict("taken"), 409),
            (ServiceError::field("title", "too long"), 422),
            (ServiceError::forbidden("owner only"), 403),
            (
                ServiceError::RevisionMismatch {
                    expected: "a".into(),
                    current: "b".into(),
                },
                409,
            ),
            (AccessError::Forbidden("roles:manage".into()).into(), 403),
            (TreeError::NotFound(Uuid::nil()).into(), 404),
            (TreeError::DepthExceeded { limit: 3 }.into(), 422),
            (FilterError::InvalidLimit("negative".into()).into(), 400),
            (DatabaseError::TeamNotFound("acme".into()).into(), 404),
        ];

        for (err, status) in cases {
            let message = err.to_string();
            assert_eq!(ApiError::from(err).status_code(), status, "{}", message);
        }
    }

    #[test]
    fn json_body_carries_field_errors() {
        let err: ApiError = ServiceError::field("slug", "Slug is taken").into();
        let body = err.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNPROCESSABLE_ENTITY");
        assert_eq!(body["field_errors"]["slug"], "Slug is taken");

        let body = ApiError::not_found("Team acme not found").to_json();
        assert!(body.get("field_errors").is_none());
    }
}
