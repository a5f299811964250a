use std::collections::HashMap;

use thiserror::Error;

use crate::access::AccessError;
use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::tree::TreeError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Revision mismatch: expected {expected}, current {current}")]
    RevisionMismatch { expected: String, current: String },

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    /// Validation failure on a single field.
    pub fn field(field: &str, problem: impl Into<String>) -> Self {
        let problem = problem.into();
        Self::validation(
            problem.clone(),
            HashMap::from([(field.to_string(), problem)]),
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
