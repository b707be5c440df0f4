use crate::db::errors::DbError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided, or login credentials rejected
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Session token failed verification. Deliberately carries no detail:
    /// malformed, bad signature, wrong key and expired all collapse into this
    /// one outcome so token verification cannot be used as an oracle.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Permission or tenant-gate denial. The body is identical for "exists
    /// but forbidden" and "does not exist" so tenants cannot be enumerated
    /// through error responses.
    #[error("Forbidden")]
    Forbidden,

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found (non-tenant-scoped lookups only)
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// SSO callback state did not match any outstanding sign-in attempt
    #[error("Sign-in attempt is no longer valid")]
    SsoStateMismatch,

    /// Upstream identity provider reported a failure
    #[error("Identity provider error: {description}")]
    SsoProvider { description: String },

    /// Deployment wizard session is missing, stale, or bound to a different
    /// context than the deploy that was attempted
    #[error("Deployment session is stale")]
    StaleDeploymentSession,

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::InvalidToken => StatusCode::FORBIDDEN,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::SsoStateMismatch => StatusCode::FORBIDDEN,
            Error::SsoProvider { .. } => StatusCode::BAD_GATEWAY,
            Error::StaleDeploymentSession => StatusCode::CONFLICT,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::InvalidToken => "Invalid or expired token".to_string(),
            Error::Forbidden => "Forbidden".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => {
                format!("{resource} with ID {id} not found")
            }
            Error::SsoStateMismatch => "Sign-in attempt is no longer valid. Please try signing in again.".to_string(),
            Error::SsoProvider { description } => {
                format!("Sign-in failed: {description}")
            }
            Error::StaleDeploymentSession => "Deployment session is stale. Re-open the deployment wizard and try again.".to_string(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { constraint, table, .. } => match (table.as_deref(), constraint.as_deref()) {
                    (Some("users"), Some(c)) if c.contains("email") => "An account with this email address already exists".to_string(),
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::SsoProvider { .. } => {
                tracing::warn!("Identity provider error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::InvalidToken | Error::Forbidden | Error::SsoStateMismatch => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::StaleDeploymentSession => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        (status, self.user_message()).into_response()
    }
}

/// Convert from String errors (e.g., from external functions)
impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Internal { operation: msg }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
