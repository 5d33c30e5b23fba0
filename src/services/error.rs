use std::collections::HashMap;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures produced by the place and user services. Each variant maps to one
/// HTTP status at the boundary (see `ApiError: From<ServiceError>`).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("{0}")]
    NotFound(String),

    /// Unknown account or unusable token
    #[error("{0}")]
    Authentication(String),

    /// Known account, wrong password
    #[error("{0}")]
    InvalidCredentials(String),

    /// Authenticated, but not the owner of the resource
    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    Conflict(String),

    /// Hashing, persistence, token signing or provider failure. `message` is
    /// what the client sees; `source` is only logged.
    #[error("{message}")]
    Infrastructure {
        message: &'static str,
        #[source]
        source: BoxError,
    },
}

impl ServiceError {
    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    /// Adapter for `map_err`: wraps any error as an infrastructure failure
    /// reported to clients with `message`.
    pub fn infra<E>(message: &'static str) -> impl FnOnce(E) -> Self
    where
        E: Into<BoxError>,
    {
        move |source| ServiceError::Infrastructure {
            message,
            source: source.into(),
        }
    }
}
