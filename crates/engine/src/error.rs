//! The module contains the error the engine can throw.
//!
//! Every error belongs to one of four stable [`ErrorKind`]s:
//!
//! - [`InvalidInput`] and [`InsufficientFunds`] are bad requests.
//! - [`KeyNotFound`] is thrown when an account does not exist.
//! - [`ExistingKey`] is thrown when an account id is already taken.
//! - [`Internal`] and [`Database`] are infrastructure failures.
//!
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Internal`]: EngineError::Internal
//!  [`Database`]: EngineError::Database
use std::fmt;

use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    InsufficientFunds(String),
    #[error("{0}")]
    KeyNotFound(String),
    #[error("{0}")]
    ExistingKey(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Machine-readable classification of an [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    AlreadyExists,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::InsufficientFunds(_) => ErrorKind::BadRequest,
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::ExistingKey(_) => ErrorKind::AlreadyExists,
            Self::Internal(_) | Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Stable upper-case error code, finer grained than [`ErrorKind`].
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            Self::KeyNotFound(_) => "NOT_FOUND",
            Self::ExistingKey(_) => "ALREADY_EXISTS",
            Self::Internal(_) | Self::Database(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            EngineError::InvalidInput("x".to_string()).kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            EngineError::InsufficientFunds("x".to_string()).kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            EngineError::KeyNotFound("x".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            EngineError::ExistingKey("x".to_string()).kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            EngineError::Database(DbErr::Custom("boom".to_string())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn display_is_the_message() {
        let err = EngineError::InsufficientFunds("insufficient balance".to_string());
        assert_eq!(err.to_string(), "insufficient balance");
        assert_eq!(err.code(), "INSUFFICIENT_FUNDS");
        assert_eq!(err.kind().as_str(), "bad_request");
    }
}
