//! The module contains the errors the engine can throw.
//!
//! - [`Validation`] a submitted payload failed one or more field checks.
//! - [`KeyNotFound`] a record (or a category name) does not exist.
//! - [`StoreUnavailable`] the store could not be reached; retry-eligible.
//! - [`InvalidAmount`] malformed amounts reached the engine.
//! - [`InvalidFilter`] a filter value could not be parsed.
//! - [`Corrupted`] a stored row does not decode into a valid record.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`StoreUnavailable`]: EngineError::StoreUnavailable
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidFilter`]: EngineError::InvalidFilter
//!  [`Corrupted`]: EngineError::Corrupted
use sea_orm::DbErr;
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Corrupted record: {0}")]
    Corrupted(String),
    #[error(transparent)]
    Database(DbErr),
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl EngineError {
    /// Whether the failure is transient and the operation may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<DbErr> for EngineError {
    fn from(value: DbErr) -> Self {
        match value {
            DbErr::ConnectionAcquire(err) => Self::StoreUnavailable(err.to_string()),
            DbErr::Conn(err) => Self::StoreUnavailable(err.to_string()),
            other => Self::Database(other),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::StoreUnavailable(a), Self::StoreUnavailable(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidFilter(a), Self::InvalidFilter(b)) => a == b,
            (Self::Corrupted(a), Self::Corrupted(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
