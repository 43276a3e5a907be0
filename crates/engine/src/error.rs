//! The module contains the error the engine can throw.
//!
//! Validation failures ([`InvalidAmount`], [`InvalidInput`],
//! [`InvalidWorkflow`], [`UnknownCurrency`], [`CyclicHierarchy`]) are raised
//! before anything is written. [`Conflict`] means the request raced with, or
//! came after, another decision; the caller can re-query the current status.
//! [`Database`] is a storage failure: the surrounding transaction has been
//! rolled back and the whole call can be retried.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvalidWorkflow`]: EngineError::InvalidWorkflow
//!  [`UnknownCurrency`]: EngineError::UnknownCurrency
//!  [`CyclicHierarchy`]: EngineError::CyclicHierarchy
//!  [`Conflict`]: EngineError::Conflict
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid workflow: {0}")]
    InvalidWorkflow(String),
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("Cyclic management hierarchy: {0}")]
    CyclicHierarchy(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// `true` when the failure came from storage and nothing was persisted,
    /// so the same call may be issued again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidWorkflow(a), Self::InvalidWorkflow(b)) => a == b,
            (Self::UnknownCurrency(a), Self::UnknownCurrency(b)) => a == b,
            (Self::CyclicHierarchy(a), Self::CyclicHierarchy(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
