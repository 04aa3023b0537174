//! The module contains the error the engine can throw.
//!
//! Filter errors are raised while turning request input into a [`Query`]:
//!
//! - [`MalformedFilterShape`] when a filter element is not an object with
//!   numeric `type` and `operator` tags.
//! - [`MissingFilterValue`] when `value` is absent.
//! - [`InvalidTypeCombination`] when the value (or operator) does not fit the
//!   field.
//! - [`InvalidFilterType`] / [`InvalidFilterOp`] for tags outside the known set.
//! - [`UnparseableTimestamp`] for date values that are not RFC 3339.
//!
//! Everything coming from the store is wrapped in [`Database`].
//!
//!  [`Query`]: crate::Query
//!  [`MalformedFilterShape`]: EngineError::MalformedFilterShape
//!  [`MissingFilterValue`]: EngineError::MissingFilterValue
//!  [`InvalidTypeCombination`]: EngineError::InvalidTypeCombination
//!  [`InvalidFilterType`]: EngineError::InvalidFilterType
//!  [`InvalidFilterOp`]: EngineError::InvalidFilterOp
//!  [`UnparseableTimestamp`]: EngineError::UnparseableTimestamp
//!  [`Database`]: EngineError::Database
use std::time::Duration;

use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Malformed filter: {0}")]
    MalformedFilterShape(String),
    #[error("Missing filter value at position {0}")]
    MissingFilterValue(usize),
    #[error("Invalid filter type and value combination: {0}")]
    InvalidTypeCombination(String),
    #[error("Invalid filter type: {0}")]
    InvalidFilterType(i64),
    #[error("Invalid filter operator: {0}")]
    InvalidFilterOp(i64),
    #[error("Unparseable timestamp: \"{0}\"")]
    UnparseableTimestamp(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid year: {0}")]
    InvalidYear(i32),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Store did not answer within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MalformedFilterShape(a), Self::MalformedFilterShape(b)) => a == b,
            (Self::MissingFilterValue(a), Self::MissingFilterValue(b)) => a == b,
            (Self::InvalidTypeCombination(a), Self::InvalidTypeCombination(b)) => a == b,
            (Self::InvalidFilterType(a), Self::InvalidFilterType(b)) => a == b,
            (Self::InvalidFilterOp(a), Self::InvalidFilterOp(b)) => a == b,
            (Self::UnparseableTimestamp(a), Self::UnparseableTimestamp(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidYear(a), Self::InvalidYear(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Unauthorized, Self::Unauthorized) => true,
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
