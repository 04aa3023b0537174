//! Internal helpers for input validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so entry writes and filters enforce the same invariants.

use chrono::{DateTime, Utc};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Case-fold text for substring search.
///
/// NFKC first so compatibility forms (ligatures, full-width letters) compare
/// equal to their plain spelling, then lowercase.
pub(crate) fn fold_text(value: &str) -> String {
    value.nfkc().collect::<String>().to_lowercase()
}

/// Parse an RFC 3339 timestamp and normalize it to UTC.
pub(crate) fn parse_timestamp(value: &str) -> ResultEngine<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| EngineError::UnparseableTimestamp(value.to_string()))
}

/// Parse an entry id received from a client.
pub(crate) fn parse_entry_id(value: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| EngineError::InvalidId(format!("invalid entry id: {value}")))
}

/// Reject NaN and infinities, which the store cannot order or sum.
pub(crate) fn ensure_finite_amount(amount: f64) -> ResultEngine<f64> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(EngineError::InvalidAmount(format!(
            "amount must be a finite number, got {amount}"
        )))
    }
}
