//! Request checks done before the engine is called.

use api_types::report::YearInput;
use engine::{MAX_REPORT_YEAR, MIN_REPORT_YEAR, Page};

use crate::ServerError;

pub(crate) const MAX_PAGE_LIMIT: u64 = 100;

fn reject(message: String) -> ServerError {
    tracing::warn!("rejected request: {message}");
    ServerError::Generic(message)
}

/// Non-negative whole number sent as a JSON number.
fn whole_number(value: f64, name: &str) -> Result<u64, ServerError> {
    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(reject(format!("{name} must be a non-negative integer")));
    }
    Ok(value as u64)
}

/// Builds the retrieval window. `limit` must be in `0..=100`, where `0`
/// means no limit.
pub(crate) fn page(start: f64, limit: f64) -> Result<Page, ServerError> {
    let start = whole_number(start, "start")?;
    let limit = whole_number(limit, "limit")?;
    if limit > MAX_PAGE_LIMIT {
        return Err(reject(format!(
            "limit must be between 0 and {MAX_PAGE_LIMIT}, got {limit}"
        )));
    }
    Ok(Page::new(start, (limit > 0).then_some(limit)))
}

/// Resolves the report year from a number or a numeric string.
pub(crate) fn year(input: Option<YearInput>) -> Result<i32, ServerError> {
    let year = match input {
        None => return Err(reject("missing year field".to_string())),
        Some(YearInput::Number(value)) => {
            if !value.is_finite() || value.fract() != 0.0 {
                return Err(reject(format!("invalid year {value}")));
            }
            value
        }
        Some(YearInput::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map(|value| value as f64)
            .map_err(|_| reject(format!("invalid year format {text:?}")))?,
    };

    if year < MIN_REPORT_YEAR as f64 || year > MAX_REPORT_YEAR as f64 {
        return Err(reject(format!(
            "year must be between {MIN_REPORT_YEAR} and {MAX_REPORT_YEAR}"
        )));
    }
    Ok(year as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_limits() {
        assert_eq!(page(0.0, 10.0).ok(), Some(Page::new(0, Some(10))));
        assert_eq!(page(5.0, 100.0).ok(), Some(Page::new(5, Some(100))));
        assert_eq!(page(0.0, 0.0).ok(), Some(Page::new(0, None)));
        assert!(page(0.0, 150.0).is_err());
        assert!(page(0.0, 101.0).is_err());
        assert!(page(0.0, -1.0).is_err());
        assert!(page(-3.0, 10.0).is_err());
        assert!(page(1.5, 10.0).is_err());
        assert!(page(0.0, f64::NAN).is_err());
    }

    #[test]
    fn year_accepts_number_or_string() {
        assert_eq!(year(Some(YearInput::Number(2024.0))).ok(), Some(2024));
        assert_eq!(
            year(Some(YearInput::Text(" 1999 ".to_string()))).ok(),
            Some(1999)
        );
        assert_eq!(
            year(Some(YearInput::Number(MIN_REPORT_YEAR as f64))).ok(),
            Some(MIN_REPORT_YEAR)
        );
        assert_eq!(
            year(Some(YearInput::Number(MAX_REPORT_YEAR as f64))).ok(),
            Some(MAX_REPORT_YEAR)
        );
    }

    #[test]
    fn year_rejections() {
        assert!(year(None).is_err());
        assert!(year(Some(YearInput::Number(1899.0))).is_err());
        assert!(year(Some(YearInput::Number(2101.0))).is_err());
        assert!(year(Some(YearInput::Number(2024.5))).is_err());
        assert!(year(Some(YearInput::Text("twenty".to_string()))).is_err());
        assert!(year(Some(YearInput::Text("99999999999999999999".to_string()))).is_err());
    }
}
