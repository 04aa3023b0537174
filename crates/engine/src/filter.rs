//! Filter clauses and the parser turning request JSON into them.
//!
//! A filter is `(field, operator, value)`. The value is a tagged union whose
//! variant is decided here, once, from the field: later stages only branch on
//! the tag.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::{EngineError, ResultEngine, util};

/// Entry field a filter applies to. Wire codes are the discriminants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterField {
    TransactionDate,
    Amount,
    Description,
    RecordCreationDate,
}

impl FilterField {
    pub fn code(self) -> i64 {
        match self {
            Self::TransactionDate => 0,
            Self::Amount => 1,
            Self::Description => 2,
            Self::RecordCreationDate => 3,
        }
    }

    /// Canonical stored field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TransactionDate => "date",
            Self::Amount => "amount",
            Self::Description => "description",
            Self::RecordCreationDate => "createTime",
        }
    }

    fn expected_value(self) -> &'static str {
        match self {
            Self::TransactionDate | Self::RecordCreationDate => "an RFC 3339 timestamp string",
            Self::Amount => "a number",
            Self::Description => "a string",
        }
    }
}

impl TryFrom<i64> for FilterField {
    type Error = EngineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::TransactionDate),
            1 => Ok(Self::Amount),
            2 => Ok(Self::Description),
            3 => Ok(Self::RecordCreationDate),
            other => Err(EngineError::InvalidFilterType(other)),
        }
    }
}

/// Comparison operator. Wire codes are the discriminants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterOp {
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Equal,
    NotEqual,
    Contains,
    NotContains,
}

impl FilterOp {
    pub fn code(self) -> i64 {
        match self {
            Self::LessThan => 0,
            Self::LessOrEqual => 1,
            Self::GreaterThan => 2,
            Self::GreaterOrEqual => 3,
            Self::Equal => 4,
            Self::NotEqual => 5,
            Self::Contains => 6,
            Self::NotContains => 7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Contains => "contains",
            Self::NotContains => "not contains",
        }
    }

    /// Substring operators only make sense on text.
    pub fn is_substring(self) -> bool {
        matches!(self, Self::Contains | Self::NotContains)
    }
}

impl TryFrom<i64> for FilterOp {
    type Error = EngineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::LessThan),
            1 => Ok(Self::LessOrEqual),
            2 => Ok(Self::GreaterThan),
            3 => Ok(Self::GreaterOrEqual),
            4 => Ok(Self::Equal),
            5 => Ok(Self::NotEqual),
            6 => Ok(Self::Contains),
            7 => Ok(Self::NotContains),
            other => Err(EngineError::InvalidFilterOp(other)),
        }
    }
}

/// Typed filter operand.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Time(DateTime<Utc>),
    Number(f64),
    Text(String),
}

impl FilterValue {
    fn fits(&self, field: FilterField) -> bool {
        matches!(
            (field, self),
            (
                FilterField::TransactionDate | FilterField::RecordCreationDate,
                Self::Time(_)
            ) | (FilterField::Amount, Self::Number(_))
                | (FilterField::Description, Self::Text(_))
        )
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time(t) => write!(f, "{}", t.to_rfc3339()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// One filter clause.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub field: FilterField,
    pub op: FilterOp,
    pub value: FilterValue,
}

impl Filter {
    /// Builds a clause, rejecting value types or operators the field cannot
    /// take.
    pub fn new(field: FilterField, op: FilterOp, value: FilterValue) -> ResultEngine<Self> {
        let filter = Self { field, op, value };
        filter.validate()?;
        Ok(filter)
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if !self.value.fits(self.field) {
            return Err(EngineError::InvalidTypeCombination(format!(
                "{} expects {}, got {}",
                self.field.as_str(),
                self.field.expected_value(),
                self.value
            )));
        }
        if self.op.is_substring() && self.field != FilterField::Description {
            return Err(EngineError::InvalidTypeCombination(format!(
                "operator '{}' cannot be applied to {}",
                self.op.as_str(),
                self.field.as_str()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field.as_str(), self.op.as_str(), self.value)
    }
}

/// Parses the `filter` array of a request body.
///
/// Output order equals input order. The first bad element fails the whole
/// list.
pub fn parse_filters(raw: &[Value]) -> ResultEngine<Vec<Filter>> {
    raw.iter()
        .enumerate()
        .map(|(index, item)| parse_filter(index, item))
        .collect()
}

fn parse_filter(index: usize, raw: &Value) -> ResultEngine<Filter> {
    let Some(object) = raw.as_object() else {
        return Err(EngineError::MalformedFilterShape(format!(
            "element {index} is not an object"
        )));
    };

    let field_tag = numeric_tag(object, "type", index)?;
    let op_tag = numeric_tag(object, "operator", index)?;

    let value = match object.get("value") {
        None | Some(Value::Null) => return Err(EngineError::MissingFilterValue(index)),
        Some(value) => value,
    };

    let field = FilterField::try_from(field_tag)?;
    let value = typed_value(field, value)?;
    let op = FilterOp::try_from(op_tag)?;

    Filter::new(field, op, value)
}

/// Reads a tag that must be a JSON number with an integral value.
fn numeric_tag(object: &Map<String, Value>, key: &str, index: usize) -> ResultEngine<i64> {
    let malformed = || {
        EngineError::MalformedFilterShape(format!(
            "element {index}: '{key}' must be an integer"
        ))
    };

    let Some(Value::Number(number)) = object.get(key) else {
        return Err(malformed());
    };
    if let Some(tag) = number.as_i64() {
        return Ok(tag);
    }
    // Integral but out of range: saturate so the tag lookup rejects it.
    if number.as_u64().is_some() {
        return Ok(i64::MAX);
    }
    // JavaScript clients may send `1.0`. The cast saturates.
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 => Ok(f as i64),
        _ => Err(malformed()),
    }
}

fn typed_value(field: FilterField, value: &Value) -> ResultEngine<FilterValue> {
    let mismatch = || {
        EngineError::InvalidTypeCombination(format!(
            "{} expects {}, got {value}",
            field.as_str(),
            field.expected_value()
        ))
    };

    match field {
        FilterField::TransactionDate | FilterField::RecordCreationDate => {
            let raw = value.as_str().ok_or_else(mismatch)?;
            Ok(FilterValue::Time(util::parse_timestamp(raw)?))
        }
        FilterField::Amount => {
            let number = value.as_f64().ok_or_else(mismatch)?;
            Ok(FilterValue::Number(number))
        }
        FilterField::Description => {
            let text = value.as_str().ok_or_else(mismatch)?;
            Ok(FilterValue::Text(text.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> ResultEngine<Vec<Filter>> {
        let Value::Array(items) = value else {
            panic!("test input must be an array");
        };
        parse_filters(&items)
    }

    #[test]
    fn parses_every_field_kind_in_order() {
        let filters = parse(json!([
            { "type": 1, "operator": 3, "value": 100.0 },
            { "type": 2, "operator": 6, "value": "Coffee" },
            { "type": 0, "operator": 0, "value": "2024-05-01T00:00:00Z" },
            { "type": 3, "operator": 5, "value": "2024-05-01T12:00:00+02:00" },
        ]))
        .unwrap();

        assert_eq!(
            filters,
            vec![
                Filter {
                    field: FilterField::Amount,
                    op: FilterOp::GreaterOrEqual,
                    value: FilterValue::Number(100.0),
                },
                Filter {
                    field: FilterField::Description,
                    op: FilterOp::Contains,
                    value: FilterValue::Text("Coffee".to_string()),
                },
                Filter {
                    field: FilterField::TransactionDate,
                    op: FilterOp::LessThan,
                    value: FilterValue::Time(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
                },
                Filter {
                    field: FilterField::RecordCreationDate,
                    op: FilterOp::NotEqual,
                    value: FilterValue::Time(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
                },
            ]
        );
    }

    #[test]
    fn empty_list_is_valid() {
        assert_eq!(parse(json!([])).unwrap(), Vec::new());
    }

    #[test]
    fn integral_float_tags_are_accepted() {
        let filters = parse(json!([{ "type": 1.0, "operator": 4.0, "value": 5 }])).unwrap();
        assert_eq!(filters[0].field, FilterField::Amount);
        assert_eq!(filters[0].op, FilterOp::Equal);
        assert_eq!(filters[0].value, FilterValue::Number(5.0));
    }

    #[test]
    fn non_object_element_is_malformed() {
        assert!(matches!(
            parse(json!(["amount >= 3"])),
            Err(EngineError::MalformedFilterShape(_))
        ));
    }

    #[test]
    fn string_tags_are_malformed() {
        assert!(matches!(
            parse(json!([{ "type": "1", "operator": 3, "value": 3 }])),
            Err(EngineError::MalformedFilterShape(_))
        ));
        assert!(matches!(
            parse(json!([{ "type": 1, "value": 3 }])),
            Err(EngineError::MalformedFilterShape(_))
        ));
        assert!(matches!(
            parse(json!([{ "type": 1.5, "operator": 3, "value": 3 }])),
            Err(EngineError::MalformedFilterShape(_))
        ));
    }

    #[test]
    fn missing_or_null_value_is_reported_with_position() {
        assert_eq!(
            parse(json!([
                { "type": 1, "operator": 3, "value": 1 },
                { "type": 1, "operator": 3 },
            ])),
            Err(EngineError::MissingFilterValue(1))
        );
        assert_eq!(
            parse(json!([{ "type": 2, "operator": 6, "value": null }])),
            Err(EngineError::MissingFilterValue(0))
        );
    }

    #[test]
    fn value_type_must_match_field() {
        for input in [
            json!([{ "type": 1, "operator": 3, "value": "100" }]),
            json!([{ "type": 2, "operator": 6, "value": 42 }]),
            json!([{ "type": 0, "operator": 0, "value": 1714521600 }]),
            json!([{ "type": 3, "operator": 0, "value": true }]),
        ] {
            assert!(
                matches!(parse(input.clone()), Err(EngineError::InvalidTypeCombination(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_timestamp_fails_at_parse_time() {
        assert_eq!(
            parse(json!([{ "type": 0, "operator": 2, "value": "yesterday" }])),
            Err(EngineError::UnparseableTimestamp("yesterday".to_string()))
        );
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert_eq!(
            parse(json!([{ "type": 4, "operator": 0, "value": 1 }])),
            Err(EngineError::InvalidFilterType(4))
        );
        assert_eq!(
            parse(json!([{ "type": 1, "operator": 8, "value": 1 }])),
            Err(EngineError::InvalidFilterOp(8))
        );
        assert_eq!(
            parse(json!([{ "type": -1, "operator": 0, "value": 1 }])),
            Err(EngineError::InvalidFilterType(-1))
        );
    }

    #[test]
    fn huge_integral_tags_are_unknown_not_malformed() {
        assert_eq!(
            parse(json!([{ "type": 1e19, "operator": 0, "value": 1 }])),
            Err(EngineError::InvalidFilterType(i64::MAX))
        );
        assert_eq!(
            parse(json!([{ "type": u64::MAX, "operator": 0, "value": 1 }])),
            Err(EngineError::InvalidFilterType(i64::MAX))
        );
        assert_eq!(
            parse(json!([{ "type": 1, "operator": -1e19, "value": 1 }])),
            Err(EngineError::InvalidFilterOp(i64::MIN))
        );
    }

    #[test]
    fn substring_operators_require_text_fields() {
        assert!(matches!(
            parse(json!([{ "type": 1, "operator": 6, "value": 10 }])),
            Err(EngineError::InvalidTypeCombination(_))
        ));
        assert!(matches!(
            parse(json!([{ "type": 0, "operator": 7, "value": "2024-01-01T00:00:00Z" }])),
            Err(EngineError::InvalidTypeCombination(_))
        ));
    }

    #[test]
    fn codes_round_trip_through_try_from() {
        for code in 0..4 {
            assert_eq!(FilterField::try_from(code).unwrap().code(), code);
        }
        for code in 0..8 {
            assert_eq!(FilterOp::try_from(code).unwrap().code(), code);
        }
    }
}
