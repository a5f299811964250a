use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use super::error::FilterError;
use super::types::{Condition, FilterOp};
use super::{lookup, validate_column};

pub struct FilterWhere;

impl FilterWhere {
    /// Parse a WHERE object. Top-level keys are ANDed together.
    pub fn parse(where_data: &Value) -> Result<Option<Condition>, FilterError> {
        match where_data {
            Value::Null => Ok(None),
            Value::Object(_) => Self::parse_object(where_data).map(Some),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn parse_object(where_data: &Value) -> Result<Condition, FilterError> {
        let obj = where_data
            .as_object()
            .ok_or_else(|| FilterError::InvalidWhereClause("Expected an object".to_string()))?;

        let mut conditions = Vec::new();
        for (key, value) in obj {
            if key.starts_with('$') {
                conditions.push(Self::parse_logical_operator(key, value)?);
            } else {
                conditions.extend(Self::parse_field_condition(key, value)?);
            }
        }

        Ok(match conditions.len() {
            1 => conditions.remove(0),
            _ => Condition::And(conditions),
        })
    }

    fn parse_logical_operator(op: &str, value: &Value) -> Result<Condition, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                let parts = arr.iter().map(Self::parse_object).collect::<Result<Vec<_>, _>>()?;
                Ok(if op == "$and" {
                    Condition::And(parts)
                } else {
                    Condition::Or(parts)
                })
            }
            "$not" => Ok(Condition::Not(Box::new(Self::parse_object(value)?))),
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(field: &str, value: &Value) -> Result<Vec<Condition>, FilterError> {
        validate_column(field)?;

        let operators = match value {
            Value::Object(obj) if obj.keys().any(|k| k.starts_with('$')) => obj,
            // Implicit equality: { field: value }
            _ => {
                return Ok(vec![Condition::Field {
                    column: field.to_string(),
                    operator: FilterOp::Eq,
                    data: value.clone(),
                }])
            }
        };

        let mut out = Vec::new();
        for (op_key, op_val) in operators {
            let operator = Self::map_operator(op_key)?;
            Self::check_operand(operator, op_val)?;
            out.push(Condition::Field {
                column: field.to_string(),
                operator,
                data: op_val.clone(),
            });
        }
        Ok(out)
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$nin" => FilterOp::NIn,
            "$between" => FilterOp::Between,
            "$exists" => FilterOp::Exists,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn check_operand(operator: FilterOp, data: &Value) -> Result<(), FilterError> {
        let ok = match operator {
            FilterOp::Like | FilterOp::ILike => data.is_string(),
            FilterOp::In | FilterOp::NIn => data.is_array(),
            FilterOp::Between => data.as_array().is_some_and(|a| a.len() == 2),
            FilterOp::Exists => data.is_boolean(),
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(FilterError::InvalidOperatorData(format!(
                "{} has an invalid operand: {}",
                serde_json::to_string(&operator).unwrap_or_default(),
                data
            )))
        }
    }

    /// Evaluate a parsed condition against one serialized record.
    pub fn matches(condition: &Condition, record: &Value) -> bool {
        match condition {
            Condition::And(parts) => parts.iter().all(|c| Self::matches(c, record)),
            Condition::Or(parts) => parts.iter().any(|c| Self::matches(c, record)),
            Condition::Not(inner) => !Self::matches(inner, record),
            Condition::Field {
                column,
                operator,
                data,
            } => {
                let value = lookup(record, column).unwrap_or(&Value::Null);
                Self::matches_field(*operator, value, data)
            }
        }
    }

    fn matches_field(operator: FilterOp, value: &Value, data: &Value) -> bool {
        match operator {
            FilterOp::Eq => values_equal(value, data),
            FilterOp::Ne => !values_equal(value, data),
            FilterOp::Gt => compare(value, data) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(compare(value, data), Some(Ordering::Greater | Ordering::Equal)),
            FilterOp::Lt => compare(value, data) == Some(Ordering::Less),
            FilterOp::Lte => matches!(compare(value, data), Some(Ordering::Less | Ordering::Equal)),
            FilterOp::Like => match (value.as_str(), data.as_str()) {
                (Some(text), Some(pattern)) => like(text, pattern),
                _ => false,
            },
            FilterOp::ILike => match (value.as_str(), data.as_str()) {
                (Some(text), Some(pattern)) => like(&text.to_lowercase(), &pattern.to_lowercase()),
                _ => false,
            },
            FilterOp::In => data
                .as_array()
                .is_some_and(|options| options.iter().any(|o| values_equal(value, o))),
            FilterOp::NIn => data
                .as_array()
                .is_some_and(|options| !options.iter().any(|o| values_equal(value, o))),
            FilterOp::Between => match data.as_array().map(Vec::as_slice) {
                Some([low, high]) => {
                    matches!(compare(value, low), Some(Ordering::Greater | Ordering::Equal))
                        && matches!(compare(value, high), Some(Ordering::Less | Ordering::Equal))
                }
                _ => false,
            },
            FilterOp::Exists => data.as_bool() == Some(!value.is_null()),
        }
    }
}

fn timestamp(value: &Value) -> Option<DateTime<FixedOffset>> {
    value.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare(a, b) == Some(Ordering::Equal),
        _ => a == b || (timestamp(a).is_some() && compare(a, b) == Some(Ordering::Equal)),
    }
}

/// Order two JSON scalars. Strings that both parse as RFC 3339 timestamps
/// compare as instants. Mismatched types and nulls are unordered.
pub(crate) fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (timestamp(a), timestamp(b)) {
            (Some(ta), Some(tb)) => Some(ta.cmp(&tb)),
            _ => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// SQL LIKE: `%` matches any run, `_` any single character.
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    // matched[j]: pattern[..j] matches the text consumed so far.
    let mut matched = vec![false; pattern.len() + 1];
    matched[0] = true;
    for j in 1..=pattern.len() {
        matched[j] = matched[j - 1] && pattern[j - 1] == '%';
    }

    for c in text {
        let mut next = vec![false; pattern.len() + 1];
        for j in 1..=pattern.len() {
            next[j] = match pattern[j - 1] {
                '%' => next[j - 1] || matched[j],
                '_' => matched[j - 1],
                p => matched[j - 1] && p == c,
            };
        }
        matched = next;
    }

    matched[pattern.len()]
}
