//! JSON find filters evaluated over serialized records.

pub mod error;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod types;

pub use error::FilterError;
pub use filter::Filter;
pub use types::*;

use serde_json::Value;

/// Look up a dotted path such as `author.name` in a JSON object.
pub(crate) fn lookup<'a>(record: &'a Value, column: &str) -> Option<&'a Value> {
    column
        .split('.')
        .try_fold(record, |value, segment| value.as_object()?.get(segment))
}

pub(crate) fn validate_column(column: &str) -> Result<(), FilterError> {
    let valid = !column.is_empty()
        && column.split('.').all(|segment| {
            segment
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
                && segment.chars().all(|c| c.is_alphanumeric() || c == '_')
        });
    if valid {
        Ok(())
    } else {
        Err(FilterError::InvalidColumn(column.to_string()))
    }
}
