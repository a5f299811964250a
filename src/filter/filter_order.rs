use std::cmp::Ordering;

use serde_json::Value;

use super::error::FilterError;
use super::filter_where::compare;
use super::types::{FilterOrderInfo, SortDirection};
use super::{lookup, validate_column};

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let infos = match order {
            Value::String(s) => Self::parse_order_string(s),
            Value::Array(arr) => {
                // Expect array of strings like ["created_at desc", "title asc"]
                let mut out = Vec::new();
                for v in arr {
                    let s = v.as_str().ok_or_else(|| {
                        FilterError::InvalidOperatorData(format!("order entries must be strings, got {}", v))
                    })?;
                    out.extend(Self::parse_order_string(s));
                }
                out
            }
            Value::Object(obj) => {
                // { "created_at": "desc", "title": "asc" }
                obj.iter()
                    .map(|(k, v)| FilterOrderInfo {
                        column: k.clone(),
                        sort: Self::direction(v.as_str().unwrap_or("asc")),
                    })
                    .collect()
            }
            Value::Null => vec![],
            _ => {
                return Err(FilterError::InvalidOperatorData(
                    "order must be a string, array or object".to_string(),
                ))
            }
        };

        for info in &infos {
            validate_column(&info.column)?;
        }
        Ok(infos)
    }

    fn parse_order_string(s: &str) -> Vec<FilterOrderInfo> {
        // split on commas, then each token into column and direction
        s.split(',')
            .filter_map(|part| {
                let mut it = part.split_whitespace();
                let column = it.next()?;
                Some(FilterOrderInfo {
                    column: column.to_string(),
                    sort: Self::direction(it.next().unwrap_or("asc")),
                })
            })
            .collect()
    }

    fn direction(dir: &str) -> SortDirection {
        if dir.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// Compare two records by the order list. Missing and null values sort
    /// last in either direction.
    pub fn compare(infos: &[FilterOrderInfo], a: &Value, b: &Value) -> Ordering {
        for info in infos {
            let left = lookup(a, &info.column).filter(|v| !v.is_null());
            let right = lookup(b, &info.column).filter(|v| !v.is_null());
            let ordering = match (left, right) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => {
                    let ordering = compare(x, y).unwrap_or(Ordering::Equal);
                    match info.sort {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_all_shapes() {
        let from_string = FilterOrder::validate_and_parse(&json!("created_at desc, title")).unwrap();
        let from_array = FilterOrder::validate_and_parse(&json!(["created_at desc", "title asc"])).unwrap();
        let from_object = FilterOrder::validate_and_parse(&json!({ "created_at": "DESC", "title": "asc" })).unwrap();
        assert_eq!(from_string, from_array);
        assert_eq!(from_string.len(), 2);
        assert_eq!(from_string[0].sort, SortDirection::Desc);
        assert!(from_object.iter().any(|i| i.column == "created_at" && i.sort == SortDirection::Desc));

        assert!(FilterOrder::validate_and_parse(&json!("title; drop")).is_err());
        assert!(FilterOrder::validate_and_parse(&json!(42)).is_err());
    }

    #[test]
    fn nulls_sort_last_both_ways() {
        let infos = FilterOrder::validate_and_parse(&json!("published_at desc")).unwrap();
        let mut rows = vec![
            json!({ "published_at": null }),
            json!({ "published_at": "2024-01-01T00:00:00Z" }),
            json!({ "published_at": "2024-06-01T00:00:00Z" }),
        ];
        rows.sort_by(|a, b| FilterOrder::compare(&infos, a, b));
        assert_eq!(rows[0]["published_at"], "2024-06-01T00:00:00Z");
        assert!(rows[2]["published_at"].is_null());
    }
}
