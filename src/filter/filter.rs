use serde::Serialize;
use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Condition, FilterData, FilterOrderInfo};

/// A find over serialized records: WHERE, ORDER, LIMIT/OFFSET, and
/// soft-delete exclusion on `trashed_at`.
pub struct Filter {
    where_data: Option<Condition>,
    order_data: Vec<FilterOrderInfo>,
    limit: usize,
    offset: usize,
    max_limit: usize,
    include_trashed: bool,
}

impl Default for Filter {
    fn default() -> Self {
        let api = &crate::config::config().api;
        Self::with_limits(api.default_page_size, api.max_page_size)
    }
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(default_limit: usize, max_limit: usize) -> Self {
        Self {
            where_data: None,
            order_data: vec![],
            limit: default_limit.min(max_limit),
            offset: 0,
            max_limit,
            include_trashed: false,
        }
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.where_clause { self.where_clause(where_clause)?; }
        if let Some(order) = data.order { self.order(order)?; }
        if let Some(limit) = data.limit { self.limit(limit, data.offset)?; }
        else if let Some(offset) = data.offset { self.offset(offset)?; }
        self.include_trashed = data.include_trashed;
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        self.where_data = FilterWhere::parse(&conditions)?;
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i64, offset: Option<i64>) -> Result<&mut Self, FilterError> {
        if limit < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); }
        if let Some(off) = offset { self.offset(off)?; }

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        if limit > self.max_limit {
            tracing::debug!("Limit {} exceeds max {}, capping to max", limit, self.max_limit);
        }
        self.limit = limit.min(self.max_limit);
        Ok(self)
    }

    fn offset(&mut self, offset: i64) -> Result<&mut Self, FilterError> {
        self.offset = usize::try_from(offset)
            .map_err(|_| FilterError::InvalidOffset("Offset must be non-negative".to_string()))?;
        Ok(self)
    }

    pub fn include_trashed(&mut self, include: bool) -> &mut Self {
        self.include_trashed = include;
        self
    }

    fn keep(&self, record: &Value) -> bool {
        if !self.include_trashed && record.get("trashed_at").is_some_and(|t| !t.is_null()) {
            return false;
        }
        self.where_data
            .as_ref()
            .map_or(true, |condition| FilterWhere::matches(condition, record))
    }

    /// Filtered, ordered and paged items.
    pub fn apply<T: Serialize>(&self, items: impl IntoIterator<Item = T>) -> Result<Vec<T>, FilterError> {
        let mut rows = Vec::new();
        for item in items {
            let record = serde_json::to_value(&item)?;
            if self.keep(&record) {
                rows.push((record, item));
            }
        }

        if !self.order_data.is_empty() {
            rows.sort_by(|(a, _), (b, _)| FilterOrder::compare(&self.order_data, a, b));
        }

        Ok(rows
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .map(|(_, item)| item)
            .collect())
    }

    /// Number of matching items, ignoring limit and offset.
    pub fn count<T: Serialize>(&self, items: impl IntoIterator<Item = T>) -> Result<usize, FilterError> {
        let mut total = 0;
        for item in items {
            if self.keep(&serde_json::to_value(&item)?) {
                total += 1;
            }
        }
        Ok(total)
    }
}
