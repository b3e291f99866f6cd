//! Collection query builder
//!
//! Describes a read against one backend table: column selection, equality
//! filters, a single ordering and a row limit. Rendered as PostgREST query
//! parameters by the REST client.

use serde_json::Value;

/// Equality filter on one column
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

/// Sort order on one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    /// Start a query selecting all columns of `table`
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn order(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending,
        });
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render as PostgREST query string pairs
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone())];

        for filter in &self.filters {
            let literal = match &filter.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            pairs.push((filter.column.clone(), format!("eq.{literal}")));
        }

        if let Some(order) = &self.order {
            let direction = if order.descending { "desc" } else { "asc" };
            pairs.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_content_query_pairs() {
        let query = Query::new("landing_page_content")
            .eq("is_active", true)
            .order("updated_at", true)
            .limit(1);

        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("select".to_string(), "*".to_string()),
                ("is_active".to_string(), "eq.true".to_string()),
                ("order".to_string(), "updated_at.desc".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_filter_is_not_quoted() {
        let pairs = Query::new("t").select("id").eq("slug", "home").to_query_pairs();
        assert_eq!(pairs[0], ("select".to_string(), "id".to_string()));
        assert_eq!(pairs[1], ("slug".to_string(), "eq.home".to_string()));
    }
}
