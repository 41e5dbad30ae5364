//! Query AST
//!
//! A query is a filter, an optional order, and an optional pagination
//! window. The where clause is either a list of field conditions combined
//! with AND, or a single custom predicate that overrides all other
//! evaluation. There is no OR.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::schema::{Attributes, FieldValue};

/// A custom filter predicate supplied by the caller
pub type Predicate = Arc<dyn Fn(&Attributes) -> bool + Send + Sync>;

/// Expected value of a single field condition
#[derive(Debug, Clone)]
pub enum Expected {
    /// Compare with loose equality
    Value(FieldValue),
    /// Match text values against a pattern; never matches non-text
    Matches(Regex),
}

/// One field condition
#[derive(Debug, Clone)]
pub struct Condition {
    /// Field name
    pub field: String,
    /// Expected value
    pub expected: Expected,
}

impl Condition {
    /// Create an equality condition
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            expected: Expected::Value(value.into()),
        }
    }

    /// Create a pattern condition
    pub fn matches(field: impl Into<String>, pattern: Regex) -> Self {
        Self {
            field: field.into(),
            expected: Expected::Matches(pattern),
        }
    }
}

/// The filter part of a query
#[derive(Clone)]
pub enum Where {
    /// Every condition must pass
    All(Vec<Condition>),
    /// A single custom predicate; overrides all other evaluation
    Predicate(Predicate),
}

impl fmt::Debug for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Where::All(conditions) => f.debug_tuple("All").field(conditions).finish(),
            Where::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One ordering term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Field whose live value orders the results
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl Order {
    /// Ascending order on a field
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending order on a field
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// A filtered, optionally sorted and paginated query
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Filter; `None` selects everything
    pub where_clause: Option<Where>,
    /// Ordering terms, applied in sequence
    pub order: Vec<Order>,
    /// Maximum results; also enables the pagination window
    pub limit: Option<usize>,
    /// Results to skip; only honored together with `limit`
    pub offset: usize,
}

impl Query {
    /// Create an unconstrained query
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition
    pub fn filter_eq(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.with_condition(Condition::eq(field, value))
    }

    /// Add a pattern condition
    pub fn filter_match(self, field: impl Into<String>, pattern: Regex) -> Self {
        self.with_condition(Condition::matches(field, pattern))
    }

    /// Add a condition, converting the where clause to a condition list
    /// if a custom predicate was set
    pub fn with_condition(mut self, condition: Condition) -> Self {
        match self.where_clause {
            Some(Where::All(ref mut conditions)) => conditions.push(condition),
            _ => self.where_clause = Some(Where::All(vec![condition])),
        }
        self
    }

    /// Replace the filter with a custom predicate
    pub fn where_fn<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Attributes) -> bool + Send + Sync + 'static,
    {
        self.where_clause = Some(Where::Predicate(Arc::new(predicate)));
        self
    }

    /// Order ascending by a field
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order.push(Order::asc(field));
        self
    }

    /// Order descending by a field
    pub fn order_desc(mut self, field: impl Into<String>) -> Self {
        self.order.push(Order::desc(field));
        self
    }

    /// Cap the number of results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip results before the window; only honored together with a limit
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// The filter's conditions; empty for no filter or a custom predicate
    pub fn conditions(&self) -> &[Condition] {
        match &self.where_clause {
            Some(Where::All(conditions)) => conditions,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let query = Query::new()
            .filter_eq("age", 5i64)
            .filter_eq("name", "a")
            .order_by("age")
            .limit(10)
            .offset(2);

        assert_eq!(query.conditions().len(), 2);
        assert_eq!(query.order, vec![Order::asc("age")]);
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.offset, 2);
    }

    #[test]
    fn test_predicate_replaces_conditions() {
        let query = Query::new().filter_eq("age", 5i64).where_fn(|_| true);
        assert!(query.conditions().is_empty());
        assert!(matches!(query.where_clause, Some(Where::Predicate(_))));
    }

    #[test]
    fn test_condition_after_predicate_starts_fresh() {
        let query = Query::new().where_fn(|_| true).filter_eq("age", 5i64);
        assert_eq!(query.conditions().len(), 1);
    }
}
