//! Query strategy selection
//!
//! State-free, per-call, in strict priority order:
//!
//! 1. Sort-driven traversal — any requested order or limit wins outright;
//!    sorting and pagination take precedence over index narrowing, so this
//!    strategy ignores secondary indexes entirely.
//! 2. Index intersection — equality conditions that map to indexed text
//!    fields intersect their membership sets.
//! 3. Full scan — everything else enumerates the type's namespace.
//!
//! Selection is pure: same query and configuration, same strategy.

use crate::index::IndexManager;
use crate::schema::ModelDef;

use super::ast::{Query, Where};

/// The storage-side strategy chosen for a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Sort-and-paginate over the per-type membership list, reading sort
    /// keys live from candidate records
    SortTraversal,
    /// Intersect the given index membership sets.
    ///
    /// `fully_satisfied` records whether every filter condition was
    /// consumed by an index key, in which case residual filtering is
    /// unnecessary.
    IndexIntersection {
        keys: Vec<String>,
        fully_satisfied: bool,
    },
    /// Enumerate every key under the type's namespace prefix
    FullScan,
}

impl Strategy {
    /// Short name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::SortTraversal => "sort",
            Strategy::IndexIntersection { .. } => "intersect",
            Strategy::FullScan => "scan",
        }
    }
}

/// Select the strategy for one query
pub fn select(indexes: &IndexManager, model: &ModelDef, query: &Query) -> Strategy {
    // Priority 1: an order or a limit forces the sorted traversal. An
    // offset alone does not; it is only honored as part of a limit window.
    if !query.order.is_empty() || query.limit.is_some() {
        return Strategy::SortTraversal;
    }

    // Priority 2: indexed text equalities intersect. `None` means the
    // query has no where-conditions; `Some(empty)` means it has some but
    // none can use an index. Both fall through to the scan.
    match indexes.possible_indexes(model, query) {
        Some(keys) if !keys.is_empty() => {
            let fully_satisfied = match &query.where_clause {
                Some(Where::All(conditions)) => conditions.len() == keys.len(),
                _ => false,
            };
            Strategy::IndexIntersection {
                keys,
                fully_satisfied,
            }
        }
        // Priority 3.
        _ => Strategy::FullScan,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::schema::{FieldDef, FieldType, RegistryBuilder};

    fn indexes() -> IndexManager {
        let mut builder = RegistryBuilder::new();
        builder
            .define(
                ModelDef::new("Person")
                    .with_field("name", FieldDef::indexed(FieldType::Text))
                    .with_field("city", FieldDef::indexed(FieldType::Text))
                    .with_field("age", FieldDef::of(FieldType::Integer)),
            )
            .unwrap();
        IndexManager::new(Arc::new(builder.build()))
    }

    #[test]
    fn test_order_forces_sort_traversal() {
        let indexes = indexes();
        let model = indexes.model("Person").unwrap();

        // Even with a usable index: sorting takes precedence.
        let query = Query::new().filter_eq("name", "a").order_by("age");
        assert_eq!(select(&indexes, model, &query), Strategy::SortTraversal);
    }

    #[test]
    fn test_limit_forces_sort_traversal() {
        let indexes = indexes();
        let model = indexes.model("Person").unwrap();

        let query = Query::new().limit(10);
        assert_eq!(select(&indexes, model, &query), Strategy::SortTraversal);
    }

    #[test]
    fn test_offset_alone_does_not_trigger_sort() {
        let indexes = indexes();
        let model = indexes.model("Person").unwrap();

        let query = Query::new().offset(5);
        assert_eq!(select(&indexes, model, &query), Strategy::FullScan);
    }

    #[test]
    fn test_indexed_equalities_intersect() {
        let indexes = indexes();
        let model = indexes.model("Person").unwrap();

        let query = Query::new().filter_eq("name", "a").filter_eq("city", "rome");
        assert_eq!(
            select(&indexes, model, &query),
            Strategy::IndexIntersection {
                keys: vec!["i:Person:name:a".into(), "i:Person:city:rome".into()],
                fully_satisfied: true,
            }
        );
    }

    #[test]
    fn test_partial_index_coverage_is_not_fully_satisfied() {
        let indexes = indexes();
        let model = indexes.model("Person").unwrap();

        let query = Query::new().filter_eq("name", "a").filter_eq("age", 5i64);
        match select(&indexes, model, &query) {
            Strategy::IndexIntersection {
                keys,
                fully_satisfied,
            } => {
                assert_eq!(keys, vec!["i:Person:name:a".to_string()]);
                assert!(!fully_satisfied);
            }
            other => panic!("expected intersection, got {:?}", other),
        }
    }

    #[test]
    fn test_unusable_conditions_fall_back_to_scan() {
        let indexes = indexes();
        let model = indexes.model("Person").unwrap();

        // Numeric equality on an unindexed field: conditions exist, none
        // usable.
        let query = Query::new().filter_eq("age", 5i64);
        assert_eq!(select(&indexes, model, &query), Strategy::FullScan);
    }

    #[test]
    fn test_no_filter_scans() {
        let indexes = indexes();
        let model = indexes.model("Person").unwrap();
        assert_eq!(select(&indexes, model, &Query::new()), Strategy::FullScan);
    }
}
