//! Index manager
//!
//! Secondary indexes are membership sets keyed by (type, field, encoded
//! value); members are composite record keys. The manager owns two things:
//! computing the membership mutations a write implies, and deriving the
//! candidate index keys a filter can use.
//!
//! Mutations are pure data; the caller applies them inside its atomic write
//! batch. A write that changes an indexed field removes the membership for
//! the prior value in the same batch that adds the new one, so after any
//! successful save every indexed field is reflected in exactly one
//! membership set.

use std::sync::Arc;

use crate::codec;
use crate::planner::{Expected, Query, Where};
use crate::schema::{Attributes, FieldValue, ModelDef, ModelRegistry, SchemaResult};
use crate::storage::{keys, BatchCommand};

/// Index configuration and mutation computation.
///
/// Holds the shared immutable registry; both the write path and the query
/// planner consult the same instance.
#[derive(Debug)]
pub struct IndexManager {
    registry: Arc<ModelRegistry>,
}

impl IndexManager {
    /// Create a manager over the shared registry
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve a model definition by name
    pub fn model(&self, name: &str) -> SchemaResult<&ModelDef> {
        self.registry.get(name)
    }

    /// Whether any written field is indexed for this model.
    ///
    /// When false, a write implies no membership mutations and the caller
    /// can skip the prior-value fetch entirely — no extra round trip.
    pub fn touches_indexes(&self, model: &ModelDef, written: &Attributes) -> bool {
        written.keys().any(|field| model.is_indexed(field))
    }

    /// Membership mutations implied by writing `written` to record `id`.
    ///
    /// `prior` is the record's stored state before the write (empty for a
    /// fresh record). For every indexed field written: if the stored value
    /// differs, a removal for the stale membership precedes the addition
    /// for the new one. An unchanged value yields nothing.
    pub fn write_mutations(
        &self,
        model: &ModelDef,
        id: u64,
        written: &Attributes,
        prior: &codec::FlatRecord,
    ) -> Vec<BatchCommand> {
        let record_ref = keys::record(&model.name, id);
        let mut mutations = Vec::new();

        for (field, value) in written {
            if !model.is_indexed(field) {
                continue;
            }

            let encoded = codec::encode_value(value);
            if let Some(stale) = prior.get(field) {
                if *stale == encoded {
                    continue;
                }
                mutations.push(BatchCommand::SetRemove {
                    key: keys::index(&model.name, field, stale),
                    member: record_ref.clone(),
                });
            }
            mutations.push(BatchCommand::SetAdd {
                key: keys::index(&model.name, field, &encoded),
                member: record_ref.clone(),
            });
        }

        mutations
    }

    /// Candidate index keys for a query's equality conditions.
    ///
    /// Only plain text equality on an indexed field can use a membership
    /// set — patterns and non-text values cannot, since the sets capture
    /// exact string values. Returns `None` when the query has no
    /// where-conditions at all (full scan, nothing to match), as opposed to
    /// `Some(empty)` (conditions exist but none is index-usable).
    pub fn possible_indexes(&self, model: &ModelDef, query: &Query) -> Option<Vec<String>> {
        let conditions = match &query.where_clause {
            Some(Where::All(conditions)) if !conditions.is_empty() => conditions,
            _ => return None,
        };

        Some(
            conditions
                .iter()
                .filter_map(|condition| match &condition.expected {
                    Expected::Value(FieldValue::Text(text))
                        if model.is_indexed(&condition.field) =>
                    {
                        Some(keys::index(&model.name, &condition.field, text))
                    }
                    _ => None,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Query;
    use crate::schema::{FieldDef, FieldType, RegistryBuilder};

    fn manager() -> IndexManager {
        let mut builder = RegistryBuilder::new();
        builder
            .define(
                ModelDef::new("Person")
                    .with_field("name", FieldDef::indexed(FieldType::Text))
                    .with_field("age", FieldDef::indexed(FieldType::Integer))
                    .with_field("bio", FieldDef::of(FieldType::Text)),
            )
            .unwrap();
        IndexManager::new(Arc::new(builder.build()))
    }

    fn attrs(pairs: Vec<(&str, FieldValue)>) -> Attributes {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_mutations_only_for_indexed_fields() {
        let manager = manager();
        let model = manager.model("Person").unwrap();
        let written = attrs(vec![
            ("name", FieldValue::Text("a".into())),
            ("bio", FieldValue::Text("hello".into())),
        ]);

        let mutations = manager.write_mutations(model, 1, &written, &Default::default());
        assert_eq!(
            mutations,
            vec![BatchCommand::SetAdd {
                key: "i:Person:name:a".into(),
                member: "Person:1".into(),
            }]
        );
    }

    #[test]
    fn test_no_indexed_fields_is_noop() {
        let manager = manager();
        let model = manager.model("Person").unwrap();
        let written = attrs(vec![("bio", FieldValue::Text("hello".into()))]);

        assert!(!manager.touches_indexes(model, &written));
        assert!(manager
            .write_mutations(model, 1, &written, &Default::default())
            .is_empty());
    }

    #[test]
    fn test_stale_membership_removed() {
        let manager = manager();
        let model = manager.model("Person").unwrap();

        let mut prior = codec::FlatRecord::new();
        prior.insert("age".into(), "5".into());

        let written = attrs(vec![("age", FieldValue::Integer(7))]);
        let mutations = manager.write_mutations(model, 1, &written, &prior);
        assert_eq!(
            mutations,
            vec![
                BatchCommand::SetRemove {
                    key: "i:Person:age:5".into(),
                    member: "Person:1".into(),
                },
                BatchCommand::SetAdd {
                    key: "i:Person:age:7".into(),
                    member: "Person:1".into(),
                },
            ]
        );
    }

    #[test]
    fn test_unchanged_value_yields_nothing() {
        let manager = manager();
        let model = manager.model("Person").unwrap();

        let mut prior = codec::FlatRecord::new();
        prior.insert("age".into(), "5".into());

        let written = attrs(vec![("age", FieldValue::Integer(5))]);
        assert!(manager.write_mutations(model, 1, &written, &prior).is_empty());
    }

    #[test]
    fn test_possible_indexes_text_equality_only() {
        let manager = manager();
        let model = manager.model("Person").unwrap();

        // Text equality on an indexed field is usable.
        let query = Query::new().filter_eq("name", "a");
        assert_eq!(
            manager.possible_indexes(model, &query),
            Some(vec!["i:Person:name:a".into()])
        );

        // Numeric equality is not: membership sets hold exact strings.
        let query = Query::new().filter_eq("age", 5i64);
        assert_eq!(manager.possible_indexes(model, &query), Some(vec![]));

        // Unindexed fields are not.
        let query = Query::new().filter_eq("bio", "hello");
        assert_eq!(manager.possible_indexes(model, &query), Some(vec![]));
    }

    #[test]
    fn test_possible_indexes_distinguishes_no_filter() {
        let manager = manager();
        let model = manager.model("Person").unwrap();

        // No where-conditions at all: None, not Some(empty).
        assert_eq!(manager.possible_indexes(model, &Query::new()), None);

        // A custom predicate exposes no conditions either.
        let query = Query::new().where_fn(|_| true);
        assert_eq!(manager.possible_indexes(model, &query), None);
    }
}
