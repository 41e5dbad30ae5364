//! Residual filter evaluation
//!
//! Applied in memory to already-fetched records whenever the storage-side
//! strategy cannot fully satisfy the filter. A custom predicate overrides
//! everything; otherwise every condition must pass (AND, no OR).
//!
//! Equality is loose, not strict: an integer `5`, a float `5.0`, and the
//! text `"5"` all compare equal, because the wire format is strings and
//! callers routinely hold one side as text. Two text values compare
//! exactly. Patterns only ever match text.

use crate::planner::{Condition, Expected, Where};
use crate::schema::{Attributes, FieldValue};

/// Loose equality between two field values.
///
/// Exact variant equality wins; otherwise both sides are compared
/// numerically when both have a numeric view. Text-to-text comparison is
/// always exact.
pub fn loose_eq(a: &FieldValue, b: &FieldValue) -> bool {
    if a == b {
        return true;
    }
    if let (FieldValue::Text(_), FieldValue::Text(_)) = (a, b) {
        return false;
    }
    match (a.as_numeric(), b.as_numeric()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Evaluates filters against decoded records
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Whether a record passes the filter
    pub fn matches(where_clause: &Where, record: &Attributes) -> bool {
        match where_clause {
            Where::Predicate(predicate) => predicate(record),
            Where::All(conditions) => conditions
                .iter()
                .all(|condition| Self::condition_matches(condition, record)),
        }
    }

    fn condition_matches(condition: &Condition, record: &Attributes) -> bool {
        let actual = record.get(&condition.field);

        match &condition.expected {
            Expected::Matches(pattern) => match actual {
                Some(FieldValue::Text(text)) => pattern.is_match(text),
                _ => false,
            },
            // A missing field compares as an explicit null.
            Expected::Value(expected) => loose_eq(expected, actual.unwrap_or(&FieldValue::Null)),
        }
    }
}
