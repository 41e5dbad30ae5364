//! Query execution for bridgekv
//!
//! The executor turns a selected strategy into storage commands and
//! assembles decoded, filtered results; the filter evaluator handles the
//! residual in-memory predicate work.

mod executor;
mod filters;

pub use executor::QueryExecutor;
pub use filters::{loose_eq, FilterEvaluator};
