//! Query planning for bridgekv
//!
//! The AST describes what the caller wants; strategy selection decides how
//! the store answers it. Selection is pure and per-call — execution lives
//! in the executor.

mod ast;
mod planner;

pub use ast::{Condition, Expected, Order, Predicate, Query, SortDirection, Where};
pub use planner::{select, Strategy};
