//! Secondary index subsystem for bridgekv
//!
//! Indexes live in the store as membership sets, one per (type, field,
//! value). They are maintained inside the same atomic batch as the record
//! write, never rebuilt, and consulted by the query planner for
//! intersection candidates.

mod manager;

pub use manager::IndexManager;
