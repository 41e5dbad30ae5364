//! Storage abstraction for bridgekv
//!
//! The store itself is an external collaborator reached through a single
//! shared connection. This module owns everything the layer needs to talk
//! to it:
//!
//! - the [`StorageClient`] command surface (increment, field-mapped records,
//!   membership sets, atomic batches, prefix enumeration, live-keyed sort)
//! - composite key construction ([`keys`])
//! - the in-memory reference client ([`MemoryClient`])
//!
//! # Invariants
//!
//! - A batch applies all-or-nothing; no partial batch is ever visible
//! - The id counter is durable and monotonic even when later writes fail
//! - Missing records read as empty, never as errors

pub mod keys;

mod client;
mod errors;
mod memory;

pub use client::{BatchCommand, SortBy, SortCommand, SortWindow, StorageClient};
pub use errors::{StorageError, StorageResult};
pub use memory::MemoryClient;
