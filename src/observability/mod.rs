//! Observability for bridgekv
//!
//! Structured, synchronous JSON logging of the storage commands this layer
//! issues. No metrics, no tracing spans — one line per command, with
//! elapsed time.

mod log;

pub use log::{CommandLog, Severity};
