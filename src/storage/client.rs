//! Storage client abstraction
//!
//! This layer consumes a small command set from the underlying key-value
//! store: atomic increment, field-mapped record get/set, set membership
//! operations with intersection, batched all-or-nothing execution, prefix
//! enumeration, and a sort-with-pagination command that reads sort keys
//! live from referenced records.
//!
//! The network client itself is an external collaborator; anything that
//! speaks these commands can sit behind the trait. [`super::MemoryClient`]
//! is the in-process reference implementation.

use crate::codec::FlatRecord;

use super::errors::StorageResult;

/// One mutation inside an atomic batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchCommand {
    /// Merge fields into the record at `key`, creating it if absent
    HashSet { key: String, fields: FlatRecord },
    /// Add a member to the set at `key`
    SetAdd { key: String, member: String },
    /// Remove a member from the set at `key`
    SetRemove { key: String, member: String },
    /// Delete the key outright, whatever it holds
    Delete { key: String },
}

/// A sort key read live from referenced records: for member `m`, the value
/// is field `field` of the record at `key_pattern` with `*` replaced by `m`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    /// Record key pattern containing a single `*` placeholder
    pub key_pattern: String,
    /// Field to read from the referenced record
    pub field: String,
}

/// Pagination window applied after sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortWindow {
    /// Members to skip
    pub offset: usize,
    /// Members to return
    pub count: usize,
}

/// A sort-with-pagination command over a named set.
///
/// Members are ordered by the `by` keys in sequence (numeric comparison when
/// both values are numeric, lexicographic otherwise, absent values first);
/// with no `by` keys the members themselves are compared. The result is the
/// sorted, windowed member list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCommand {
    /// Set holding the members to sort
    pub set_key: String,
    /// Sort keys, applied in order; empty sorts by the members themselves
    pub by: Vec<SortBy>,
    /// Optional pagination window
    pub window: Option<SortWindow>,
    /// Reverse the order
    pub descending: bool,
}

impl SortCommand {
    /// Sort the members of `set_key` by themselves, ascending
    pub fn new(set_key: impl Into<String>) -> Self {
        Self {
            set_key: set_key.into(),
            by: Vec::new(),
            window: None,
            descending: false,
        }
    }
}

/// The command surface this layer consumes from the store.
///
/// All operations are asynchronous; none blocks the caller's thread, and no
/// in-flight concurrency limit is imposed here. `exec_batch` is atomic:
/// either every command in the batch applies or none does. No isolation is
/// guaranteed between separate calls.
#[allow(async_fn_in_trait)]
pub trait StorageClient {
    /// Atomically increment an integer key, returning the new value.
    /// The increment is durable even when a subsequent operation fails.
    async fn incr(&self, key: &str) -> StorageResult<u64>;

    /// Merge fields into the record at `key`, creating it if absent
    async fn hash_set(&self, key: &str, fields: FlatRecord) -> StorageResult<()>;

    /// Read all fields of the record at `key`; empty when the key is absent
    async fn hash_get_all(&self, key: &str) -> StorageResult<FlatRecord>;

    /// Read several records in one batched round trip, in key order;
    /// absent keys yield empty maps
    async fn hash_get_many(&self, keys: &[String]) -> StorageResult<Vec<FlatRecord>>;

    /// Add a member to a set
    async fn set_add(&self, key: &str, member: &str) -> StorageResult<()>;

    /// Remove a member from a set
    async fn set_remove(&self, key: &str, member: &str) -> StorageResult<()>;

    /// All members of a set
    async fn set_members(&self, key: &str) -> StorageResult<Vec<String>>;

    /// Members present in every one of the given sets
    async fn set_intersect(&self, keys: &[String]) -> StorageResult<Vec<String>>;

    /// Delete a key outright
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Whether a key exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Every key starting with `prefix`
    async fn keys(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Sort a set's members with optional pagination; see [`SortCommand`]
    async fn sort(&self, cmd: SortCommand) -> StorageResult<Vec<String>>;

    /// Execute a batch of mutations atomically, all-or-nothing
    async fn exec_batch(&self, commands: Vec<BatchCommand>) -> StorageResult<()>;

    /// Release the connection; every later operation fails
    async fn quit(&self) -> StorageResult<()>;
}
