//! In-memory storage client
//!
//! The reference implementation of [`StorageClient`]: a single shared state
//! behind a lock, with the same observable semantics the layer expects from
//! the real store — merge-on-write records, atomic batches, a durable
//! monotonic counter, and the live-keyed sort command.
//!
//! Used by the test suite and by embedded callers; supports injected write
//! failures so error paths can be exercised.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::codec::FlatRecord;

use super::client::{BatchCommand, SortCommand, StorageClient};
use super::errors::{StorageError, StorageResult};

#[derive(Debug)]
struct MemoryState {
    hashes: BTreeMap<String, FlatRecord>,
    sets: BTreeMap<String, BTreeSet<String>>,
    counters: BTreeMap<String, u64>,
    connected: bool,
    write_failure: Option<String>,
}

impl MemoryState {
    fn new() -> Self {
        Self {
            hashes: BTreeMap::new(),
            sets: BTreeMap::new(),
            counters: BTreeMap::new(),
            connected: true,
            write_failure: None,
        }
    }
}

/// In-memory [`StorageClient`] over shared state.
///
/// Cloning yields another handle to the same state, mirroring a shared
/// connection.
#[derive(Debug, Clone)]
pub struct MemoryClient {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryClient {
    /// Create a fresh, connected client
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState::new())),
        }
    }

    /// Make every subsequent write fail with the given reason, until
    /// [`Self::restore_writes`] is called
    pub fn fail_writes(&self, reason: impl Into<String>) {
        if let Ok(mut state) = self.state.write() {
            state.write_failure = Some(reason.into());
        }
    }

    /// Clear an injected write failure
    pub fn restore_writes(&self) {
        if let Ok(mut state) = self.state.write() {
            state.write_failure = None;
        }
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, MemoryState>> {
        let guard = self
            .state
            .read()
            .map_err(|_| StorageError::Connection("state lock poisoned".into()))?;
        if !guard.connected {
            return Err(StorageError::Disconnected);
        }
        Ok(guard)
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, MemoryState>> {
        let guard = self
            .state
            .write()
            .map_err(|_| StorageError::Connection("state lock poisoned".into()))?;
        if !guard.connected {
            return Err(StorageError::Disconnected);
        }
        Ok(guard)
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Order two sort values: absent first, numeric when both sides are
/// numeric, lexicographic otherwise
fn compare_values(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(na), Ok(nb)) => na.partial_cmp(&nb).unwrap_or(Ordering::Equal),
            _ => a.cmp(b),
        },
    }
}

fn apply_command(state: &mut MemoryState, command: BatchCommand) {
    match command {
        BatchCommand::HashSet { key, fields } => {
            state.hashes.entry(key).or_default().extend(fields);
        }
        BatchCommand::SetAdd { key, member } => {
            state.sets.entry(key).or_default().insert(member);
        }
        BatchCommand::SetRemove { key, member } => {
            if let Some(set) = state.sets.get_mut(&key) {
                set.remove(&member);
            }
        }
        BatchCommand::Delete { key } => {
            state.hashes.remove(&key);
            state.sets.remove(&key);
            state.counters.remove(&key);
        }
    }
}

impl StorageClient for MemoryClient {
    async fn incr(&self, key: &str) -> StorageResult<u64> {
        let mut state = self.write()?;
        let counter = state.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn hash_set(&self, key: &str, fields: FlatRecord) -> StorageResult<()> {
        let mut state = self.write()?;
        if let Some(reason) = state.write_failure.clone() {
            return Err(StorageError::write(key, reason));
        }
        state.hashes.entry(key.to_string()).or_default().extend(fields);
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> StorageResult<FlatRecord> {
        let state = self.read()?;
        Ok(state.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn hash_get_many(&self, keys: &[String]) -> StorageResult<Vec<FlatRecord>> {
        let state = self.read()?;
        Ok(keys
            .iter()
            .map(|key| state.hashes.get(key).cloned().unwrap_or_default())
            .collect())
    }

    async fn set_add(&self, key: &str, member: &str) -> StorageResult<()> {
        let mut state = self.write()?;
        if let Some(reason) = state.write_failure.clone() {
            return Err(StorageError::write(key, reason));
        }
        state
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> StorageResult<()> {
        let mut state = self.write()?;
        if let Some(reason) = state.write_failure.clone() {
            return Err(StorageError::write(key, reason));
        }
        if let Some(set) = state.sets.get_mut(key) {
            set.remove(member);
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> StorageResult<Vec<String>> {
        let state = self.read()?;
        Ok(state
            .sets
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn set_intersect(&self, keys: &[String]) -> StorageResult<Vec<String>> {
        let state = self.read()?;
        let mut sets = keys.iter().map(|k| state.sets.get(k));

        let Some(first) = sets.next().flatten() else {
            return Ok(Vec::new());
        };

        let mut result: BTreeSet<String> = first.clone();
        for set in sets {
            match set {
                Some(s) => result.retain(|m| s.contains(m)),
                None => return Ok(Vec::new()),
            }
        }
        Ok(result.into_iter().collect())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut state = self.write()?;
        if let Some(reason) = state.write_failure.clone() {
            return Err(StorageError::write(key, reason));
        }
        state.hashes.remove(key);
        state.sets.remove(key);
        state.counters.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let state = self.read()?;
        Ok(state.hashes.contains_key(key)
            || state.sets.contains_key(key)
            || state.counters.contains_key(key))
    }

    async fn keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let state = self.read()?;
        let mut keys: Vec<String> = state
            .hashes
            .keys()
            .chain(state.sets.keys())
            .chain(state.counters.keys())
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn sort(&self, cmd: SortCommand) -> StorageResult<Vec<String>> {
        let state = self.read()?;
        let mut members: Vec<String> = state
            .sets
            .get(&cmd.set_key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();

        if cmd.by.is_empty() {
            members.sort_by(|a, b| compare_values(Some(a), Some(b)));
        } else {
            members.sort_by(|a, b| {
                for by in &cmd.by {
                    let value_of = |member: &str| -> Option<&str> {
                        state
                            .hashes
                            .get(&by.key_pattern.replace('*', member))
                            .and_then(|h| h.get(&by.field))
                            .map(String::as_str)
                    };
                    let ord = compare_values(value_of(a), value_of(b));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        if cmd.descending {
            members.reverse();
        }

        if let Some(window) = cmd.window {
            members = members
                .into_iter()
                .skip(window.offset)
                .take(window.count)
                .collect();
        }

        Ok(members)
    }

    async fn exec_batch(&self, commands: Vec<BatchCommand>) -> StorageResult<()> {
        let mut state = self.write()?;
        if let Some(reason) = state.write_failure.clone() {
            let key = commands
                .first()
                .map(|c| match c {
                    BatchCommand::HashSet { key, .. }
                    | BatchCommand::SetAdd { key, .. }
                    | BatchCommand::SetRemove { key, .. }
                    | BatchCommand::Delete { key } => key.clone(),
                })
                .unwrap_or_default();
            return Err(StorageError::write(key, reason));
        }

        // Single lock scope: the whole batch lands or none of it does.
        for command in commands {
            apply_command(&mut state, command);
        }
        Ok(())
    }

    async fn quit(&self) -> StorageResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::Connection("state lock poisoned".into()))?;
        state.connected = false;
        Ok(())
    }
}
