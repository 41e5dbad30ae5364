//! Record store
//!
//! The CRUD facade over the storage connection: id allocation, encoded
//! writes with index maintenance, typed reads, deletion, counting, and the
//! query entry point.
//!
//! Writes are batched: the record fields, the membership-list append (on
//! create), and every index mutation land in one atomic batch, so a failed
//! write leaves no partial index state behind. Only id allocation stays
//! outside the batch — the increment is durable and monotonic even when
//! the write that follows it fails, which leaves a gap in the id sequence
//! but never an orphaned record.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use crate::codec::{self, FlatRecord};
use crate::executor::QueryExecutor;
use crate::index::IndexManager;
use crate::observability::CommandLog;
use crate::planner::Query;
use crate::schema::{Attributes, FieldValue, ModelDef, ModelRegistry, ID_FIELD};
use crate::storage::{keys, BatchCommand, StorageClient};

use super::errors::{StoreError, StoreResult};

/// Outcome of a [`RecordStore::reconcile`] pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    /// Ids present in the namespace but absent from the membership list
    pub added: usize,
    /// Listed ids whose record no longer exists
    pub removed: usize,
}

/// Typed record CRUD over a shared storage connection.
///
/// Holds the immutable model registry (through the index manager) and the
/// single storage client. All operations take `&self`; nothing here blocks
/// or limits in-flight concurrency, and no isolation exists between
/// concurrent calls beyond the atomicity of each batch.
pub struct RecordStore<C> {
    client: C,
    indexes: IndexManager,
    log: CommandLog,
}

impl<C: StorageClient> RecordStore<C> {
    /// Create a store over a connected client and a frozen registry
    pub fn new(client: C, registry: Arc<ModelRegistry>) -> Self {
        Self {
            client,
            indexes: IndexManager::new(registry),
            log: CommandLog::default(),
        }
    }

    /// Replace the command logger
    pub fn with_log(mut self, log: CommandLog) -> Self {
        self.log = log;
        self
    }

    /// Create a record: allocate the next id, then apply the record write,
    /// the membership-list append, and the index additions as one atomic
    /// batch. Returns the assigned id.
    pub async fn create(&self, model: &str, mut data: Attributes) -> StoreResult<u64> {
        let def = self.indexes.model(model)?;

        let counter_key = keys::counter(model);
        let started = Instant::now();
        let id = self.client.incr(&counter_key).await?;
        self.log.command("INCR", &counter_key, started.elapsed());

        data.insert(ID_FIELD.to_string(), FieldValue::Integer(id as i64));
        self.write_record(def, id, &data, true).await?;
        Ok(id)
    }

    /// Write the full attribute set of an existing record and update
    /// indexes for exactly the fields present in `data`. The record must
    /// carry its id.
    pub async fn save(&self, model: &str, data: Attributes) -> StoreResult<()> {
        let def = self.indexes.model(model)?;
        let id = record_id(&data).ok_or_else(|| StoreError::MissingId {
            model: model.to_string(),
        })?;
        self.write_record(def, id, &data, false).await
    }

    /// Merge partial fields into a stored record and update indexes only
    /// for the fields supplied
    pub async fn update_attributes(
        &self,
        model: &str,
        id: u64,
        partial: Attributes,
    ) -> StoreResult<()> {
        let def = self.indexes.model(model)?;
        self.write_record(def, id, &partial, false).await
    }

    /// Fetch and decode one record. Returns `None` when the stored id
    /// field is absent — a missing record, never a partial one.
    pub async fn find(&self, model: &str, id: u64) -> StoreResult<Option<Attributes>> {
        let def = self.indexes.model(model)?;
        let record_key = keys::record(model, id);

        let started = Instant::now();
        let flat = self.client.hash_get_all(&record_key).await?;
        self.log.command("HGETALL", &record_key, started.elapsed());

        if !flat.contains_key(ID_FIELD) {
            return Ok(None);
        }

        let mut attrs = codec::decode_record(def, flat);
        // The requested id is authoritative over whatever was stored.
        attrs.insert(ID_FIELD.to_string(), FieldValue::Integer(id as i64));
        Ok(Some(attrs))
    }

    /// Whether a record exists
    pub async fn exists(&self, model: &str, id: u64) -> StoreResult<bool> {
        self.indexes.model(model)?;
        let record_key = keys::record(model, id);

        let started = Instant::now();
        let found = self.client.exists(&record_key).await?;
        self.log.command("EXISTS", &record_key, started.elapsed());
        Ok(found)
    }

    /// Delete one record and drop it from the membership list.
    ///
    /// The two deletions run concurrently with no ordering guarantee
    /// between them; both are joined before the operation completes.
    /// Index memberships are left behind — queries skip the resulting
    /// ghost candidates.
    pub async fn destroy(&self, model: &str, id: u64) -> StoreResult<()> {
        self.indexes.model(model)?;
        let record_key = keys::record(model, id);
        let members_key = keys::members(model);

        let started = Instant::now();
        let id_str = id.to_string();
        let (deleted, unlisted) = tokio::join!(
            self.client.delete(&record_key),
            self.client.set_remove(&members_key, &id_str),
        );
        self.log.command("DEL", &record_key, started.elapsed());

        deleted?;
        unlisted?;
        Ok(())
    }

    /// Delete every key under the type's namespace in one batch
    pub async fn destroy_all(&self, model: &str) -> StoreResult<()> {
        self.indexes.model(model)?;
        let prefix = keys::record_prefix(model);

        let started = Instant::now();
        let found = self.client.keys(&prefix).await?;
        self.log.command("KEYS", &prefix, started.elapsed());

        let batch: Vec<BatchCommand> = found
            .into_iter()
            .map(|key| BatchCommand::Delete { key })
            .collect();

        let started = Instant::now();
        self.client.exec_batch(batch).await?;
        self.log.command("MULTI DEL", &prefix, started.elapsed());
        Ok(())
    }

    /// Number of records under the type's namespace.
    ///
    /// Counts the namespace enumeration, not the membership list; the two
    /// can diverge after partial failures, and `reconcile` repairs the
    /// list from the namespace.
    pub async fn count(&self, model: &str) -> StoreResult<usize> {
        self.indexes.model(model)?;
        let prefix = keys::record_prefix(model);

        let started = Instant::now();
        let found = self.client.keys(&prefix).await?;
        self.log.command("KEYS", &prefix, started.elapsed());
        Ok(found.len())
    }

    /// Run a filtered, optionally sorted and paginated query
    pub async fn all(&self, model: &str, query: &Query) -> StoreResult<Vec<Attributes>> {
        let def = self.indexes.model(model)?;
        let executor = QueryExecutor::new(&self.client, &self.indexes, &self.log);
        Ok(executor.run(def, query).await?)
    }

    /// Repair the membership list against the namespace enumeration:
    /// add ids whose record exists but is unlisted, drop listed ids whose
    /// record is gone. All corrections land in one batch.
    pub async fn reconcile(&self, model: &str) -> StoreResult<ReconcileReport> {
        self.indexes.model(model)?;
        let prefix = keys::record_prefix(model);
        let members_key = keys::members(model);

        let present: BTreeSet<u64> = self
            .client
            .keys(&prefix)
            .await?
            .iter()
            .filter_map(|key| keys::id_from_record_key(model, key))
            .collect();
        let listed: BTreeSet<u64> = self
            .client
            .set_members(&members_key)
            .await?
            .iter()
            .filter_map(|member| member.parse().ok())
            .collect();

        let mut batch = Vec::new();
        let mut report = ReconcileReport::default();

        for id in present.difference(&listed) {
            batch.push(BatchCommand::SetAdd {
                key: members_key.clone(),
                member: id.to_string(),
            });
            report.added += 1;
        }
        for id in listed.difference(&present) {
            batch.push(BatchCommand::SetRemove {
                key: members_key.clone(),
                member: id.to_string(),
            });
            report.removed += 1;
        }

        if !batch.is_empty() {
            let started = Instant::now();
            self.client.exec_batch(batch).await?;
            self.log.command("MULTI", &members_key, started.elapsed());
        }

        Ok(report)
    }

    /// Release the storage connection. Consumes the store; no further
    /// operations are possible afterward.
    pub async fn disconnect(self) -> StoreResult<()> {
        let started = Instant::now();
        self.client.quit().await?;
        self.log.command("QUIT", "", started.elapsed());
        Ok(())
    }

    /// Encode and write a record, folding the membership append (for
    /// creates) and every index mutation into one atomic batch. The
    /// prior-value fetch for stale-index removal only happens when an
    /// indexed field is being written.
    async fn write_record(
        &self,
        def: &ModelDef,
        id: u64,
        data: &Attributes,
        with_membership: bool,
    ) -> StoreResult<()> {
        let record_key = keys::record(&def.name, id);

        let prior = if self.indexes.touches_indexes(def, data) {
            let started = Instant::now();
            let prior = self.client.hash_get_all(&record_key).await?;
            self.log.command("HGETALL", &record_key, started.elapsed());
            prior
        } else {
            FlatRecord::new()
        };

        let mut batch = vec![BatchCommand::HashSet {
            key: record_key.clone(),
            fields: codec::encode_record(data),
        }];
        if with_membership {
            batch.push(BatchCommand::SetAdd {
                key: keys::members(&def.name),
                member: id.to_string(),
            });
        }
        batch.extend(self.indexes.write_mutations(def, id, data, &prior));

        let started = Instant::now();
        if let Err(err) = self.client.exec_batch(batch).await {
            self.log.failure("write", &err.to_string());
            return Err(err.into());
        }
        self.log.command("MULTI", &record_key, started.elapsed());
        Ok(())
    }
}

/// Extract a record's id from its attributes, accepting the integer form
/// or numeric text
fn record_id(data: &Attributes) -> Option<u64> {
    match data.get(ID_FIELD) {
        Some(FieldValue::Integer(id)) if *id >= 0 => Some(*id as u64),
        Some(FieldValue::Text(raw)) => raw.parse().ok(),
        _ => None,
    }
}
