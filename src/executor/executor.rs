//! Query execution
//!
//! Executes the selected strategy against storage:
//!
//! 1. Obtain candidate record keys (sorted traversal, index intersection,
//!    or namespace scan)
//! 2. Bulk-fetch every candidate in one batched round trip
//! 3. Decode through the codec, skipping ghost candidates (keys whose
//!    record no longer exists)
//! 4. Apply the residual filter, unless index intersection already
//!    satisfied the whole filter
//!
//! Pagination is applied by the storage-side sort window and only there;
//! the other strategies return the full filtered candidate set.

use std::time::Instant;

use crate::codec;
use crate::index::IndexManager;
use crate::observability::CommandLog;
use crate::planner::{self, Query, SortDirection, Strategy};
use crate::schema::{Attributes, FieldValue, ModelDef, ID_FIELD};
use crate::storage::{keys, SortBy, SortCommand, SortWindow, StorageClient, StorageResult};

use super::filters::FilterEvaluator;

/// Executes queries for one store
pub struct QueryExecutor<'a, C: StorageClient> {
    client: &'a C,
    indexes: &'a IndexManager,
    log: &'a CommandLog,
}

impl<'a, C: StorageClient> QueryExecutor<'a, C> {
    /// Create an executor borrowing the store's collaborators
    pub fn new(client: &'a C, indexes: &'a IndexManager, log: &'a CommandLog) -> Self {
        Self {
            client,
            indexes,
            log,
        }
    }

    /// Run a query and return the decoded, filtered records
    pub async fn run(&self, model: &ModelDef, query: &Query) -> StorageResult<Vec<Attributes>> {
        let strategy = planner::select(self.indexes, model, query);
        let (candidates, filter_satisfied) = self.candidate_keys(model, query, strategy).await?;

        let started = Instant::now();
        let fetched = self.client.hash_get_many(&candidates).await?;
        self.log
            .command("MULTI HGETALL", &model.name, started.elapsed());

        let mut records = Vec::with_capacity(fetched.len());
        for (key, flat) in candidates.iter().zip(fetched) {
            if flat.is_empty() {
                // Ghost candidate: a stale index or membership entry whose
                // record is gone.
                continue;
            }

            let mut attrs = codec::decode_record(model, flat);
            if let Some(id) = keys::id_from_record_key(&model.name, key) {
                attrs.insert(ID_FIELD.to_string(), FieldValue::Integer(id as i64));
            }
            records.push(attrs);
        }

        if !filter_satisfied {
            if let Some(where_clause) = &query.where_clause {
                records.retain(|record| FilterEvaluator::matches(where_clause, record));
            }
        }

        Ok(records)
    }

    /// Issue the storage command for the strategy; returns the candidate
    /// record keys and whether the filter is already fully satisfied.
    async fn candidate_keys(
        &self,
        model: &ModelDef,
        query: &Query,
        strategy: Strategy,
    ) -> StorageResult<(Vec<String>, bool)> {
        match strategy {
            Strategy::SortTraversal => {
                let command = sort_command(model, query);
                let started = Instant::now();
                let ids = self.client.sort(command).await?;
                self.log
                    .command("SORT", &keys::members(&model.name), started.elapsed());

                let prefix = keys::record_prefix(&model.name);
                let record_keys = ids
                    .into_iter()
                    .map(|id| format!("{}{}", prefix, id))
                    .collect();
                Ok((record_keys, false))
            }
            Strategy::IndexIntersection {
                keys: index_keys,
                fully_satisfied,
            } => {
                let started = Instant::now();
                // Members of index sets are composite record keys already.
                let record_keys = self.client.set_intersect(&index_keys).await?;
                self.log
                    .command("SINTER", &index_keys.join(" "), started.elapsed());
                Ok((record_keys, fully_satisfied))
            }
            Strategy::FullScan => {
                let prefix = keys::record_prefix(&model.name);
                let started = Instant::now();
                let record_keys = self.client.keys(&prefix).await?;
                self.log.command("KEYS", &prefix, started.elapsed());
                Ok((record_keys, false))
            }
        }
    }
}

/// Build the storage sort command for a sorted traversal.
///
/// Sort keys are read live from each candidate record; with no order
/// fields the membership list is sorted by the primary keys themselves.
/// The window is only set when a limit was requested.
fn sort_command(model: &ModelDef, query: &Query) -> SortCommand {
    let mut command = SortCommand::new(keys::members(&model.name));
    let pattern = format!("{}*", keys::record_prefix(&model.name));

    for order in &query.order {
        command.by.push(SortBy {
            key_pattern: pattern.clone(),
            field: order.field.clone(),
        });
    }

    command.descending = query
        .order
        .first()
        .map(|order| order.direction == SortDirection::Desc)
        .unwrap_or(false);

    if let Some(limit) = query.limit {
        command.window = Some(SortWindow {
            offset: query.offset,
            count: limit,
        });
    }

    command
}
