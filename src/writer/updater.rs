use chrono::Utc;
use tracing::{debug, error};
use crate::core::error::{Error, Result};
use crate::core::stats::{FlushReport, UpdaterStats};
use crate::core::types::{PlaceDoc, PlaceId};
use crate::index::client::IndexClient;
use crate::index::operation::BulkOperation;
use crate::mapper::field_mapper::{FieldMapper, PlaceFieldMapper};
use crate::writer::batch::Batch;

/// What `upsert` staged for a place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    /// The place could not be converted; nothing was staged
    Skipped,
}

/// Importer-facing write interface
pub trait Updater {
    fn update_or_create(&mut self, doc: &PlaceDoc) -> Result<UpsertOutcome>;
    fn delete(&mut self, id: PlaceId);
    fn finish(&mut self) -> Result<FlushReport>;
}

/// Stages creates, updates and deletes and submits them as one bulk request
/// per flush.
///
/// Not meant for concurrent callers: every method takes `&mut self`. Use one
/// updater per worker, or put it behind a mutex.
///
/// Operations are dropped from the batch when it is submitted, whatever the
/// outcome. Items the index rejects are logged and counted in the
/// `FlushReport`, never retried.
pub struct BulkUpdater<C: IndexClient, M: FieldMapper = PlaceFieldMapper> {
    client: C,
    mapper: M,
    batch: Batch,
    stats: UpdaterStats,
}

impl<C: IndexClient> BulkUpdater<C, PlaceFieldMapper> {
    pub fn new(client: C) -> Self {
        Self::with_mapper(client, PlaceFieldMapper::new())
    }
}

impl<C: IndexClient, M: FieldMapper> BulkUpdater<C, M> {
    pub fn with_mapper(client: C, mapper: M) -> Self {
        BulkUpdater {
            client,
            mapper,
            batch: Batch::new(),
            stats: UpdaterStats::default(),
        }
    }

    pub fn stats(&self) -> &UpdaterStats {
        &self.stats
    }

    /// Operations staged since the last flush
    pub fn pending(&self) -> &[BulkOperation] {
        self.batch.operations()
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Stage an update if the index already holds the place, a create otherwise.
    ///
    /// A failed existence check is returned as an error and stages nothing.
    /// A place the mapper rejects is logged and skipped.
    pub fn upsert(&mut self, doc: &PlaceDoc) -> Result<UpsertOutcome> {
        let id = doc.place_id;
        let exists = self.client.exists(id).map_err(|e| {
            Error::new(e.kind, format!("existence check for place {} failed: {}", id, e.context))
        })?;

        let payload = match self.mapper.to_payload(doc) {
            Ok(payload) => payload,
            Err(e) => {
                let action = if exists { "update" } else { "creation" };
                error!(place_id = id.value(), error = %e, "{} of doc [{}] failed", action, doc);
                self.stats.skipped += 1;
                return Ok(UpsertOutcome::Skipped);
            }
        };

        if exists {
            self.batch.add(BulkOperation::Update { id, payload });
            self.stats.updated += 1;
            Ok(UpsertOutcome::Updated)
        } else {
            self.batch.add(BulkOperation::Create { id, payload });
            self.stats.created += 1;
            Ok(UpsertOutcome::Created)
        }
    }

    /// Stage a delete. The index is not consulted.
    pub fn delete(&mut self, id: PlaceId) {
        self.batch.add(BulkOperation::Delete { id });
        self.stats.deleted += 1;
    }

    /// Submit the staged operations as one bulk request.
    ///
    /// The batch is empty afterwards in every case. Rejected items are
    /// logged and counted; only a failure of the whole request is returned
    /// as an error. An empty batch is not sent.
    pub fn flush(&mut self) -> Result<FlushReport> {
        let operations = self.batch.take();
        let flushed_at = Utc::now();
        self.stats.last_flush_time = Some(flushed_at);

        if operations.is_empty() {
            debug!("nothing to flush");
            return Ok(FlushReport::empty(flushed_at));
        }

        let submitted = operations.len();
        self.stats.flushes += 1;

        let response = match self.client.bulk(operations) {
            Ok(response) => response,
            Err(e) => {
                error!(operations = submitted, error = %e, "bulk request failed, operations dropped");
                self.stats.submitted += submitted;
                self.stats.failed += submitted;
                return Err(e);
            }
        };

        // a client may report more items than it was sent
        let failed = response.failure_count().min(submitted);
        if response.has_failures() {
            error!(operations = submitted, failed, "error while bulk update: {}", response.failure_message());
        } else {
            debug!(operations = submitted, "bulk update done");
        }

        self.stats.submitted += submitted;
        self.stats.failed += failed;

        Ok(FlushReport { submitted, failed, flushed_at })
    }
}

impl<C: IndexClient, M: FieldMapper> Updater for BulkUpdater<C, M> {
    fn update_or_create(&mut self, doc: &PlaceDoc) -> Result<UpsertOutcome> {
        self.upsert(doc)
    }

    fn delete(&mut self, id: PlaceId) {
        BulkUpdater::delete(self, id)
    }

    fn finish(&mut self) -> Result<FlushReport> {
        self.flush()
    }
}
