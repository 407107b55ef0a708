use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use parking_lot::RwLock;
use tracing::debug;
use crate::core::error::{Error, Result};
use crate::core::types::PlaceId;
use crate::index::client::IndexClient;
use crate::index::operation::{BulkItemResult, BulkOperation, BulkResponse};
use crate::mapper::field_mapper::Payload;

/// In-process place collection.
///
/// Applies bulk operations the way the search index does: create replaces,
/// update merges top-level fields into an existing document, delete ignores
/// unknown ids.
pub struct MemoryIndex {
    docs: RwLock<HashMap<PlaceId, Payload>>,
    available: AtomicBool,
    bulk_requests: AtomicUsize,
}

impl MemoryIndex {
    pub fn new() -> Self {
        MemoryIndex {
            docs: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            bulk_requests: AtomicUsize::new(0),
        }
    }

    /// Simulate the index going away or coming back
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn get(&self, id: PlaceId) -> Option<Payload> {
        self.docs.read().get(&id).cloned()
    }

    pub fn insert(&self, id: PlaceId, payload: Payload) {
        self.docs.write().insert(id, payload);
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Number of bulk requests received so far
    pub fn bulk_requests(&self) -> usize {
        self.bulk_requests.load(Ordering::Relaxed)
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::unavailable("memory index is offline"))
        }
    }

    fn apply(docs: &mut HashMap<PlaceId, Payload>, operation: BulkOperation) -> BulkItemResult {
        let id = operation.id();
        let action = operation.action();

        match operation {
            BulkOperation::Create { payload, .. } => {
                docs.insert(id, payload);
                BulkItemResult::ok(id, action)
            }
            BulkOperation::Update { payload, .. } => match docs.get_mut(&id) {
                Some(stored) => {
                    for (field, value) in payload {
                        stored.insert(field, value);
                    }
                    BulkItemResult::ok(id, action)
                }
                None => BulkItemResult::failed(id, action, "document missing"),
            },
            BulkOperation::Delete { .. } => {
                docs.remove(&id);
                BulkItemResult::ok(id, action)
            }
        }
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexClient for MemoryIndex {
    fn exists(&self, id: PlaceId) -> Result<bool> {
        self.check_available()?;
        Ok(self.docs.read().contains_key(&id))
    }

    fn bulk(&self, operations: Vec<BulkOperation>) -> Result<BulkResponse> {
        self.check_available()?;
        self.bulk_requests.fetch_add(1, Ordering::Relaxed);

        let mut docs = self.docs.write();
        let items: Vec<BulkItemResult> = operations
            .into_iter()
            .map(|operation| Self::apply(&mut docs, operation))
            .collect();

        debug!(operations = items.len(), stored = docs.len(), "memory index applied bulk request");
        Ok(BulkResponse::new(items))
    }
}
