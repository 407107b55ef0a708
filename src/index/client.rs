use crate::core::error::Result;
use crate::core::types::PlaceId;
use crate::index::operation::{BulkOperation, BulkResponse};

/// Connection to the place collection of a search index.
///
/// Both calls block until the index answers. Timeouts, if any, belong to the
/// implementation and surface as `Err`.
pub trait IndexClient {
    /// Whether a document with this id is stored in the collection.
    fn exists(&self, id: PlaceId) -> Result<bool>;

    /// Submit operations as one bulk request.
    ///
    /// `Err` means the request as a whole failed. Failures of single
    /// operations are reported in the returned `BulkResponse`.
    fn bulk(&self, operations: Vec<BulkOperation>) -> Result<BulkResponse>;
}

impl<C: IndexClient + ?Sized> IndexClient for &C {
    fn exists(&self, id: PlaceId) -> Result<bool> {
        (**self).exists(id)
    }

    fn bulk(&self, operations: Vec<BulkOperation>) -> Result<BulkResponse> {
        (**self).bulk(operations)
    }
}

impl<C: IndexClient + ?Sized> IndexClient for std::sync::Arc<C> {
    fn exists(&self, id: PlaceId) -> Result<bool> {
        (**self).exists(id)
    }

    fn bulk(&self, operations: Vec<BulkOperation>) -> Result<BulkResponse> {
        (**self).bulk(operations)
    }
}
