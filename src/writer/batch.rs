use std::mem;
use crate::index::operation::{BulkAction, BulkOperation};

/// Pending operations between two flushes, in staging order
#[derive(Debug, Default)]
pub struct Batch {
    buffer: Vec<BulkOperation>,
}

impl Batch {
    pub fn new() -> Self {
        Batch { buffer: Vec::new() }
    }

    pub fn add(&mut self, operation: BulkOperation) {
        self.buffer.push(operation);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn operations(&self) -> &[BulkOperation] {
        &self.buffer
    }

    pub fn count(&self, action: BulkAction) -> usize {
        self.buffer.iter().filter(|op| op.action() == action).count()
    }

    /// Hand out every staged operation and leave a fresh empty batch behind.
    pub fn take(&mut self) -> Vec<BulkOperation> {
        mem::take(&mut self.buffer)
    }
}
