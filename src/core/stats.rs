use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// Running totals of one updater, for progress reporting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdaterStats {
    // Staging
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,

    // Flushing
    pub flushes: usize,
    pub submitted: usize,
    pub failed: usize,
    pub last_flush_time: Option<DateTime<Utc>>,
}

impl UpdaterStats {
    pub fn staged(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    /// Operations accepted by the index
    pub fn succeeded(&self) -> usize {
        self.submitted.saturating_sub(self.failed)
    }
}

/// Result of one flush
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlushReport {
    pub submitted: usize,
    pub failed: usize,
    pub flushed_at: DateTime<Utc>,
}

impl FlushReport {
    pub fn empty(flushed_at: DateTime<Utc>) -> Self {
        FlushReport { submitted: 0, failed: 0, flushed_at }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
