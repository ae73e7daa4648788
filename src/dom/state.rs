use crate::types::ProfileRecord;
use serde::{Deserialize, Serialize};

/// Records extracted from one read of the fully expanded list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub records: Vec<ProfileRecord>,
    /// Elements rejected because they had no link target.
    pub dropped: usize,
    /// Elements collapsed into an earlier record with the same URL.
    pub duplicates: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            dropped: 0,
            duplicates: 0,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

impl Default for ExtractionResult {
    fn default() -> Self {
        Self::new()
    }
}
