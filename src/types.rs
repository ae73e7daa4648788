use serde::{Deserialize, Serialize};

/// One person who likes the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(rename = "Name")]
    pub display_name: String,
    #[serde(rename = "URL")]
    pub profile_url: String,
}

impl ProfileRecord {
    pub fn new(display_name: impl Into<String>, profile_url: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            profile_url: profile_url.into(),
        }
    }
}

/// Counters reported once a run finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub expansions: u32,
    pub locate_attempts: u32,
    pub stale_retries: u32,
    pub records_written: usize,
    pub records_dropped: usize,
    /// When the expanded listing was read.
    pub extracted_at: chrono::DateTime<chrono::Utc>,
}
