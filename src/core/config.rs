use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub browser: BrowserConfig,
    pub pagination: PaginationConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub args: Vec<String>,
    /// Chrome user-data directory holding the logged-in session.
    pub profile_path: Option<PathBuf>,
    /// Chrome is dropped after this long without a DevTools message.
    pub idle_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// How long a single locate attempt waits for a clickable expand control.
    pub locate_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Upper bound on expansions; `None` trusts the timeout alone.
    pub max_iterations: Option<u32>,
    /// Consecutive stale-element races tolerated before giving up.
    pub stale_retry_limit: u32,
    pub navigation_timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub missing_link_policy: MissingLinkPolicy,
}

/// What to do with a result link that carries no `href`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingLinkPolicy {
    #[default]
    Drop,
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            viewport: Viewport::default(),
            user_agent: None,
            args: vec![],
            profile_path: None,
            idle_timeout_ms: 300000,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            locate_timeout_ms: 10000,
            poll_interval_ms: 500,
            max_iterations: None,
            stale_retry_limit: 5,
            navigation_timeout_ms: 30000,
        }
    }
}

impl PaginationConfig {
    pub fn locate_timeout(&self) -> Duration {
        Duration::from_millis(self.locate_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}
