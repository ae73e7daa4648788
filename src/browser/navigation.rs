use crate::browser::scripts;
use crate::core::BrowserTrait;
use crate::errors::{LikersError, Result};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

pub struct NavigationManager;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadyState {
    ready_state: String,
    url: String,
}

impl NavigationManager {
    /// Polls `document.readyState` until the page reports `complete`.
    ///
    /// Evaluation errors while the old document is torn down are expected
    /// and only logged.
    pub async fn wait_for_navigation_complete<B: BrowserTrait>(
        browser: &B,
        tab: &B::TabHandle,
        timeout_ms: u64,
    ) -> Result<NavigationResult> {
        let start_time = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);

        while start_time.elapsed() < timeout {
            match browser.execute_script(tab, scripts::READY_STATE).await {
                Ok(value) => {
                    let state = value
                        .as_str()
                        .and_then(|raw| serde_json::from_str::<ReadyState>(raw).ok());
                    if let Some(state) = state {
                        if state.ready_state == "complete" {
                            return Ok(NavigationResult {
                                url: state.url,
                                duration_ms: start_time.elapsed().as_millis() as u64,
                            });
                        }
                    }
                }
                Err(e) => {
                    debug!("Ready-state probe failed during navigation: {}", e);
                }
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        Err(LikersError::TimeoutError(format!(
            "page did not finish loading within {}ms",
            timeout_ms
        )))
    }
}

#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// Address the tab settled on, after any redirects.
    pub url: String,
    pub duration_ms: u64,
}
