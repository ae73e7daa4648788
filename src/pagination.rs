//! Expansion loop for the likes listing.
//!
//! The listing has no "end of list" marker. The driver keeps clicking the
//! expand control until a locate attempt times out, which is the only
//! signal that everything is loaded:
//!
//! ```text
//! Scanning --found--> Expanding --clicked--> Scanning
//! Scanning --timed out--> Exhausted
//! Scanning --cap reached--> Aborted
//! ```

use crate::core::{Locate, PaginationConfig, SessionTrait};
use crate::errors::{LikersError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationState {
    Scanning,
    Expanding,
    /// No clickable expand control appeared within the timeout.
    Exhausted,
    /// The iteration cap was hit while the control was still present.
    Aborted,
}

impl PaginationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PaginationState::Exhausted | PaginationState::Aborted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationReport {
    pub state: PaginationState,
    pub expansions: u32,
    pub locate_attempts: u32,
    pub stale_retries: u32,
}

impl PaginationReport {
    pub fn is_complete(&self) -> bool {
        self.state == PaginationState::Exhausted
    }
}

pub struct PaginationDriver<'a, S: SessionTrait> {
    session: &'a S,
    locator: &'a str,
    config: PaginationConfig,
}

impl<'a, S: SessionTrait> PaginationDriver<'a, S> {
    pub fn new(session: &'a S, locator: &'a str, config: PaginationConfig) -> Self {
        Self {
            session,
            locator,
            config,
        }
    }

    /// Expands the list until the control disappears or the cap is reached.
    ///
    /// Both outcomes are returned as a report; callers must check
    /// [`PaginationReport::is_complete`] before trusting the listing.
    /// Session failures and stale races beyond `stale_retry_limit` are errors.
    pub async fn run(&self) -> Result<PaginationReport> {
        let timeout = self.config.locate_timeout();
        let mut state = PaginationState::Scanning;
        let mut expansions = 0u32;
        let mut locate_attempts = 0u32;
        let mut stale_retries = 0u32;
        let mut consecutive_stale = 0u32;

        while !state.is_terminal() {
            locate_attempts += 1;
            let element = match self
                .session
                .find_clickable_within_timeout(self.locator, timeout)
                .await?
            {
                Locate::Found(element) => element,
                Locate::TimedOut => {
                    state = self.transition(state, PaginationState::Exhausted);
                    continue;
                }
            };

            if self
                .config
                .max_iterations
                .is_some_and(|cap| expansions >= cap)
            {
                state = self.transition(state, PaginationState::Aborted);
                continue;
            }

            state = self.transition(state, PaginationState::Expanding);
            match self.expand(&element).await {
                Ok(()) => {
                    expansions += 1;
                    consecutive_stale = 0;
                    info!(expansions, "Expanded likes listing");
                }
                Err(err) if err.is_stale() => {
                    stale_retries += 1;
                    consecutive_stale += 1;
                    if consecutive_stale > self.config.stale_retry_limit {
                        return Err(LikersError::SessionError(format!(
                            "expand control went stale {} times in a row",
                            consecutive_stale
                        )));
                    }
                    debug!(consecutive_stale, "Expand control went stale, retrying");
                }
                Err(err) => return Err(err),
            }
            state = self.transition(state, PaginationState::Scanning);
        }

        if state == PaginationState::Aborted {
            warn!(
                expansions,
                cap = ?self.config.max_iterations,
                "Expand control still present at the iteration cap"
            );
        }

        Ok(PaginationReport {
            state,
            expansions,
            locate_attempts,
            stale_retries,
        })
    }

    async fn expand(&self, element: &S::Element) -> Result<()> {
        self.session.scroll_into_view(element).await?;
        self.session.click(element).await
    }

    fn transition(&self, from: PaginationState, to: PaginationState) -> PaginationState {
        debug!(?from, ?to, "Pagination state change");
        to
    }
}
