//! In-memory stand-in for a browser session.
//!
//! [`ScriptedSession`] replays a fixed sequence of locate outcomes so the
//! pagination loop and the run orchestration can be exercised without a
//! browser or a real timer.

use crate::core::{Locate, SessionTrait};
use crate::dom::RawResultElement;
use crate::errors::{LikersError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Outcome of one locate call on a [`ScriptedSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A clickable control is found and clicking it succeeds.
    Found,
    /// A control is found but detaches before it can be scrolled to.
    Stale,
    /// No clickable control within the timeout.
    TimedOut,
    /// The browser stops answering.
    Crash,
}

/// Handle returned by [`ScriptedSession`]'s locate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedElement {
    pub sequence: usize,
    pub stale: bool,
}

/// Call counters shared between a session and the test that owns it.
#[derive(Debug, Default)]
pub struct SessionStats {
    locate_calls: AtomicUsize,
    scrolls: AtomicUsize,
    clicks: AtomicUsize,
    find_all_calls: AtomicUsize,
    closed: AtomicBool,
    last_timeout: Mutex<Option<Duration>>,
    visited: Mutex<Vec<String>>,
}

impl SessionStats {
    pub fn locate_calls(&self) -> usize {
        self.locate_calls.load(Ordering::SeqCst)
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    pub fn find_all_calls(&self) -> usize {
        self.find_all_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        *self.last_timeout.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

pub struct ScriptedSession {
    script: Mutex<VecDeque<Step>>,
    endless: bool,
    results: Vec<RawResultElement>,
    fail_navigation: bool,
    fail_close: bool,
    stats: Arc<SessionStats>,
}

impl ScriptedSession {
    /// Replays `steps`, then reports `TimedOut` forever.
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            endless: false,
            results: Vec::new(),
            fail_navigation: false,
            fail_close: false,
            stats: Arc::new(SessionStats::default()),
        }
    }

    /// `n` successful expansions, then the control disappears.
    pub fn with_expansions(n: usize) -> Self {
        Self::new(vec![Step::Found; n])
    }

    /// The expand control never goes away.
    pub fn endless() -> Self {
        Self {
            endless: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_results(mut self, results: Vec<RawResultElement>) -> Self {
        self.results = results;
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn stats(&self) -> Arc<SessionStats> {
        Arc::clone(&self.stats)
    }

    pub fn locate_calls(&self) -> usize {
        self.stats.locate_calls()
    }

    pub fn clicks(&self) -> usize {
        self.stats.clicks()
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        self.stats.last_timeout()
    }

    fn next_step(&self) -> Step {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        match script.pop_front() {
            Some(step) => step,
            None if self.endless => Step::Found,
            None => Step::TimedOut,
        }
    }
}

#[async_trait]
impl SessionTrait for ScriptedSession {
    type Element = ScriptedElement;

    async fn navigate_and_wait(&mut self, url: &str) -> Result<()> {
        self.stats
            .visited
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());
        if self.fail_navigation {
            return Err(LikersError::NavigationFailed(format!(
                "{url} did not finish loading"
            )));
        }
        Ok(())
    }

    async fn find_clickable_within_timeout(
        &self,
        _locator: &str,
        timeout: Duration,
    ) -> Result<Locate<Self::Element>> {
        let sequence = self.stats.locate_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .stats
            .last_timeout
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(timeout);

        match self.next_step() {
            Step::Found => Ok(Locate::Found(ScriptedElement {
                sequence,
                stale: false,
            })),
            Step::Stale => Ok(Locate::Found(ScriptedElement {
                sequence,
                stale: true,
            })),
            Step::TimedOut => Ok(Locate::TimedOut),
            Step::Crash => Err(LikersError::SessionError(
                "browser stopped responding".to_string(),
            )),
        }
    }

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<()> {
        if element.stale {
            return Err(LikersError::StaleElement(format!(
                "scripted element {}",
                element.sequence
            )));
        }
        self.stats.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn click(&self, element: &Self::Element) -> Result<()> {
        if element.stale {
            return Err(LikersError::StaleElement(format!(
                "scripted element {}",
                element.sequence
            )));
        }
        self.stats.clicks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_all(&self, _locator: &str) -> Result<Vec<RawResultElement>> {
        self.stats.find_all_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.stats.closed.store(true, Ordering::SeqCst);
        if self.fail_close {
            return Err(LikersError::SessionError("browser already gone".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_then_times_out() {
        let session = ScriptedSession::new(vec![Step::Found, Step::Stale]);

        let first = session
            .find_clickable_within_timeout("//a", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(
            first,
            Locate::Found(ScriptedElement {
                sequence: 0,
                stale: false
            })
        );

        let second = session
            .find_clickable_within_timeout("//a", Duration::from_secs(1))
            .await
            .unwrap();
        let Locate::Found(element) = second else {
            panic!("expected a stale handle");
        };
        assert!(session.scroll_into_view(&element).await.unwrap_err().is_stale());

        let third = session
            .find_clickable_within_timeout("//a", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(third, Locate::TimedOut);
        assert_eq!(session.locate_calls(), 3);
    }

    #[tokio::test]
    async fn close_is_recorded_even_when_it_fails() {
        let mut session = ScriptedSession::endless().failing_close();
        let stats = session.stats();

        assert!(session.close().await.is_err());
        assert!(stats.is_closed());
    }
}
