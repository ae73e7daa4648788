use crate::dom::RawResultElement;
use crate::errors::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Outcome of waiting for a clickable element.
///
/// `TimedOut` is an ordinary answer, not an error: for the expand control it
/// is the only signal that the list has been fully loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locate<E> {
    Found(E),
    TimedOut,
}

impl<E> Locate<E> {
    pub fn is_found(&self) -> bool {
        matches!(self, Locate::Found(_))
    }
}

/// The browser operations the pagination driver and extractor consume.
///
/// Element handles are only valid until the page mutates; `scroll_into_view`
/// and `click` report [`crate::errors::LikersError::StaleElement`] when the
/// node has gone away in the meantime.
#[async_trait]
pub trait SessionTrait: Send + Sync {
    type Element: Send + Sync;

    async fn navigate_and_wait(&mut self, url: &str) -> Result<()>;

    async fn find_clickable_within_timeout(
        &self,
        locator: &str,
        timeout: Duration,
    ) -> Result<Locate<Self::Element>>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<()>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    async fn find_all(&self, locator: &str) -> Result<Vec<RawResultElement>>;

    async fn close(&mut self) -> Result<()>;
}
