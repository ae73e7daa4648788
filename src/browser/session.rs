use crate::browser::navigation::{NavigationManager, NavigationResult};
use crate::browser::scripts::{self, ClickableProbe, HandleAction};
use crate::core::{BrowserTrait, Config, Locate, SessionTrait};
use crate::dom::RawResultElement;
use crate::errors::{LikersError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A located element, tagged in the page so later calls can find it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    token: String,
}

pub struct BrowserSession<B: BrowserTrait> {
    browser: B,
    tab: Option<B::TabHandle>,
    config: Config,
    session_id: String,
}

impl<B: BrowserTrait> BrowserSession<B> {
    pub async fn new(mut browser: B, config: Config) -> Result<Self> {
        browser.launch(&config).await?;
        let tab = match browser.new_tab().await {
            Ok(tab) => tab,
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    warn!("Failed to release browser after tab error: {}", close_err);
                }
                return Err(e);
            }
        };
        let session_id = uuid::Uuid::new_v4().to_string();
        debug!(%session_id, "Browser session opened");

        Ok(Self {
            browser,
            tab: Some(tab),
            config,
            session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn navigate_and_wait_reactive(&mut self, url: &str) -> Result<NavigationResult> {
        let tab = self.tab()?;
        self.browser.navigate(tab, url).await?;

        let nav_result = NavigationManager::wait_for_navigation_complete(
            &self.browser,
            tab,
            self.config.pagination.navigation_timeout_ms,
        )
        .await?;

        info!(
            url = %nav_result.url,
            load_ms = nav_result.duration_ms,
            "Navigation completed"
        );
        Ok(nav_result)
    }

    fn tab(&self) -> Result<&B::TabHandle> {
        self.tab.as_ref().ok_or(LikersError::NoActiveTab)
    }

    async fn evaluate_json<T: DeserializeOwned>(&self, script: &str) -> Result<T> {
        let tab = self.tab()?;
        let value = self.browser.execute_script(tab, script).await?;
        let raw = value.as_str().ok_or_else(|| {
            LikersError::JavaScriptFailed(format!("expected a JSON string, got {}", value))
        })?;
        Ok(serde_json::from_str(raw)?)
    }

    async fn run_on_handle(&self, element: &ElementHandle, script: String, what: &str) -> Result<()> {
        let action: HandleAction = self.evaluate_json(&script).await?;
        if action.ok {
            return Ok(());
        }
        if action.stale {
            return Err(LikersError::StaleElement(format!(
                "{} target {} left the page",
                what, element.token
            )));
        }
        Err(LikersError::JavaScriptFailed(format!(
            "{} failed: {}",
            what,
            action.error.unwrap_or_else(|| "unknown error".to_string())
        )))
    }
}

#[async_trait]
impl<B: BrowserTrait> SessionTrait for BrowserSession<B> {
    type Element = ElementHandle;

    async fn navigate_and_wait(&mut self, url: &str) -> Result<()> {
        self.navigate_and_wait_reactive(url).await?;
        Ok(())
    }

    /// Polls every `poll_interval_ms` until a clickable match appears.
    ///
    /// Probe failures are retried inside the window; if not a single probe
    /// succeeded by the deadline the browser is considered unreachable.
    async fn find_clickable_within_timeout(
        &self,
        locator: &str,
        timeout: Duration,
    ) -> Result<Locate<Self::Element>> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let script = scripts::locate_clickable(locator, &token)?;
        let poll_interval = self.config.pagination.poll_interval();
        let start_time = Instant::now();
        let mut answered = false;
        let mut last_error = None;

        loop {
            match self.evaluate_json::<ClickableProbe>(&script).await {
                Ok(probe) => {
                    answered = true;
                    if let Some(error) = probe.error {
                        return Err(LikersError::ConfigurationError(format!(
                            "locator {:?} is not valid XPath: {}",
                            locator, error
                        )));
                    }
                    if probe.found {
                        return Ok(Locate::Found(ElementHandle { token }));
                    }
                }
                Err(e) => {
                    debug!("Clickable probe failed: {}", e);
                    last_error = Some(e);
                }
            }

            let elapsed = start_time.elapsed();
            if elapsed >= timeout {
                break;
            }
            tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;
        }

        match last_error {
            Some(e) if !answered => Err(LikersError::SessionError(e.to_string())),
            _ => Ok(Locate::TimedOut),
        }
    }

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<()> {
        let script = scripts::scroll_into_view(&element.token)?;
        self.run_on_handle(element, script, "scroll").await
    }

    async fn click(&self, element: &Self::Element) -> Result<()> {
        let script = scripts::click(&element.token)?;
        self.run_on_handle(element, script, "click").await
    }

    async fn find_all(&self, locator: &str) -> Result<Vec<RawResultElement>> {
        let script = scripts::collect_links(locator)?;
        let elements: Vec<RawResultElement> = self.evaluate_json(&script).await?;
        debug!(count = elements.len(), "Collected result links");
        Ok(elements)
    }

    async fn close(&mut self) -> Result<()> {
        self.tab = None;
        if self.browser.is_running() {
            self.browser.close().await?;
            debug!(session_id = %self.session_id, "Browser session closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Browser that answers scripts from a queue.
    struct CannedBrowser {
        replies: Mutex<VecDeque<Result<Value>>>,
        scripts: Mutex<Vec<String>>,
        running: bool,
        tab_error: Option<String>,
        closes: Arc<AtomicUsize>,
    }

    impl CannedBrowser {
        fn new(replies: Vec<Result<Value>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                scripts: Mutex::new(Vec::new()),
                running: false,
                tab_error: None,
                closes: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing_tab(mut self, reason: &str) -> Self {
            self.tab_error = Some(reason.to_string());
            self
        }
    }

    fn json(raw: &str) -> Result<Value> {
        Ok(Value::String(raw.to_string()))
    }

    #[async_trait]
    impl BrowserTrait for CannedBrowser {
        type TabHandle = ();

        async fn launch(&mut self, _config: &Config) -> Result<()> {
            self.running = true;
            Ok(())
        }

        async fn new_tab(&self) -> Result<()> {
            match &self.tab_error {
                Some(reason) => Err(LikersError::TabCreationFailed(reason.clone())),
                None => Ok(()),
            }
        }

        async fn navigate(&self, _tab: &(), _url: &str) -> Result<()> {
            Ok(())
        }

        async fn execute_script(&self, _tab: &(), script: &str) -> Result<Value> {
            self.scripts.lock().unwrap().push(script.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| json(r#"{"found":false}"#))
        }

        fn is_running(&self) -> bool {
            self.running
        }

        async fn close(&mut self) -> Result<()> {
            self.running = false;
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.pagination.poll_interval_ms = 5;
        config
    }

    #[tokio::test]
    async fn tab_failure_releases_the_browser() {
        let browser = CannedBrowser::new(vec![]).failing_tab("target crashed");
        let closes = Arc::clone(&browser.closes);

        let err = match BrowserSession::new(browser, fast_config()).await {
            Ok(_) => panic!("expected the tab to fail"),
            Err(e) => e,
        };
        assert!(matches!(err, LikersError::TabCreationFailed(_)));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn navigation_reports_the_landed_url() {
        let browser = CannedBrowser::new(vec![
            json(r#"{"readyState":"loading","url":"about:blank"}"#),
            json(r#"{"readyState":"complete","url":"https://www.facebook.com/login/"}"#),
        ]);
        let mut session = BrowserSession::new(browser, fast_config()).await.unwrap();

        let result = session
            .navigate_and_wait_reactive("https://www.facebook.com/SomePage/settings/")
            .await
            .unwrap();
        assert_eq!(result.url, "https://www.facebook.com/login/");
    }

    #[tokio::test]
    async fn navigation_times_out_on_a_page_that_never_loads() {
        let replies = (0..50)
            .map(|_| json(r#"{"readyState":"interactive","url":"about:blank"}"#))
            .collect();
        let mut config = fast_config();
        config.pagination.navigation_timeout_ms = 150;
        let mut session = BrowserSession::new(CannedBrowser::new(replies), config)
            .await
            .unwrap();

        let err = session
            .navigate_and_wait_reactive("https://www.facebook.com/SomePage/settings/")
            .await
            .unwrap_err();
        assert!(matches!(err, LikersError::TimeoutError(_)));
    }

    #[tokio::test]
    async fn found_on_a_later_poll() {
        let browser = CannedBrowser::new(vec![
            json(r#"{"found":false}"#),
            json(r#"{"found":true}"#),
        ]);
        let session = BrowserSession::new(browser, fast_config()).await.unwrap();

        let located = session
            .find_clickable_within_timeout("//a", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(located.is_found());
    }

    #[tokio::test]
    async fn times_out_when_nothing_is_clickable() {
        let browser = CannedBrowser::new(vec![]);
        let session = BrowserSession::new(browser, fast_config()).await.unwrap();

        let located = session
            .find_clickable_within_timeout("//a", Duration::from_millis(30))
            .await
            .unwrap();
        assert_eq!(located, Locate::TimedOut);
    }

    #[tokio::test]
    async fn unreachable_browser_is_a_session_error() {
        let replies = (0..100)
            .map(|_| Err(LikersError::JavaScriptFailed("target closed".to_string())))
            .collect();
        let session = BrowserSession::new(CannedBrowser::new(replies), fast_config())
            .await
            .unwrap();

        let err = session
            .find_clickable_within_timeout("//a", Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, LikersError::SessionError(_)));
    }

    #[tokio::test]
    async fn invalid_xpath_is_reported() {
        let browser = CannedBrowser::new(vec![json(
            r#"{"found":false,"error":"The string '//a[' is not a valid XPath expression."}"#,
        )]);
        let session = BrowserSession::new(browser, fast_config()).await.unwrap();

        let err = session
            .find_clickable_within_timeout("//a[", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn detached_element_is_stale() {
        let browser = CannedBrowser::new(vec![
            json(r#"{"found":true}"#),
            json(r#"{"ok":false,"stale":true}"#),
        ]);
        let session = BrowserSession::new(browser, fast_config()).await.unwrap();

        let Locate::Found(handle) = session
            .find_clickable_within_timeout("//a", Duration::from_secs(1))
            .await
            .unwrap()
        else {
            panic!("expected a handle");
        };
        assert!(session.click(&handle).await.unwrap_err().is_stale());
    }

    #[tokio::test]
    async fn find_all_decodes_snapshots() {
        let browser = CannedBrowser::new(vec![json(
            r#"[{"text_content":"Ann","attributes":{"href":"https://x.com/ann?fref=pb"}},{"text_content":"No link","attributes":{}}]"#,
        )]);
        let session = BrowserSession::new(browser, fast_config()).await.unwrap();

        let links = session.find_all("//li/a").await.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(
            links[0],
            RawResultElement::link("Ann", "https://x.com/ann?fref=pb")
        );
        assert!(links[1].attributes.is_empty());
    }

    #[tokio::test]
    async fn close_releases_the_browser() {
        let mut session = BrowserSession::new(CannedBrowser::new(vec![]), fast_config())
            .await
            .unwrap();
        session.close().await.unwrap();

        assert!(!session.browser.is_running());
        assert!(matches!(
            session.find_all("//a").await.unwrap_err(),
            LikersError::NoActiveTab
        ));
    }
}
