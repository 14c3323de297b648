//! Scripted in-memory browser session for driving scenarios without WebDriver

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{sleep, Instant};

use storefront_e2e::{BrowserSession, E2eError, E2eResult, Launcher, Locator};

/// What happens when a scripted element is clicked
#[derive(Debug, Clone)]
pub enum ClickOutcome {
    /// Click lands, no alert follows
    Quiet,
    /// Click lands, then an alert opens
    Alert(String),
    /// Click lands but the driver reports the alert as interrupting it
    InterruptedByAlert(String),
}

#[derive(Default)]
struct State {
    /// Visible elements and their text, keyed by the time they appear
    elements: HashMap<Locator, (Instant, String)>,
    click_outcomes: HashMap<Locator, VecDeque<ClickOutcome>>,
    /// Present but not interactable
    unfillable: HashSet<Locator>,
    pending_alert: Option<String>,
    title: String,
    visited: Vec<String>,
    clicks: Vec<(Locator, Instant)>,
    fills: Vec<(Locator, String)>,
    accepted_alerts: Vec<String>,
    closed: bool,
}

/// Cloneable handle; all clones share one page state
#[derive(Clone, Default)]
pub struct ScriptedBrowser {
    state: Arc<Mutex<State>>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, locator: Locator, text: &str) -> Self {
        self.with_element_after(locator, text, Duration::ZERO)
    }

    /// Element becomes visible `delay` from now
    pub fn with_element_after(self, locator: Locator, text: &str, delay: Duration) -> Self {
        self.state
            .lock()
            .elements
            .insert(locator, (Instant::now() + delay, text.to_string()));
        self
    }

    pub fn with_click_outcomes(self, locator: Locator, outcomes: Vec<ClickOutcome>) -> Self {
        self.state
            .lock()
            .click_outcomes
            .insert(locator, outcomes.into());
        self
    }

    /// Element is present but typing into it fails
    pub fn with_unfillable(self, locator: Locator) -> Self {
        self.state.lock().unfillable.insert(locator);
        self
    }

    pub fn with_title(self, title: &str) -> Self {
        self.state.lock().title = title.to_string();
        self
    }

    pub fn clicks_on(&self, locator: &Locator) -> Vec<Instant> {
        self.state
            .lock()
            .clicks
            .iter()
            .filter(|(l, _)| l == locator)
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn fills(&self) -> Vec<(Locator, String)> {
        self.state.lock().fills.clone()
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().visited.clone()
    }

    pub fn accepted_alerts(&self) -> Vec<String> {
        self.state.lock().accepted_alerts.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn visible_at(&self, locator: &Locator) -> Option<(Instant, String)> {
        self.state.lock().elements.get(locator).cloned()
    }

    fn blocked(&self) -> E2eResult<()> {
        match &self.state.lock().pending_alert {
            Some(text) => Err(E2eError::UnexpectedAlert(text.clone())),
            None => Ok(()),
        }
    }

    /// Wait for the element the way a driver query would
    async fn await_element(&self, locator: &Locator, timeout: Duration) -> Option<String> {
        let now = Instant::now();
        match self.visible_at(locator) {
            Some((at, text)) if at <= now => Some(text),
            Some((at, text)) if at <= now + timeout => {
                sleep(at - now).await;
                Some(text)
            }
            _ => {
                sleep(timeout).await;
                None
            }
        }
    }
}

#[async_trait]
impl BrowserSession for ScriptedBrowser {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.blocked()?;
        self.state.lock().visited.push(url.to_string());
        Ok(())
    }

    async fn click(&self, locator: &Locator, timeout: Duration) -> E2eResult<()> {
        self.blocked()?;
        if self.await_element(locator, timeout).await.is_none() {
            return Err(E2eError::ElementNotFound(locator.to_string()));
        }

        let mut state = self.state.lock();
        state.clicks.push((locator.clone(), Instant::now()));
        let outcome = state
            .click_outcomes
            .get_mut(locator)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(ClickOutcome::Quiet);

        match outcome {
            ClickOutcome::Quiet => Ok(()),
            ClickOutcome::Alert(text) => {
                state.pending_alert = Some(text);
                Ok(())
            }
            ClickOutcome::InterruptedByAlert(text) => {
                state.pending_alert = Some(text.clone());
                Err(E2eError::UnexpectedAlert(text))
            }
        }
    }

    async fn fill(
        &self,
        locator: &Locator,
        value: &str,
        _clear_first: bool,
        timeout: Duration,
    ) -> E2eResult<()> {
        self.blocked()?;
        if self.await_element(locator, timeout).await.is_none() {
            return Err(E2eError::ElementNotFound(locator.to_string()));
        }
        if self.state.lock().unfillable.contains(locator) {
            return Err(E2eError::Timeout(format!("{} to become interactable", locator)));
        }
        self.state
            .lock()
            .fills
            .push((locator.clone(), value.to_string()));
        Ok(())
    }

    async fn is_present(&self, locator: &Locator) -> E2eResult<bool> {
        self.blocked()?;
        Ok(matches!(self.visible_at(locator), Some((at, _)) if at <= Instant::now()))
    }

    async fn wait_visible_text(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> E2eResult<Option<String>> {
        self.blocked()?;
        Ok(self.await_element(locator, timeout).await)
    }

    async fn alert_text(&self) -> E2eResult<Option<String>> {
        Ok(self.state.lock().pending_alert.clone())
    }

    async fn accept_alert(&self) -> E2eResult<()> {
        let mut state = self.state.lock();
        match state.pending_alert.take() {
            Some(text) => {
                state.accepted_alerts.push(text);
                Ok(())
            }
            None => Err(E2eError::AssertionFailed("no alert to accept".to_string())),
        }
    }

    async fn title(&self) -> E2eResult<String> {
        self.blocked()?;
        Ok(self.state.lock().title.clone())
    }

    async fn close(self: Box<Self>) -> E2eResult<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}

/// Hands out clones of one scripted browser
pub struct ScriptedLauncher {
    pub browser: ScriptedBrowser,
    pub fail: bool,
}

impl ScriptedLauncher {
    pub fn new(browser: ScriptedBrowser) -> Self {
        Self {
            browser,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            browser: ScriptedBrowser::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl Launcher for ScriptedLauncher {
    async fn launch(&self) -> E2eResult<Box<dyn BrowserSession>> {
        if self.fail {
            return Err(E2eError::InvalidConfig(
                "webdriver unreachable".to_string(),
            ));
        }
        Ok(Box::new(self.browser.clone()))
    }
}
