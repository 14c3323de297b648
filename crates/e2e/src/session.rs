//! Browser sessions over WebDriver
//!
//! Scenarios talk to the browser through [`BrowserSession`]. The real
//! implementation drives a W3C WebDriver server with `thirtyfour`; tests
//! substitute a scripted in-memory session.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thirtyfour::prelude::*;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};

/// How to find an element on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    Id(String),
    Css(String),
    ClassName(String),
    LinkText(String),
    Name(String),
    Xpath(String),
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Locator::Id(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Locator::Css(value.into())
    }

    fn to_by(&self) -> By {
        match self {
            Locator::Id(v) => By::Id(v.clone()),
            Locator::Css(v) => By::Css(v.clone()),
            Locator::ClassName(v) => By::ClassName(v.clone()),
            Locator::LinkText(v) => By::LinkText(v.clone()),
            Locator::Name(v) => By::Name(v.clone()),
            Locator::Xpath(v) => By::XPath(v.clone()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(v) => write!(f, "id={}", v),
            Locator::Css(v) => write!(f, "css={}", v),
            Locator::ClassName(v) => write!(f, "class={}", v),
            Locator::LinkText(v) => write!(f, "link={}", v),
            Locator::Name(v) => write!(f, "name={}", v),
            Locator::Xpath(v) => write!(f, "xpath={}", v),
        }
    }
}

/// A single exclusively-owned browser session
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Wait up to `timeout` for the element to be clickable, then click it.
    ///
    /// Returns [`E2eError::UnexpectedAlert`] when an open alert blocks the click.
    async fn click(&self, locator: &Locator, timeout: Duration) -> E2eResult<()>;

    /// Wait up to `timeout` for the element, optionally clear it, then type `value`
    async fn fill(
        &self,
        locator: &Locator,
        value: &str,
        clear_first: bool,
        timeout: Duration,
    ) -> E2eResult<()>;

    /// Whether the element exists right now (no waiting)
    async fn is_present(&self, locator: &Locator) -> E2eResult<bool>;

    /// Wait up to `timeout` for the element to be visible and return its text
    async fn wait_visible_text(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> E2eResult<Option<String>>;

    /// Text of the open alert, if any; does not wait
    async fn alert_text(&self) -> E2eResult<Option<String>>;

    /// Accept the open alert
    async fn accept_alert(&self) -> E2eResult<()>;

    /// Current page title
    async fn title(&self) -> E2eResult<String>;

    /// End the session
    async fn close(self: Box<Self>) -> E2eResult<()>;
}

/// Creates browser sessions, one per scenario
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self) -> E2eResult<Box<dyn BrowserSession>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
        }
    }
}

impl std::str::FromStr for BrowserKind {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            other => Err(E2eError::InvalidConfig(format!(
                "unsupported browser: {}",
                other
            ))),
        }
    }
}

/// Configuration for WebDriver sessions
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebDriver server (chromedriver, geckodriver or Selenium)
    pub webdriver_url: String,

    pub browser: BrowserKind,

    pub headless: bool,

    /// Maximize the window after launch
    pub maximize: bool,

    /// Interval between element/alert polls
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            browser: BrowserKind::Chrome,
            headless: false,
            maximize: true,
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Launches sessions against a WebDriver server
pub struct WebDriverLauncher {
    config: SessionConfig,
}

impl WebDriverLauncher {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Launcher for WebDriverLauncher {
    async fn launch(&self) -> E2eResult<Box<dyn BrowserSession>> {
        info!(
            "Launching {} session via {}",
            self.config.browser.as_str(),
            self.config.webdriver_url
        );

        let driver = match self.config.browser {
            BrowserKind::Chrome => {
                let mut caps = DesiredCapabilities::chrome();
                if self.config.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(&self.config.webdriver_url, caps).await?
            }
            BrowserKind::Firefox => {
                let mut caps = DesiredCapabilities::firefox();
                if self.config.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(&self.config.webdriver_url, caps).await?
            }
        };

        if self.config.maximize {
            if let Err(e) = driver.maximize_window().await {
                // Headless windows cannot always be maximized
                debug!("maximize_window failed: {}", e);
            }
        }

        Ok(Box::new(WebDriverSession {
            driver,
            poll_interval: self.config.poll_interval,
        }))
    }
}

/// [`BrowserSession`] backed by a `thirtyfour` WebDriver
pub struct WebDriverSession {
    driver: WebDriver,
    poll_interval: Duration,
}

impl WebDriverSession {
    pub fn new(driver: WebDriver, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    async fn locate(&self, locator: &Locator, timeout: Duration) -> E2eResult<WebElement> {
        self.driver
            .query(locator.to_by())
            .wait(timeout, self.poll_interval)
            .first()
            .await
            .map_err(|e| classify(e, locator))
    }
}

/// Map driver errors onto the variants callers branch on
fn classify(err: WebDriverError, locator: &Locator) -> E2eError {
    match err {
        e @ WebDriverError::UnexpectedAlertOpen(_) => E2eError::UnexpectedAlert(e.to_string()),
        WebDriverError::NoSuchElement(_) => E2eError::ElementNotFound(locator.to_string()),
        other => E2eError::WebDriver(other),
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator, timeout: Duration) -> E2eResult<()> {
        let elem = self
            .driver
            .query(locator.to_by())
            .wait(timeout, self.poll_interval)
            .and_clickable()
            .first()
            .await
            .map_err(|e| classify(e, locator))?;
        elem.click().await.map_err(|e| classify(e, locator))
    }

    async fn fill(
        &self,
        locator: &Locator,
        value: &str,
        clear_first: bool,
        timeout: Duration,
    ) -> E2eResult<()> {
        let elem = self.locate(locator, timeout).await?;
        if clear_first {
            elem.clear().await.map_err(|e| classify(e, locator))?;
        }
        elem.send_keys(value)
            .await
            .map_err(|e| classify(e, locator))
    }

    async fn is_present(&self, locator: &Locator) -> E2eResult<bool> {
        let found = self
            .driver
            .find_all(locator.to_by())
            .await
            .map_err(|e| classify(e, locator))?;
        Ok(!found.is_empty())
    }

    async fn wait_visible_text(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> E2eResult<Option<String>> {
        let result = self
            .driver
            .query(locator.to_by())
            .wait(timeout, self.poll_interval)
            .and_displayed()
            .first()
            .await;

        match result {
            Ok(elem) => Ok(Some(elem.text().await?)),
            Err(WebDriverError::NoSuchElement(_)) => Ok(None),
            Err(e) => Err(classify(e, locator)),
        }
    }

    async fn alert_text(&self) -> E2eResult<Option<String>> {
        match self.driver.get_alert_text().await {
            Ok(text) => Ok(Some(text)),
            Err(WebDriverError::NoSuchAlert(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn accept_alert(&self) -> E2eResult<()> {
        self.driver.accept_alert().await?;
        Ok(())
    }

    async fn title(&self) -> E2eResult<String> {
        Ok(self.driver.title().await?)
    }

    async fn close(self: Box<Self>) -> E2eResult<()> {
        debug!("Quitting WebDriver session");
        self.driver.quit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_display() {
        assert_eq!(Locator::css("p.content").to_string(), "css=p.content");
        assert_eq!(Locator::id("Email").to_string(), "id=Email");
        assert_eq!(
            Locator::LinkText("Jewelry".to_string()).to_string(),
            "link=Jewelry"
        );
        assert_eq!(
            Locator::ClassName("ico-login".to_string()).to_string(),
            "class=ico-login"
        );
    }

    #[test]
    fn test_browser_kind_parse() {
        assert_eq!("Chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        assert_eq!("firefox".parse::<BrowserKind>().unwrap(), BrowserKind::Firefox);
        assert!("safari".parse::<BrowserKind>().is_err());
    }

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.browser, BrowserKind::Chrome);
        assert!(config.maximize);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }
}
