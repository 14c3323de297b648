//! Executes scenario steps against a browser session

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::confirm::{click_confirm_with_retry, RetryPolicy};
use crate::error::{E2eError, E2eResult};
use crate::scenario::{FieldValue, Step};
use crate::session::{BrowserSession, Locator};

/// Result of executing a single step
#[derive(Debug, Clone)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Runs steps in order on one session
pub struct StepExecutor<'a> {
    session: &'a dyn BrowserSession,

    /// Wait ceiling for clicks, fills and text assertions
    default_timeout: Duration,

    poll_interval: Duration,
}

impl<'a> StepExecutor<'a> {
    pub fn new(session: &'a dyn BrowserSession, default_timeout: Duration) -> Self {
        Self {
            session,
            default_timeout,
            poll_interval: Duration::from_millis(250),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Execute steps until the first failure
    pub async fn run(&self, steps: &[Step]) -> Vec<StepResult> {
        let mut results = Vec::with_capacity(steps.len());

        for step in steps {
            let result = self.execute_step(step).await;
            let failed = !result.success;
            results.push(result);
            if failed {
                break;
            }
        }

        results
    }

    /// Execute a single step
    pub async fn execute_step(&self, step: &Step) -> StepResult {
        let start = Instant::now();
        let step_name = step.name();

        debug!("Executing step: {}", step_name);

        let outcome = self.dispatch(step).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => StepResult {
                success: true,
                step_name,
                duration_ms,
                error: None,
            },
            Err(e) => StepResult {
                success: false,
                step_name,
                duration_ms,
                error: Some(e.to_string()),
            },
        }
    }

    async fn dispatch(&self, step: &Step) -> E2eResult<()> {
        match step {
            Step::Navigate { url } => self.session.goto(url).await,
            Step::Click {
                locator,
                timeout_ms,
            } => {
                self.session
                    .click(locator, self.timeout_or_default(*timeout_ms))
                    .await
            }
            Step::Fill {
                locator,
                value,
                clear_first,
            } => {
                self.session
                    .fill(locator, value, *clear_first, self.default_timeout)
                    .await
            }
            Step::FillIfPresent { fields } => self.execute_fill_if_present(fields).await,
            Step::Sleep { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(())
            }
            Step::AssertText {
                locator,
                contains,
                timeout_ms,
            } => {
                self.execute_assert_text(locator, contains, self.timeout_or_default(*timeout_ms))
                    .await
            }
            Step::AssertTitle { contains } => {
                let title = self.session.title().await?;
                if title.contains(contains.as_str()) {
                    Ok(())
                } else {
                    Err(E2eError::AssertionFailed(format!(
                        "title {:?} does not contain {:?}",
                        title, contains
                    )))
                }
            }
            Step::ConfirmOrder {
                confirm,
                success_marker,
                retries,
                backoff_secs,
            } => {
                let policy = RetryPolicy {
                    max_attempts: *retries,
                    backoff: Duration::from_secs(*backoff_secs),
                    click_timeout: self.default_timeout,
                    poll_interval: self.poll_interval,
                    ..Default::default()
                };
                let progressed =
                    click_confirm_with_retry(self.session, confirm, success_marker, &policy)
                        .await?;
                if progressed {
                    Ok(())
                } else {
                    Err(E2eError::OrderNotCompleted)
                }
            }
            Step::Log { message } => {
                info!("[SCENARIO] {}", message);
                Ok(())
            }
        }
    }

    /// Optional group: any lookup or fill failure skips the rest of it
    async fn execute_fill_if_present(&self, fields: &[FieldValue]) -> E2eResult<()> {
        if let Err(e) = self.fill_group(fields).await {
            info!("Optional fields skipped: {}", e);
        }
        Ok(())
    }

    /// All fields are located before any is touched
    async fn fill_group(&self, fields: &[FieldValue]) -> E2eResult<()> {
        for field in fields {
            if !self.session.is_present(&field.locator).await? {
                return Err(E2eError::ElementNotFound(field.locator.to_string()));
            }
        }

        for field in fields {
            self.session
                .fill(&field.locator, &field.value, true, self.default_timeout)
                .await?;
        }
        Ok(())
    }

    async fn execute_assert_text(
        &self,
        locator: &Locator,
        contains: &str,
        timeout: Duration,
    ) -> E2eResult<()> {
        let text = self
            .session
            .wait_visible_text(locator, timeout)
            .await?
            .ok_or_else(|| E2eError::Timeout(format!("{} to become visible", locator)))?;

        if text.contains(contains) {
            Ok(())
        } else {
            Err(E2eError::AssertionFailed(format!(
                "{} text {:?} does not contain {:?}",
                locator, text, contains
            )))
        }
    }

    fn timeout_or_default(&self, timeout_ms: Option<u64>) -> Duration {
        timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout)
    }
}
