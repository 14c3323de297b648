//! Order confirmation with throttle-aware retries
//!
//! The storefront answers rapid order submissions with a modal alert
//! ("Please wait ..." / "... already placed another order ..."). A pending
//! alert blocks every other page interaction, so each attempt accepts it
//! before deciding whether to retry.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::alert::{is_throttle_signal, wait_for_and_accept_alert};
use crate::error::{E2eError, E2eResult};
use crate::session::{BrowserSession, Locator};

/// Retry policy for the confirm step
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (must be at least 1)
    pub max_attempts: u32,

    /// Fixed delay between throttled attempts
    pub backoff: Duration,

    /// How long to wait for the confirm control to become clickable
    pub click_timeout: Duration,

    /// How long to poll for an alert after each click
    pub alert_timeout: Duration,

    /// How long the final success-marker check waits
    pub fallback_timeout: Duration,

    pub poll_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(3),
            click_timeout: Duration::from_secs(15),
            alert_timeout: Duration::from_secs(2),
            fallback_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn validate(&self) -> E2eResult<()> {
        if self.max_attempts == 0 {
            return Err(E2eError::InvalidConfig(
                "confirm retry needs at least one attempt".to_string(),
            ));
        }
        Ok(())
    }
}

/// Click `confirm` until the order goes through.
///
/// Returns `Ok(true)` as soon as an attempt produces no alert, or only an
/// alert with empty text. Throttle alerts are retried after `backoff`; a
/// throttle alert on the last attempt is [`E2eError::Throttled`]. Any other
/// alert moves straight to the next attempt, and once attempts run out the
/// result is whether `success_marker` becomes visible within
/// `fallback_timeout`.
pub async fn click_confirm_with_retry(
    session: &dyn BrowserSession,
    confirm: &Locator,
    success_marker: &Locator,
    policy: &RetryPolicy,
) -> E2eResult<bool> {
    policy.validate()?;

    for attempt in 1..=policy.max_attempts {
        debug!("Confirm attempt {}/{}", attempt, policy.max_attempts);

        match session.click(confirm, policy.click_timeout).await {
            Ok(()) => {}
            // The click may already have reached the server
            Err(e) if e.is_unexpected_alert() => {
                debug!("Alert interrupted confirm click: {}", e);
            }
            Err(e) => return Err(e),
        }

        let alert =
            wait_for_and_accept_alert(session, policy.alert_timeout, policy.poll_interval).await?;

        // A blank alert is accepted and counts as no alert
        let Some(text) = alert.filter(|text| !text.is_empty()) else {
            return Ok(true);
        };

        if is_throttle_signal(&text) {
            if attempt < policy.max_attempts {
                warn!(
                    "Server throttle alert, retrying in {:?} (attempt {}/{})",
                    policy.backoff, attempt, policy.max_attempts
                );
                sleep(policy.backoff).await;
                continue;
            }
            return Err(E2eError::Throttled { attempts: attempt });
        }

        // Unrecognized alerts get no verdict of their own
        warn!("Unrecognized alert after confirm: {:?}", text);
    }

    info!("Confirm attempts used up, checking for the order-completed page");
    let marker = session
        .wait_visible_text(success_marker, policy.fallback_timeout)
        .await?;
    Ok(marker.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_secs(3));
        assert_eq!(policy.alert_timeout, Duration::from_secs(2));
        assert_eq!(policy.fallback_timeout, Duration::from_secs(5));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(policy.validate(), Err(E2eError::InvalidConfig(_))));
    }
}
