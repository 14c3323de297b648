//! Alert detection and throttle classification

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::info;

use crate::error::E2eResult;
use crate::session::BrowserSession;

/// Alert phrases the storefront uses when it rejects an order submission
pub const THROTTLE_PHRASES: [&str; 2] = ["Please wait", "already placed another order"];

/// Whether alert text signals server-side throttling
pub fn is_throttle_signal(text: &str) -> bool {
    THROTTLE_PHRASES.iter().any(|phrase| text.contains(phrase))
}

/// Poll for an alert for up to `timeout`; accept it and return its text.
///
/// Returns `None` when no alert shows up in time.
pub async fn wait_for_and_accept_alert(
    session: &dyn BrowserSession,
    timeout: Duration,
    poll_interval: Duration,
) -> E2eResult<Option<String>> {
    let start = Instant::now();

    loop {
        if let Some(text) = session.alert_text().await? {
            info!("Alert detected: {:?}", text);
            session.accept_alert().await?;
            return Ok(Some(text));
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(None);
        }
        sleep(poll_interval.min(timeout - elapsed)).await;
    }
}
