//! Storefront E2E scenarios
//!
//! This crate drives third-party storefronts through a W3C WebDriver session:
//! - Parses declarative YAML scenarios (two are built in)
//! - Runs each scenario in its own browser session, closed on every exit path
//! - Confirms orders through a throttle-aware retry loop that accepts
//!   "Please wait" alerts and backs off a fixed delay between attempts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TestRunner<L: Launcher>                 │
//! │    ├── launch() -> Box<dyn BrowserSession>                  │
//! │    ├── StepExecutor::run(steps) -> Vec<StepResult>          │
//! │    └── session.close()                                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (YAML)                                            │
//! │    ├── name, description, tags                              │
//! │    └── steps: [Step]                                        │
//! │          ├── navigate { url }                               │
//! │          ├── click / fill { locator, .. }                   │
//! │          ├── fill_if_present { fields }                     │
//! │          ├── assert_text / assert_title                     │
//! │          └── confirm_order { confirm, success_marker, .. }  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  confirm::click_confirm_with_retry                          │
//! │    click → poll alert (2s) → accept → throttle? → sleep D   │
//! │    attempts used up → wait for success marker (5s)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod alert;
pub mod confirm;
pub mod error;
pub mod executor;
pub mod runner;
pub mod scenario;
pub mod scenarios;
pub mod session;

pub use confirm::{click_confirm_with_retry, RetryPolicy};
pub use error::{E2eError, E2eResult};
pub use runner::{RunnerConfig, TestRunner};
pub use scenario::{Scenario, Step};
pub use session::{BrowserSession, Launcher, Locator, SessionConfig, WebDriverLauncher};
