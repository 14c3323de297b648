//! Error types for storefront scenarios

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Throttled: order confirmation alert shown {attempts} times")]
    Throttled { attempts: u32 },

    #[error("Could not complete order (server throttled multiple times)")]
    OrderNotCompleted,

    #[error("Unexpected alert open: {0}")]
    UnexpectedAlert(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Scenario parse error: {0}")]
    SpecParse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl E2eError {
    /// True when a pending alert blocked the action
    pub fn is_unexpected_alert(&self) -> bool {
        matches!(self, E2eError::UnexpectedAlert(_))
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
