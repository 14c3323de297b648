//! Declarative YAML scenarios

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};
use crate::session::Locator;

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<Step>,
}

/// A single step in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to an absolute URL
    Navigate { url: String },

    /// Click an element once it is clickable
    Click {
        locator: Locator,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Type into an input field
    Fill {
        locator: Locator,
        value: String,
        #[serde(default)]
        clear_first: bool,
    },

    /// Fill a group of optional fields; a missing or unfillable field skips the group
    FillIfPresent { fields: Vec<FieldValue> },

    /// Wait for a fixed amount of time
    Sleep { ms: u64 },

    /// Wait for an element to be visible and check its text
    AssertText {
        locator: Locator,
        contains: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Check the page title
    AssertTitle { contains: String },

    /// Click the order confirm control, retrying through throttle alerts
    ConfirmOrder {
        confirm: Locator,
        success_marker: Locator,
        #[serde(default = "default_retries")]
        retries: u32,
        #[serde(default = "default_backoff_secs")]
        backoff_secs: u64,
    },

    /// Log a message
    Log { message: String },
}

fn default_retries() -> u32 {
    3
}

fn default_backoff_secs() -> u64 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldValue {
    pub locator: Locator,
    pub value: String,
}

impl Step {
    /// Short label used in logs and step results
    pub fn name(&self) -> String {
        match self {
            Step::Navigate { url } => format!("navigate:{}", url),
            Step::Click { locator, .. } => format!("click:{}", locator),
            Step::Fill { locator, .. } => format!("fill:{}", locator),
            Step::FillIfPresent { fields } => format!("fill_if_present:{} field(s)", fields.len()),
            Step::Sleep { ms } => format!("sleep:{}ms", ms),
            Step::AssertText { locator, .. } => format!("assert_text:{}", locator),
            Step::AssertTitle { contains } => format!("assert_title:{}", contains),
            Step::ConfirmOrder { confirm, .. } => format!("confirm_order:{}", confirm),
            Step::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }
}

impl Scenario {
    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let scenario: Self = serde_yaml::from_str(yaml)?;
        if scenario.steps.is_empty() {
            return Err(E2eError::SpecParse(format!(
                "scenario '{}' has no steps",
                scenario.name
            )));
        }
        Ok(scenario)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios from a directory
    ///
    /// A missing or unreadable directory is an error, not an empty list.
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut scenarios = Vec::new();

        for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            let is_yaml = entry
                .path()
                .extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);
            if entry.file_type().is_file() && is_yaml {
                scenarios.push(Self::from_file(entry.path())?);
            }
        }

        Ok(scenarios)
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(scenarios: &'a [Self], tag: &str) -> Vec<&'a Self> {
        scenarios
            .iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }
}
