//! Scenario runner: one scoped browser session per scenario

use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::executor::{StepExecutor, StepResult};
use crate::scenario::Scenario;
use crate::scenarios;
use crate::session::Launcher;

/// Result of running a single scenario
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Default)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Configuration for the scenario runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Directory of YAML scenarios; built-ins when unset
    pub scenarios_dir: Option<PathBuf>,

    /// Wait ceiling for element lookups
    pub default_timeout: Duration,

    pub poll_interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scenarios_dir: None,
            default_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Runs scenarios, each in a fresh browser session
pub struct TestRunner<L: Launcher> {
    launcher: L,
    config: RunnerConfig,
}

impl<L: Launcher> TestRunner<L> {
    pub fn new(launcher: L) -> Self {
        Self::with_config(launcher, RunnerConfig::default())
    }

    pub fn with_config(launcher: L, config: RunnerConfig) -> Self {
        Self { launcher, config }
    }

    /// An empty scenario set is an error, never an empty passing suite
    fn load_scenarios(&self) -> E2eResult<Vec<Scenario>> {
        let Some(dir) = &self.config.scenarios_dir else {
            return scenarios::builtin();
        };

        let loaded = Scenario::load_all(dir)?;
        if loaded.is_empty() {
            return Err(E2eError::SpecParse(format!(
                "No scenarios found in {}",
                dir.display()
            )));
        }
        Ok(loaded)
    }

    /// Run every scenario
    pub async fn run_all(&self) -> E2eResult<TestSuiteResult> {
        let scenarios = self.load_scenarios()?;
        Ok(self.run_scenarios(&scenarios).await)
    }

    /// Run scenarios carrying a tag
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<TestSuiteResult> {
        let scenarios = self.load_scenarios()?;
        let filtered: Vec<Scenario> = Scenario::filter_by_tag(&scenarios, tag)
            .into_iter()
            .cloned()
            .collect();
        if filtered.is_empty() {
            return Err(E2eError::SpecParse(format!("No scenarios tagged '{}'", tag)));
        }
        Ok(self.run_scenarios(&filtered).await)
    }

    /// Run one scenario by name
    pub async fn run_named(&self, name: &str) -> E2eResult<TestResult> {
        let scenario = self
            .load_scenarios()?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::SpecParse(format!("Scenario not found: {}", name)))?;

        Ok(self.run_scenario(&scenario).await)
    }

    /// Run a list of scenarios sequentially
    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> TestSuiteResult {
        let start = Instant::now();
        let mut suite = TestSuiteResult {
            total: scenarios.len(),
            ..Default::default()
        };

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await;
            if result.success {
                suite.passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                suite.failed += 1;
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            suite.results.push(result);
        }

        suite.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Scenario results: {} passed, {} failed ({} ms)",
            suite.passed, suite.failed, suite.duration_ms
        );

        suite
    }

    /// Run one scenario; the session is closed on every exit path
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let session = match self.launcher.launch().await {
            Ok(session) => session,
            Err(e) => {
                return TestResult {
                    name: scenario.name.clone(),
                    success: false,
                    duration_ms: start.elapsed().as_millis() as u64,
                    steps: vec![],
                    error: Some(format!("session launch failed: {}", e)),
                }
            }
        };

        let steps = StepExecutor::new(session.as_ref(), self.config.default_timeout)
            .with_poll_interval(self.config.poll_interval)
            .run(&scenario.steps)
            .await;

        let mut test_error = steps
            .iter()
            .find(|s| !s.success)
            .map(|s| {
                E2eError::StepFailed {
                    step: s.step_name.clone(),
                    reason: s.error.clone().unwrap_or_default(),
                }
                .to_string()
            });

        if let Err(e) = session.close().await {
            warn!("Failed to close session for '{}': {}", scenario.name, e);
            test_error.get_or_insert_with(|| format!("session close failed: {}", e));
        }

        TestResult {
            name: scenario.name.clone(),
            success: test_error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps,
            error: test_error,
        }
    }
}
