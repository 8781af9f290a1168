//! Mock pipeline
//!
//! Records invocation order for tests that run without the ML framework.
//! Failures can be injected per pipeline.

use std::sync::{Arc, Mutex};

use contracts::{ContractError, Pipeline};
use tracing::debug;

/// Shared, ordered record of pipeline invocations
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    /// Snapshot of all entries in call order
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Number of times `entry` was recorded
    pub fn count(&self, entry: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == entry)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

/// Mock pipeline
///
/// Every `run` appends to the `CallLog`. Fails when `fail_with` is set.
#[derive(Debug, Clone)]
pub struct MockPipeline {
    name: String,
    log: CallLog,
    fail_with: Option<i32>,
}

impl MockPipeline {
    pub fn new(name: impl Into<String>, log: CallLog) -> Self {
        Self {
            name: name.into(),
            log,
            fail_with: None,
        }
    }

    /// Pipeline that fails with the given exit code
    pub fn failing(name: impl Into<String>, log: CallLog, code: i32) -> Self {
        Self {
            name: name.into(),
            log,
            fail_with: Some(code),
        }
    }
}

impl Pipeline for MockPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), ContractError> {
        debug!(pipeline = %self.name, "mock pipeline run");
        self.log.record(&self.name);
        match self.fail_with {
            Some(code) => Err(ContractError::pipeline_failed(&self.name, Some(code))),
            None => Ok(()),
        }
    }
}
