//! Mock model deployer
//!
//! Records lookup and stop calls. Lookup and stop failures can be injected.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use contracts::{
    ContractError, ModelDeployer, ServiceHandle, ServiceQuery, ServiceRecord,
    DEFAULT_MODEL_NAME, DEFAULT_PIPELINE_NAME, DEFAULT_PIPELINE_STEP_NAME,
};
use tracing::debug;

/// Mock service handle
///
/// Clones share the call record, so a test can keep one copy for assertions.
#[derive(Debug, Clone)]
pub struct MockService {
    record: ServiceRecord,
    stop_calls: Arc<Mutex<Vec<Duration>>>,
    fail_stop: bool,
}

impl MockService {
    /// Running service matching the default query
    pub fn running(uuid: &str) -> Self {
        Self::from_record(ServiceRecord::new(
            uuid,
            DEFAULT_PIPELINE_NAME,
            DEFAULT_PIPELINE_STEP_NAME,
            DEFAULT_MODEL_NAME,
        ))
    }

    pub fn from_record(record: ServiceRecord) -> Self {
        Self {
            record,
            stop_calls: Arc::new(Mutex::new(Vec::new())),
            fail_stop: false,
        }
    }

    /// Make `stop` fail
    pub fn with_failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Timeout passed to each `stop` call
    pub fn stop_calls(&self) -> Vec<Duration> {
        self.stop_calls.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        self.stop_calls.lock().unwrap().len()
    }
}

impl ServiceHandle for MockService {
    fn record(&self) -> &ServiceRecord {
        &self.record
    }

    async fn stop(&self, timeout: Duration) -> Result<(), ContractError> {
        debug!(uuid = %self.record.uuid, ?timeout, "mock service stop");
        self.stop_calls.lock().unwrap().push(timeout);
        if self.fail_stop {
            return Err(ContractError::stop_failed(
                &self.record.uuid,
                "injected stop failure",
            ));
        }
        Ok(())
    }
}

/// Mock deployer
#[derive(Debug, Clone, Default)]
pub struct MockModelDeployer {
    services: Vec<MockService>,
    queries: Arc<Mutex<Vec<ServiceQuery>>>,
    lookups: Arc<AtomicUsize>,
    fail_lookup: bool,
}

impl MockModelDeployer {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `services` in the given order
    pub fn with_services(services: Vec<MockService>) -> Self {
        Self {
            services,
            ..Default::default()
        }
    }

    /// Make lookups fail
    pub fn with_failing_lookup(mut self) -> Self {
        self.fail_lookup = true;
        self
    }

    /// All queries received
    pub fn queries(&self) -> Vec<ServiceQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ModelDeployer for MockModelDeployer {
    type Service = MockService;

    async fn find_model_server(
        &self,
        query: &ServiceQuery,
    ) -> Result<Vec<MockService>, ContractError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        if self.fail_lookup {
            return Err(ContractError::RegistryRead {
                path: "<mock>".to_string(),
                message: "injected lookup failure".to_string(),
            });
        }

        Ok(self
            .services
            .iter()
            .filter(|s| query.matches(&s.record))
            .cloned()
            .collect())
    }
}
