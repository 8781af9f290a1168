//! Model deployer abstraction
//!
//! Defines the registry of model-serving instances and the handle used to
//! stop one of them.

use std::future::Future;
use std::time::Duration;

use crate::{ContractError, ServiceQuery, ServiceRecord};

/// Model deployer trait
///
/// Tracks running model servers. The returned handles are ordered; callers
/// that act on "the" matching service use the first one.
pub trait ModelDeployer: Send + Sync {
    /// Handle type for a matching service
    type Service: ServiceHandle;

    /// Find model servers matching the query
    ///
    /// An empty result is not an error.
    fn find_model_server(
        &self,
        query: &ServiceQuery,
    ) -> impl Future<Output = Result<Vec<Self::Service>, ContractError>> + Send;
}

/// Handle to one serving instance
pub trait ServiceHandle: Send + Sync {
    /// Service record snapshot taken at lookup time
    fn record(&self) -> &ServiceRecord;

    /// Service identifier
    fn uuid(&self) -> &str {
        &self.record().uuid
    }

    /// Request a graceful stop, bounded by `timeout`
    fn stop(&self, timeout: Duration) -> impl Future<Output = Result<(), ContractError>> + Send;
}
