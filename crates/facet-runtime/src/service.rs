//! # Runtime Service
//!
//! Async front door of a composed runtime. Serializes top-level calls
//! behind a write lock, so each call observes the state committed by the
//! previous one, and keeps call statistics.
//!
//! ## Security
//!
//! - The logical caller comes only from the resolver; payloads carry the
//!   physical caller and nothing else about identity.
//! - Failed calls commit nothing.

use crate::adapters::InMemoryForwarderRegistry;
use crate::domain::entities::{DeploymentConfig, LogEntry, RuntimeConfig};
use crate::domain::routing::{FacetCut, InitCall};
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::RuntimeError;
use crate::events::{CallRequestPayload, CallResponsePayload};
use crate::ports::inbound::RuntimeApi;
use crate::ports::outbound::{ConfigProvider, ModuleHost};
use crate::runtime::Diamond;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Runtime service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Execution limits.
    pub runtime: RuntimeConfig,
    /// Construction parameters.
    pub deployment: DeploymentConfig,
}

/// Statistics for the runtime service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Total calls handled.
    pub calls: u64,
    /// Calls that succeeded.
    pub successes: u64,
    /// Calls that failed for any reason.
    pub failures: u64,
    /// Failures because no module serves the operation.
    pub rejected_unknown: u64,
    /// Failures because the caller lacked a capability.
    pub rejected_unauthorized: u64,
    /// Average handling time in microseconds.
    pub avg_call_time_us: u64,
}

impl ServiceStats {
    fn record(&mut self, result: Result<(), &RuntimeError>, elapsed_us: u64) {
        self.calls += 1;
        match result {
            Ok(()) => self.successes += 1,
            Err(err) => {
                self.failures += 1;
                if matches!(err, RuntimeError::UnknownOperation(_)) {
                    self.rejected_unknown += 1;
                }
                if err.is_authorization_failure() {
                    self.rejected_unauthorized += 1;
                }
            }
        }
        let total = self.calls;
        self.avg_call_time_us = (self.avg_call_time_us * (total - 1) + elapsed_us) / total;
    }
}

/// The runtime service.
pub struct RuntimeService {
    config: ServiceConfig,
    diamond: Arc<RwLock<Diamond>>,
    stats: Arc<RwLock<ServiceStats>>,
}

impl RuntimeService {
    /// Deploys a runtime from `config` on `host`.
    ///
    /// # Errors
    ///
    /// Storage failure during construction.
    pub fn new(config: ServiceConfig, host: Arc<dyn ModuleHost>) -> Result<Self, RuntimeError> {
        let forwarders = Arc::new(InMemoryForwarderRegistry::with_forwarders(
            config.deployment.trusted_forwarders.iter().copied(),
        ));
        let diamond = Diamond::deploy(
            &config.deployment,
            config.runtime.clone(),
            host,
            forwarders,
        )?;
        info!(
            address = %diamond.address(),
            max_call_depth = config.runtime.max_call_depth,
            "Runtime service started"
        );
        Ok(Self {
            config,
            diamond: Arc::new(RwLock::new(diamond)),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        })
    }

    /// Deploys a runtime from a configuration provider.
    ///
    /// # Errors
    ///
    /// See [`RuntimeService::new`].
    pub fn from_provider(
        provider: &dyn ConfigProvider,
        host: Arc<dyn ModuleHost>,
    ) -> Result<Self, RuntimeError> {
        Self::new(provider.service_config(), host)
    }

    /// Service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Runs `f` against the committed runtime.
    pub async fn with_diamond<R>(&self, f: impl FnOnce(&Diamond) -> R) -> R {
        f(&*self.diamond.read().await)
    }

    /// Handle a call request.
    #[instrument(skip(self, payload), fields(correlation_id = %correlation_id))]
    pub async fn handle_call(
        &self,
        correlation_id: Uuid,
        payload: CallRequestPayload,
    ) -> CallResponsePayload {
        debug!(
            caller = %payload.caller,
            len = payload.calldata.len(),
            read_only = payload.read_only,
            "Processing call request"
        );

        let result = if payload.read_only {
            self.execute_view(payload.caller, &payload.calldata)
                .await
                .map(|output| (output, Vec::new()))
        } else {
            self.execute(payload.caller, &payload.calldata).await
        };

        match result {
            Ok((output, logs)) => {
                debug!(logs = logs.len(), "Call completed");
                CallResponsePayload::success(correlation_id, output, logs)
            }
            Err(err) => {
                warn!(reason = err.reason_code(), error = %err, "Call failed");
                CallResponsePayload::failure(correlation_id, err.reason_code(), err.to_string())
            }
        }
    }

    async fn execute(
        &self,
        caller: Address,
        calldata: &Bytes,
    ) -> Result<(Bytes, Vec<LogEntry>), RuntimeError> {
        let start = Instant::now();
        let result = {
            let mut diamond = self.diamond.write().await;
            let before = diamond.logs().len();
            diamond
                .call(caller, calldata.as_slice())
                .map(|output| (output, diamond.logs()[before..].to_vec()))
        };
        let elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.stats
            .write()
            .await
            .record(result.as_ref().map(|_| ()), elapsed_us);
        result
    }

    async fn execute_view(&self, caller: Address, calldata: &Bytes) -> Result<Bytes, RuntimeError> {
        self.diamond.read().await.view(caller, calldata.as_slice())
    }
}

#[async_trait]
impl RuntimeApi for RuntimeService {
    async fn call(&self, caller: Address, calldata: Bytes) -> Result<Bytes, RuntimeError> {
        self.execute(caller, &calldata).await.map(|(output, _)| output)
    }

    async fn view(&self, caller: Address, calldata: Bytes) -> Result<Bytes, RuntimeError> {
        self.execute_view(caller, &calldata).await
    }

    async fn cut(
        &self,
        caller: Address,
        records: Vec<FacetCut>,
        init: Option<InitCall>,
    ) -> Result<(), RuntimeError> {
        let start = Instant::now();
        let result = self.diamond.write().await.cut(caller, records, init);
        let elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.stats.write().await.record(result.as_ref().copied(), elapsed_us);
        result
    }

    async fn logs(&self) -> Vec<LogEntry> {
        self.diamond.read().await.logs().to_vec()
    }
}

// =============================================================================
// TESTS
// =============================================================================
