//! # Diamond
//!
//! A composed runtime: one address, one storage, and a routing table that
//! sends each operation to the module serving it.
//!
//! ## Call lifecycle
//!
//! 1. Resolve the logical caller (sender tag honored only for trusted
//!    forwarders).
//! 2. Dispatch against a working copy of storage.
//! 3. On success commit storage and buffered notifications together; on
//!    failure discard both and return the reason.

use crate::domain::abi::{self, interfaces, DiamondCutArgs, InterfaceRegistry};
use crate::domain::authorization;
use crate::domain::entities::{DeploymentConfig, LogEntry, RuntimeConfig, RuntimeEvent};
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::resolver::resolve_logical_caller;
use crate::domain::routing::{FacetCut, InitCall, RoutingTable};
use crate::domain::storage::{namespaces, Storage};
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::RuntimeError;
use crate::ports::outbound::{ModuleHost, TrustedForwarderRegistry};
use crate::runtime::executor::{Executor, Frame};
use crate::runtime::native::NativeOperation;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A composed runtime.
pub struct Diamond {
    address: Address,
    config: RuntimeConfig,
    host: Arc<dyn ModuleHost>,
    forwarders: Arc<dyn TrustedForwarderRegistry>,
    storage: Storage,
    logs: Vec<LogEntry>,
}

impl Diamond {
    /// Constructs a runtime with the given holders.
    ///
    /// Writes the admin and owner slots, registers the interface-detection,
    /// cut and loupe interfaces, and records the initial `AdminChanged` and
    /// `OwnershipTransferred` notifications.
    ///
    /// # Errors
    ///
    /// Storage encode failure.
    pub fn deploy(
        deployment: &DeploymentConfig,
        config: RuntimeConfig,
        host: Arc<dyn ModuleHost>,
        forwarders: Arc<dyn TrustedForwarderRegistry>,
    ) -> Result<Self, RuntimeError> {
        let mut storage = Storage::new();
        let admin_event = authorization::init_admin(&mut storage, deployment.admin)?;
        let owner_event = authorization::init_owner(&mut storage, deployment.owner)?;

        let mut registry = InterfaceRegistry::default();
        registry.set(interfaces::interface_detection(), true);
        registry.set(interfaces::diamond_cut(), true);
        registry.set(interfaces::diamond_loupe(), true);
        storage.store(namespaces::interfaces(), &registry)?;
        storage.store(namespaces::routing(), &RoutingTable::new())?;

        let logs = [admin_event, owner_event]
            .into_iter()
            .map(|event| LogEntry {
                address: deployment.address,
                event,
            })
            .collect();

        info!(
            address = %deployment.address,
            admin = %deployment.admin,
            owner = %deployment.owner,
            "Diamond deployed"
        );

        Ok(Self {
            address: deployment.address,
            config,
            host,
            forwarders,
            storage,
            logs,
        })
    }

    /// Address of the runtime.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Execution limits.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Committed storage.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Committed notifications, oldest first.
    #[must_use]
    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Committed routing table.
    ///
    /// # Errors
    ///
    /// Storage decode failure.
    pub fn routing_table(&self) -> Result<RoutingTable, RuntimeError> {
        Ok(self.storage.load(namespaces::routing())?)
    }

    /// Current admin.
    ///
    /// # Errors
    ///
    /// Storage decode failure.
    pub fn admin(&self) -> Result<Address, RuntimeError> {
        authorization::current_admin(&self.storage)
    }

    /// Current owner.
    ///
    /// # Errors
    ///
    /// Storage decode failure.
    pub fn owner(&self) -> Result<Address, RuntimeError> {
        authorization::current_owner(&self.storage)
    }

    /// Executes one top-level call from the physical sender `caller`.
    ///
    /// # Errors
    ///
    /// The call's failure reason. Nothing is committed in that case.
    pub fn call(&mut self, caller: Address, calldata: &[u8]) -> Result<Bytes, RuntimeError> {
        let mut exec = self.executor();
        let result = Self::run(&mut exec, caller, calldata);
        match &result {
            Ok(_) => {
                let (storage, logs) = exec.into_parts();
                debug!(events = logs.len(), "Call committed");
                self.storage = storage;
                self.logs.extend(logs);
            }
            Err(error) => {
                warn!(caller = %caller, reason = error.reason_code(), "Call reverted");
            }
        }
        result
    }

    /// Executes a call against a scratch copy of state and discards it.
    ///
    /// # Errors
    ///
    /// The call's failure reason.
    pub fn view(&self, caller: Address, calldata: &[u8]) -> Result<Bytes, RuntimeError> {
        let mut exec = self.executor();
        Self::run(&mut exec, caller, calldata)
    }

    /// Encodes and submits a `diamondCut` as `caller`.
    ///
    /// # Errors
    ///
    /// See [`Diamond::call`].
    pub fn cut(
        &mut self,
        caller: Address,
        records: Vec<FacetCut>,
        init: Option<InitCall>,
    ) -> Result<(), RuntimeError> {
        let (init, calldata) = match init {
            Some(init) => (init.target, init.calldata),
            None => (Address::ZERO, Bytes::new()),
        };
        let args = DiamondCutArgs {
            records,
            init,
            calldata,
        };
        let calldata = abi::encode_call(NativeOperation::DiamondCut.id(), &args)?;
        self.call(caller, calldata.as_slice())?;
        Ok(())
    }

    /// Checks the routing table against the module host.
    ///
    /// # Errors
    ///
    /// Storage decode failure.
    pub fn check_invariants(&self) -> Result<InvariantCheckResult, RuntimeError> {
        let table = self.routing_table()?;
        Ok(check_all_invariants(&table, |module| self.host.has_code(module)))
    }

    /// Committed notifications without their emitting address.
    pub fn events(&self) -> impl Iterator<Item = &RuntimeEvent> {
        self.logs.iter().map(|entry| &entry.event)
    }

    fn executor(&self) -> Executor {
        Executor::new(
            Arc::clone(&self.host),
            Arc::clone(&self.forwarders),
            self.config.clone(),
            self.address,
            self.storage.clone(),
        )
    }

    fn run(exec: &mut Executor, caller: Address, calldata: &[u8]) -> Result<Bytes, RuntimeError> {
        let forwarders = Arc::clone(&exec.forwarders);
        let resolved = resolve_logical_caller(caller, calldata, |candidate| {
            forwarders.is_trusted_forwarder(candidate)
        });
        let frame = Frame::top_level(resolved.sender, resolved.forwarder);
        exec.dispatch(frame, resolved.calldata.as_slice())
    }
}

impl std::fmt::Debug for Diamond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diamond")
            .field("address", &self.address)
            .field("config", &self.config)
            .field("regions", &self.storage.region_count())
            .field("logs", &self.logs.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================
