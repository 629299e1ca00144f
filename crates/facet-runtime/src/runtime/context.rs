//! # Call Context
//!
//! What module code sees while the runtime executes it: the runtime's
//! storage, the logical caller of the top-level call, and a way back into
//! the runtime for nested calls.
//!
//! The physical sender of a forwarded call is deliberately not exposed as
//! an identity; authorization helpers here all check `msg_sender()`.

use crate::domain::abi::InterfaceRegistry;
use crate::domain::authorization;
use crate::domain::entities::RuntimeEvent;
use crate::domain::phase;
use crate::domain::storage::{namespaces, Namespace, Storage};
use crate::domain::value_objects::{Address, Bytes, InterfaceId, RoleId};
use crate::errors::RuntimeError;
use crate::runtime::executor::{Executor, Frame};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

/// Execution context handed to a [`Facet`](crate::ports::Facet).
pub struct CallContext<'e> {
    exec: &'e mut Executor,
    frame: Frame,
    module: Address,
}

impl<'e> CallContext<'e> {
    pub(crate) fn new(exec: &'e mut Executor, frame: Frame, module: Address) -> Self {
        Self {
            exec,
            frame,
            module,
        }
    }

    // --- identity ------------------------------------------------------------

    /// Logical caller of the top-level call.
    #[must_use]
    pub fn msg_sender(&self) -> Address {
        self.frame.sender
    }

    /// Relay that forwarded the call, if any. Informational only.
    #[must_use]
    pub fn forwarder(&self) -> Option<Address> {
        self.frame.forwarder
    }

    /// Address of the runtime whose storage is in use.
    #[must_use]
    pub fn this(&self) -> Address {
        self.exec.this
    }

    /// Address of the module whose code is running.
    #[must_use]
    pub fn module(&self) -> Address {
        self.module
    }

    /// Nesting depth (0 for the top-level call).
    #[must_use]
    pub fn depth(&self) -> u16 {
        self.frame.depth
    }

    // --- storage ---------------------------------------------------------------

    /// Read access to the runtime's storage.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.exec.storage
    }

    /// Write access to the runtime's storage.
    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.exec.storage
    }

    /// Loads the typed layout of a region.
    ///
    /// # Errors
    ///
    /// `Storage` if the region does not decode as `T`.
    pub fn load<T>(&self, namespace: Namespace) -> Result<T, RuntimeError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.exec.storage.load(namespace)?)
    }

    /// Writes the typed layout of a region.
    ///
    /// # Errors
    ///
    /// `Storage` if `value` cannot be encoded.
    pub fn store<T: Serialize>(
        &mut self,
        namespace: Namespace,
        value: &T,
    ) -> Result<(), RuntimeError> {
        Ok(self.exec.storage.store(namespace, value)?)
    }

    // --- phase guard -----------------------------------------------------------

    /// Current phase of a namespace.
    #[must_use]
    pub fn enter_phase(&self, namespace: Namespace) -> u64 {
        phase::enter_phase(&self.exec.storage, namespace)
    }

    /// Advances a namespace's phase from `expected`; notifies `Initialized`.
    ///
    /// # Errors
    ///
    /// `PhaseAlreadyReached` if the stored phase is not `expected`.
    pub fn advance_phase(
        &mut self,
        namespace: Namespace,
        expected: u64,
    ) -> Result<u64, RuntimeError> {
        let reached = phase::advance_phase(&mut self.exec.storage, namespace, expected)?;
        info!(?namespace, phase = reached, module = %self.module, "Namespace initialized");
        self.exec.emit(RuntimeEvent::Initialized {
            namespace,
            phase: reached,
        });
        Ok(reached)
    }

    // --- authorization ---------------------------------------------------------

    /// Fails with `NotAdmin` unless the logical caller is the admin.
    ///
    /// # Errors
    ///
    /// `NotAdmin`.
    pub fn enforce_is_admin(&self) -> Result<(), RuntimeError> {
        authorization::enforce_is_admin(&self.exec.storage, self.frame.sender)
    }

    /// Fails with `NotOwner` unless the logical caller is the owner.
    ///
    /// # Errors
    ///
    /// `NotOwner`.
    pub fn enforce_is_owner(&self) -> Result<(), RuntimeError> {
        authorization::enforce_is_owner(&self.exec.storage, self.frame.sender)
    }

    /// Fails with `MissingRole` unless the logical caller holds `role`.
    ///
    /// # Errors
    ///
    /// `MissingRole`.
    pub fn enforce_has_role(&self, role: RoleId) -> Result<(), RuntimeError> {
        authorization::enforce_has_role(&self.exec.storage, role, self.frame.sender)
    }

    // --- notifications ---------------------------------------------------------

    /// Buffers a notification for commit with the top-level call.
    pub fn emit(&mut self, event: RuntimeEvent) {
        self.exec.emit(event);
    }

    /// Buffers a module-defined notification.
    pub fn emit_module_event(&mut self, topic: &str, data: Bytes) {
        let module = self.module;
        self.exec.emit(RuntimeEvent::Module {
            module,
            topic: topic.to_string(),
            data,
        });
    }

    /// Registers (or unregisters) an interface for `supportsInterface`.
    ///
    /// # Errors
    ///
    /// `Storage` on region decode/encode failure.
    pub fn set_supported_interface(
        &mut self,
        id: InterfaceId,
        supported: bool,
    ) -> Result<(), RuntimeError> {
        let ns = namespaces::interfaces();
        let mut registry: InterfaceRegistry = self.load(ns)?;
        registry.set(id, supported);
        self.store(ns, &registry)
    }

    // --- re-entrancy -----------------------------------------------------------

    /// Calls back into the runtime with the same logical caller.
    ///
    /// The nested call routes exactly like a top-level call. If it fails,
    /// its writes are rolled back before the error is returned here.
    ///
    /// # Errors
    ///
    /// Whatever the nested call fails with, or `CallDepthExceeded`.
    pub fn call_self(&mut self, calldata: &[u8]) -> Result<Bytes, RuntimeError> {
        let nested = self.frame.nested();
        self.exec.dispatch(nested, calldata)
    }
}
