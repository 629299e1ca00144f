//! # Executor
//!
//! Runs one top-level call against a working copy of the runtime's storage.
//!
//! Every frame (the top-level call, each nested self-call, each init call)
//! takes a checkpoint of storage and the event buffer on entry and restores
//! it if the frame fails. The owning [`Diamond`](super::Diamond) commits the
//! working copy only when the top-level frame succeeds.

use crate::domain::abi::split_calldata;
use crate::domain::entities::{LogEntry, RuntimeConfig, RuntimeEvent};
use crate::domain::routing::RoutingTable;
use crate::domain::storage::{namespaces, Storage};
use crate::domain::value_objects::{Address, Bytes, OperationId};
use crate::errors::RuntimeError;
use crate::ports::outbound::{ModuleHost, TrustedForwarderRegistry};
use crate::runtime::context::CallContext;
use crate::runtime::native::{self, NativeOperation};
use std::sync::Arc;
use tracing::{debug, trace};

/// Identity and nesting of one executing frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Frame {
    /// Logical caller, fixed for the whole top-level call.
    pub(crate) sender: Address,
    /// Relay that forwarded the top-level call.
    pub(crate) forwarder: Option<Address>,
    /// 0 for the top-level call.
    pub(crate) depth: u16,
}

impl Frame {
    pub(crate) fn top_level(sender: Address, forwarder: Option<Address>) -> Self {
        Self {
            sender,
            forwarder,
            depth: 0,
        }
    }

    pub(crate) fn nested(self) -> Self {
        Self {
            depth: self.depth.saturating_add(1),
            ..self
        }
    }
}

struct Checkpoint {
    storage: Storage,
    logs: usize,
}

/// Working state of one top-level call.
pub(crate) struct Executor {
    pub(crate) host: Arc<dyn ModuleHost>,
    pub(crate) forwarders: Arc<dyn TrustedForwarderRegistry>,
    pub(crate) config: RuntimeConfig,
    pub(crate) this: Address,
    pub(crate) storage: Storage,
    pub(crate) logs: Vec<LogEntry>,
}

impl Executor {
    pub(crate) fn new(
        host: Arc<dyn ModuleHost>,
        forwarders: Arc<dyn TrustedForwarderRegistry>,
        config: RuntimeConfig,
        this: Address,
        storage: Storage,
    ) -> Self {
        Self {
            host,
            forwarders,
            config,
            this,
            storage,
            logs: Vec::new(),
        }
    }

    /// Consumes the executor, yielding the working storage and new logs.
    pub(crate) fn into_parts(self) -> (Storage, Vec<LogEntry>) {
        (self.storage, self.logs)
    }

    /// Buffers a notification; dropped if the emitting frame fails.
    pub(crate) fn emit(&mut self, event: RuntimeEvent) {
        self.logs.push(LogEntry {
            address: self.this,
            event,
        });
    }

    /// Routes a call: native operation, else routing table lookup.
    pub(crate) fn dispatch(
        &mut self,
        frame: Frame,
        calldata: &[u8],
    ) -> Result<Bytes, RuntimeError> {
        self.guarded(frame, |exec| {
            let (operation, args) = split_calldata(calldata)?;
            if let Some(native) = NativeOperation::from_id(operation) {
                trace!(?native, depth = frame.depth, "Native operation");
                return native::execute(exec, frame, native, args);
            }

            let table: RoutingTable = exec.storage.load(namespaces::routing())?;
            let module = table
                .module_of(operation)
                .ok_or(RuntimeError::UnknownOperation(operation))?;
            exec.run_module(frame, module, operation, args)
        })
    }

    /// Runs `calldata` directly against `target`'s code, bypassing the
    /// routing table. Used for cut init calls.
    pub(crate) fn delegate(
        &mut self,
        frame: Frame,
        target: Address,
        calldata: &[u8],
    ) -> Result<Bytes, RuntimeError> {
        self.guarded(frame, |exec| {
            let (operation, args) = split_calldata(calldata)?;
            exec.run_module(frame, target, operation, args)
        })
    }

    fn run_module(
        &mut self,
        frame: Frame,
        module: Address,
        operation: OperationId,
        args: &[u8],
    ) -> Result<Bytes, RuntimeError> {
        let facet = self
            .host
            .module(module)
            .ok_or(RuntimeError::ModuleNotDeployed(module))?;
        debug!(
            module = %module,
            facet = facet.name(),
            %operation,
            depth = frame.depth,
            "Delegating to module"
        );
        let mut ctx = CallContext::new(self, frame, module);
        facet.execute(&mut ctx, operation, args)
    }

    /// Enforces the depth limit and rolls the frame back on failure.
    fn guarded(
        &mut self,
        frame: Frame,
        body: impl FnOnce(&mut Self) -> Result<Bytes, RuntimeError>,
    ) -> Result<Bytes, RuntimeError> {
        if frame.depth > self.config.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                depth: frame.depth,
                max: self.config.max_call_depth,
            });
        }

        let checkpoint = Checkpoint {
            storage: self.storage.clone(),
            logs: self.logs.len(),
        };
        let result = body(self);
        if result.is_err() {
            self.storage = checkpoint.storage;
            self.logs.truncate(checkpoint.logs);
        }
        result
    }
}
