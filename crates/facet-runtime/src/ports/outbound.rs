//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the runtime depends on:
//! - module code (`Facet`) and where it is deployed (`ModuleHost`)
//! - the trusted-forwarder registry
//! - configuration

use crate::domain::value_objects::{Address, Bytes, OperationId};
use crate::errors::RuntimeError;
use crate::runtime::context::CallContext;
use crate::service::ServiceConfig;
use std::sync::Arc;

// =============================================================================
// FACET (module code)
// =============================================================================

/// Code of an independently deployed module.
///
/// The runtime executes a facet *as if it were its own code*: the facet
/// reads and writes the runtime's storage through the [`CallContext`] and
/// sees the runtime's logical caller.
///
/// ## Module contract
///
/// - Each namespace the facet owns has exactly one initializer, which calls
///   `ctx.advance_phase(namespace, 0)` before anything else.
/// - Authorization uses `ctx.msg_sender()` only.
pub trait Facet: Send + Sync {
    /// Human-readable name, for logs.
    fn name(&self) -> &str;

    /// Operations this facet can serve.
    fn operations(&self) -> Vec<OperationId>;

    /// Executes one operation.
    ///
    /// `args` is the calldata after the operation id.
    ///
    /// # Errors
    ///
    /// Any `RuntimeError`; it is propagated to the caller unchanged.
    fn execute(
        &self,
        ctx: &mut CallContext<'_>,
        operation: OperationId,
        args: &[u8],
    ) -> Result<Bytes, RuntimeError>;
}

// =============================================================================
// MODULE HOST
// =============================================================================

/// Where module code lives: the host environment's address → code map.
pub trait ModuleHost: Send + Sync {
    /// Code deployed at `address`, if any.
    fn module(&self, address: Address) -> Option<Arc<dyn Facet>>;

    /// Returns true if `address` has code.
    fn has_code(&self, address: Address) -> bool {
        self.module(address).is_some()
    }
}

// =============================================================================
// TRUSTED FORWARDER REGISTRY
// =============================================================================

/// Set of relays allowed to forward calls on behalf of a logical caller.
///
/// Consulted on every top-level call; membership is checked, never
/// enumerated.
pub trait TrustedForwarderRegistry: Send + Sync {
    /// Returns true if `address` is a registered forwarder.
    fn is_trusted_forwarder(&self, address: Address) -> bool;
}

// =============================================================================
// CONFIG PROVIDER
// =============================================================================

/// Source of the runtime's configuration.
pub trait ConfigProvider: Send + Sync {
    /// Full service configuration.
    fn service_config(&self) -> ServiceConfig;
}

// =============================================================================
// TESTS
// =============================================================================
