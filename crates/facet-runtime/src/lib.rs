//! # Facet Runtime - Modular Contract Composition
//!
//! A runtime that owns one storage space and serves its operations by
//! running the code of independently deployed modules (facets) against that
//! storage. A routing table maps each operation id to the module serving
//! it; the admin recomposes the table with atomic cuts.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Every routed operation maps to a deployed module | `runtime/cut.rs` - `diamond_cut()`, `domain/invariants.rs` - `check_no_dangling_routes()` |
//! | Module index agrees with the route map | `domain/routing.rs` - `RoutingTable::apply()`, `domain/invariants.rs` - `check_index_consistency()` |
//! | A cut applies entirely or not at all | `runtime/executor.rs` - frame checkpoints |
//! | Each namespace initializer runs once | `domain/phase.rs` - `advance_phase()` |
//! | Only the admin recomposes | `runtime/cut.rs` - `enforce_is_admin()` |
//! | Sender tag honored only from trusted forwarders | `domain/resolver.rs` - `resolve_logical_caller()` |
//! | Failed calls commit nothing | `runtime/diamond.rs` - `Diamond::call()` |
//!
//! ## Capabilities
//!
//! | Capability | Gates | Held by |
//! |------------|-------|---------|
//! | Admin | `diamondCut`, `changeAdmin` | `DeploymentConfig::admin` |
//! | Owner | `transferOwnership`, `grantRole`, `revokeRole` | `DeploymentConfig::owner` |
//! | Role | module-defined | granted by the owner |
//!
//! The zero address never holds a capability.
//!
//! ## Execution Limits
//!
//! | Limit | Default | Purpose |
//! |-------|---------|---------|
//! | `max_call_depth` | 128 | Bound re-entrant self-calls within a 2 MiB stack |
//!
//! ## Usage Example
//!
//! ```ignore
//! use facet_runtime::prelude::*;
//!
//! let host = Arc::new(InMemoryModuleHost::new());
//! let ownership = host.deploy(admin, Arc::new(OwnershipFacet::new()));
//!
//! let mut diamond = Diamond::deploy(&deployment, RuntimeConfig::default(), host, forwarders)?;
//! diamond.cut(admin, vec![FacetCut::add(ownership, OwnershipFacet::new().operations())], None)?;
//!
//! let out = diamond.call(anyone, encode_signature_call("owner()", &())?.as_slice())?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod events;
pub mod facets;
pub mod ports;
pub mod runtime;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        DeploymentConfig, LogEntry, ResolvedCall, RuntimeConfig, RuntimeEvent,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        keccak256, Address, Bytes, Hash, InterfaceId, OperationId, RoleId,
    };

    // Routing and storage
    pub use crate::domain::routing::{CutAction, FacetCut, InitCall, ModuleOperations, RoutingTable};
    pub use crate::domain::storage::{namespaces, Namespace, Storage};

    // Calldata codec
    pub use crate::domain::abi::{
        decode_args, decode_return, encode_call, encode_return, encode_signature_call,
        DiamondCutArgs,
    };

    // Caller resolution
    pub use crate::domain::resolver::{append_sender_tag, resolve_logical_caller};

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, limits, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::RuntimeApi;
    pub use crate::ports::outbound::{ConfigProvider, Facet, ModuleHost, TrustedForwarderRegistry};

    // Runtime
    pub use crate::runtime::{CallContext, Diamond, NativeOperation};

    // Facets
    pub use crate::facets::{AccessControlFacet, OwnershipFacet};

    // Adapters
    pub use crate::adapters::{
        compute_module_address, InMemoryForwarderRegistry, InMemoryModuleHost,
        StaticConfigProvider, TomlConfigProvider,
    };

    // Events
    pub use crate::events::{CallRequestPayload, CallResponsePayload};

    // Errors
    pub use crate::errors::{ConfigError, RuntimeError, StorageError};

    // Service
    pub use crate::service::{RuntimeService, ServiceConfig, ServiceStats};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
