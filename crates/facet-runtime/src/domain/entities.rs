//! # Core Domain Entities
//!
//! Configuration, notifications emitted by the runtime and its modules, and
//! the outcome of caller resolution.

use crate::domain::invariants::limits;
use crate::domain::routing::{FacetCut, InitCall};
use crate::domain::storage::Namespace;
use crate::domain::value_objects::{Address, Bytes, RoleId};
use serde::{Deserialize, Serialize};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Execution limits of a runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Deepest allowed nesting of self-calls (top-level call is depth 0).
    pub max_call_depth: u16,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_call_depth: limits::MAX_CALL_DEPTH,
        }
    }
}

/// Construction parameters of a runtime.
///
/// Zero addresses mean "no holder".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Address of the runtime itself.
    pub address: Address,
    /// Initial admin (composition capability).
    pub admin: Address,
    /// Initial owner (business capability).
    pub owner: Address,
    /// Relays trusted to forward calls.
    pub trusted_forwarders: Vec<Address>,
}

// =============================================================================
// RUNTIME EVENTS
// =============================================================================

/// A change notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeEvent {
    /// Routing table changed.
    DiamondCut {
        /// Records applied, in order.
        records: Vec<FacetCut>,
        /// Init call run after the records, if any.
        init: Option<InitCall>,
    },
    /// Admin slot written (also emitted when unchanged).
    AdminChanged {
        /// Previous admin.
        previous: Address,
        /// New admin.
        new: Address,
    },
    /// Owner slot written (also emitted when unchanged).
    OwnershipTransferred {
        /// Previous owner.
        previous: Address,
        /// New owner.
        new: Address,
    },
    /// Account gained a role.
    RoleGranted {
        /// Role granted.
        role: RoleId,
        /// Account that gained it.
        account: Address,
        /// Logical caller that granted it.
        sender: Address,
    },
    /// Account lost a role.
    RoleRevoked {
        /// Role revoked.
        role: RoleId,
        /// Account that lost it.
        account: Address,
        /// Logical caller that revoked it.
        sender: Address,
    },
    /// A namespace's initializer ran.
    Initialized {
        /// Namespace initialized.
        namespace: Namespace,
        /// Phase reached.
        phase: u64,
    },
    /// Module-defined event.
    Module {
        /// Module whose code emitted it.
        module: Address,
        /// Event name.
        topic: String,
        /// Encoded payload.
        data: Bytes,
    },
}

/// An event together with the runtime that committed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Runtime address.
    pub address: Address,
    /// The event.
    pub event: RuntimeEvent,
}

// =============================================================================
// RESOLVED CALLER
// =============================================================================

/// Outcome of logical-caller resolution for one top-level call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCall {
    /// Effective requester; the only identity used for authorization.
    pub sender: Address,
    /// Relay that forwarded the call, if any.
    pub forwarder: Option<Address>,
    /// Calldata with any sender tag stripped.
    pub calldata: Bytes,
}

impl ResolvedCall {
    /// Returns true if a trusted forwarder relayed the call.
    #[must_use]
    pub fn is_forwarded(&self) -> bool {
        self.forwarder.is_some()
    }
}

// =============================================================================
// TESTS
// =============================================================================
