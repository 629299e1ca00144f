//! # Domain Invariants
//!
//! Checks over the routing table that must hold after every committed call.
//!
//! - No dangling routes: every routed module has code on the host.
//! - Index consistency: the module index and the route map agree, and no
//!   module is listed without operations.

use crate::domain::routing::RoutingTable;
use crate::domain::value_objects::{Address, OperationId};
use std::collections::BTreeSet;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Every routed operation points at a module with code.
#[must_use]
pub fn check_no_dangling_routes(table: &RoutingTable, has_code: impl Fn(Address) -> bool) -> bool {
    table.routes().all(|(_, module)| !module.is_zero() && has_code(module))
}

/// Module index and route map describe the same mapping.
#[must_use]
pub fn check_index_consistency(table: &RoutingTable) -> bool {
    let mut seen_modules = BTreeSet::new();
    let mut indexed = 0usize;
    for entry in table.modules() {
        if entry.operations.is_empty() || !seen_modules.insert(entry.module) {
            return false;
        }
        for op in &entry.operations {
            if table.module_of(*op) != Some(entry.module) {
                return false;
            }
            indexed += 1;
        }
    }
    indexed == table.len()
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(
    table: &RoutingTable,
    has_code: impl Fn(Address) -> bool,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    for (operation, module) in table.routes() {
        if module.is_zero() || !has_code(module) {
            violations.push(InvariantViolation::DanglingRoute { operation, module });
        }
    }

    if !check_index_consistency(table) {
        violations.push(InvariantViolation::IndexMismatch);
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Operation routed to a module without code.
    DanglingRoute {
        operation: OperationId,
        module: Address,
    },
    /// Module index disagrees with the route map.
    IndexMismatch,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingRoute { operation, module } => {
                write!(f, "operation {operation} routed to {module} which has no code")
            }
            Self::IndexMismatch => write!(f, "module index disagrees with routes"),
        }
    }
}

// =============================================================================
// EXECUTION LIMIT CONSTANTS
// =============================================================================

/// Execution limits.
pub mod limits {
    /// Default maximum nested self-call depth.
    ///
    /// Every nested frame recurses on the native stack, so this stays well
    /// below the EVM's 1024: an unoptimized build on a 2 MiB thread stack
    /// must reach the limit and fail with `CallDepthExceeded` instead of
    /// overflowing. Hosts that run calls on a larger stack may raise
    /// `RuntimeConfig::max_call_depth`.
    pub const MAX_CALL_DEPTH: u16 = 128;
}

// =============================================================================
// TESTS
// =============================================================================
