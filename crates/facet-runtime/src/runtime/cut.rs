//! # Composition Executor
//!
//! Applies a batch of cut records to the routing table, then optionally
//! runs an init call in the runtime's storage context. All records, the
//! notification and the init call form one unit: the enclosing frame rolls
//! everything back if any step fails.

use crate::domain::authorization;
use crate::domain::entities::RuntimeEvent;
use crate::domain::routing::{CutAction, FacetCut, InitCall, RoutingTable};
use crate::domain::storage::namespaces;
use crate::errors::RuntimeError;
use crate::runtime::executor::{Executor, Frame};
use crate::runtime::native::is_native;
use tracing::info;

/// Add and Replace records must point at deployed code. A zero module is
/// left for the routing rules to reject.
fn requires_code(record: &FacetCut) -> bool {
    record.action != CutAction::Remove && !record.module.is_zero()
}

/// Executes `diamondCut` for the caller of `frame`.
///
/// # Errors
///
/// `NotAdmin`, any routing rule violation, `ModuleNotDeployed`, or the
/// init call's failure.
pub(crate) fn diamond_cut(
    exec: &mut Executor,
    frame: Frame,
    records: &[FacetCut],
    init: Option<InitCall>,
) -> Result<(), RuntimeError> {
    authorization::enforce_is_admin(&exec.storage, frame.sender)?;

    let ns = namespaces::routing();
    let mut table: RoutingTable = exec.storage.load(ns)?;
    for record in records {
        if requires_code(record) && !exec.host.has_code(record.module) {
            return Err(RuntimeError::ModuleNotDeployed(record.module));
        }
        table.apply(record, exec.this, is_native)?;
    }
    if let Some(init) = &init {
        if !exec.host.has_code(init.target) {
            return Err(RuntimeError::ModuleNotDeployed(init.target));
        }
    }
    exec.storage.store(ns, &table)?;

    info!(
        records = records.len(),
        routes = table.len(),
        init = init.is_some(),
        "Diamond cut applied"
    );
    exec.emit(RuntimeEvent::DiamondCut {
        records: records.to_vec(),
        init: init.clone(),
    });

    if let Some(init) = init {
        exec.delegate(frame.nested(), init.target, init.calldata.as_slice())?;
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
