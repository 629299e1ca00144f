//! # Operation Routing Table
//!
//! Maps each operation id to the module that serves it, plus a per-module
//! index used by the loupe operations. The table is persisted in the
//! runtime's routing region and mutated only through cut records.
//!
//! ## Invariants
//!
//! - One operation id maps to at most one module.
//! - A module appears in the index iff it serves at least one operation.
//! - `routes` and the module index always describe the same mapping.

use crate::domain::value_objects::{Address, Bytes, OperationId};
use crate::errors::RuntimeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

// =============================================================================
// CUT RECORDS
// =============================================================================

/// What a cut record does to its operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CutAction {
    /// Route new operations to the module.
    Add,
    /// Re-route existing operations to the module.
    Replace,
    /// Drop routes; module must be the zero sentinel.
    Remove,
}

/// One entry of a composition batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCut {
    /// Action to apply.
    pub action: CutAction,
    /// Target module (zero for `Remove`).
    pub module: Address,
    /// Operations affected, processed in order.
    pub operations: Vec<OperationId>,
}

impl FacetCut {
    /// Builds an `Add` record.
    #[must_use]
    pub fn add(module: Address, operations: Vec<OperationId>) -> Self {
        Self {
            action: CutAction::Add,
            module,
            operations,
        }
    }

    /// Builds a `Replace` record.
    #[must_use]
    pub fn replace(module: Address, operations: Vec<OperationId>) -> Self {
        Self {
            action: CutAction::Replace,
            module,
            operations,
        }
    }

    /// Builds a `Remove` record with the sentinel module.
    #[must_use]
    pub fn remove(operations: Vec<OperationId>) -> Self {
        Self {
            action: CutAction::Remove,
            module: Address::ZERO,
            operations,
        }
    }
}

/// Optional initialization call run after a cut's routing changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitCall {
    /// Module whose code runs in the runtime's storage context.
    pub target: Address,
    /// Calldata passed to the target.
    pub calldata: Bytes,
}

impl InitCall {
    /// Validates the `(target, calldata)` pair of a cut.
    ///
    /// Both absent (zero target, empty calldata) means no init call.
    ///
    /// # Errors
    ///
    /// `InvalidInit` if exactly one half of the pair is present.
    pub fn from_parts(target: Address, calldata: Bytes) -> Result<Option<Self>, RuntimeError> {
        match (target.is_zero(), calldata.is_empty()) {
            (true, true) => Ok(None),
            (false, false) => Ok(Some(Self { target, calldata })),
            (true, false) => Err(RuntimeError::InvalidInit(
                "zero init target with non-empty calldata".to_string(),
            )),
            (false, true) => Err(RuntimeError::InvalidInit(
                "init target with empty calldata".to_string(),
            )),
        }
    }
}

// =============================================================================
// LOUPE VIEW
// =============================================================================

/// A module and the operations it currently serves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleOperations {
    /// Module address.
    pub module: Address,
    /// Operations in order of composition.
    pub operations: Vec<OperationId>,
}

// =============================================================================
// ROUTING TABLE
// =============================================================================

/// Persisted `OperationId -> module` mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    routes: BTreeMap<OperationId, Address>,
    /// Modules in order of first composition.
    modules: Vec<ModuleOperations>,
}

impl RoutingTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Module serving `operation`, if any.
    #[must_use]
    pub fn module_of(&self, operation: OperationId) -> Option<Address> {
        self.routes.get(&operation).copied()
    }

    /// Number of routed operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if nothing is routed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// All modules with their operations.
    #[must_use]
    pub fn modules(&self) -> &[ModuleOperations] {
        &self.modules
    }

    /// Addresses of all composed modules.
    #[must_use]
    pub fn module_addresses(&self) -> Vec<Address> {
        self.modules.iter().map(|m| m.module).collect()
    }

    /// Operations served by `module` (empty if not composed).
    #[must_use]
    pub fn operations_of(&self, module: Address) -> Vec<OperationId> {
        self.modules
            .iter()
            .find(|m| m.module == module)
            .map(|m| m.operations.clone())
            .unwrap_or_default()
    }

    /// Iterates `(operation, module)` pairs.
    pub fn routes(&self) -> impl Iterator<Item = (OperationId, Address)> + '_ {
        self.routes.iter().map(|(op, module)| (*op, *module))
    }

    /// Applies one cut record.
    ///
    /// `is_native` reports operations served by the runtime itself; those
    /// count as already mapped (to the runtime) for `Add`.
    ///
    /// On error the table may hold part of the record; callers discard the
    /// table rather than persisting it.
    ///
    /// # Errors
    ///
    /// See the cut rules: `EmptyOperationList`, `ZeroModule`,
    /// `OperationAlreadyMapped`, `OperationNotMapped`, `NoOpReplace`,
    /// `RemoveModuleMismatch`.
    pub fn apply(
        &mut self,
        record: &FacetCut,
        runtime: Address,
        is_native: impl Fn(OperationId) -> bool,
    ) -> Result<(), RuntimeError> {
        if record.operations.is_empty() {
            return Err(RuntimeError::EmptyOperationList {
                module: record.module,
            });
        }

        match record.action {
            CutAction::Add => {
                if record.module.is_zero() {
                    return Err(RuntimeError::ZeroModule);
                }
                for &op in &record.operations {
                    if is_native(op) {
                        return Err(RuntimeError::OperationAlreadyMapped {
                            operation: op,
                            module: runtime,
                        });
                    }
                    self.add(op, record.module)?;
                }
            }
            CutAction::Replace => {
                if record.module.is_zero() {
                    return Err(RuntimeError::ZeroModule);
                }
                for &op in &record.operations {
                    self.replace(op, record.module)?;
                }
            }
            CutAction::Remove => {
                if !record.module.is_zero() {
                    return Err(RuntimeError::RemoveModuleMismatch {
                        module: record.module,
                    });
                }
                for &op in &record.operations {
                    self.remove(op)?;
                }
            }
        }

        debug!(
            action = ?record.action,
            module = %record.module,
            operations = record.operations.len(),
            "Cut record applied"
        );
        Ok(())
    }

    fn add(&mut self, op: OperationId, module: Address) -> Result<(), RuntimeError> {
        if let Some(&existing) = self.routes.get(&op) {
            return Err(RuntimeError::OperationAlreadyMapped {
                operation: op,
                module: existing,
            });
        }
        self.routes.insert(op, module);
        self.index_insert(op, module);
        Ok(())
    }

    fn replace(&mut self, op: OperationId, module: Address) -> Result<(), RuntimeError> {
        let current = self
            .routes
            .get(&op)
            .copied()
            .ok_or(RuntimeError::OperationNotMapped(op))?;
        if current == module {
            return Err(RuntimeError::NoOpReplace {
                operation: op,
                module,
            });
        }
        self.routes.insert(op, module);
        self.index_remove(op, current);
        self.index_insert(op, module);
        Ok(())
    }

    fn remove(&mut self, op: OperationId) -> Result<(), RuntimeError> {
        let current = self
            .routes
            .remove(&op)
            .ok_or(RuntimeError::OperationNotMapped(op))?;
        self.index_remove(op, current);
        Ok(())
    }

    fn index_insert(&mut self, op: OperationId, module: Address) {
        match self.modules.iter_mut().find(|m| m.module == module) {
            Some(entry) => entry.operations.push(op),
            None => self.modules.push(ModuleOperations {
                module,
                operations: vec![op],
            }),
        }
    }

    fn index_remove(&mut self, op: OperationId, module: Address) {
        if let Some(pos) = self.modules.iter().position(|m| m.module == module) {
            let entry = &mut self.modules[pos];
            entry.operations.retain(|o| *o != op);
            if entry.operations.is_empty() {
                self.modules.remove(pos);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const RUNTIME: Address = Address([0xDD; 20]);

    fn op(name: &str) -> OperationId {
        OperationId::from_signature(name)
    }

    fn module(n: u8) -> Address {
        Address::new([n; 20])
    }

    fn no_native(_: OperationId) -> bool {
        false
    }

    fn cut(table: &mut RoutingTable, record: FacetCut) -> Result<(), RuntimeError> {
        table.apply(&record, RUNTIME, no_native)
    }

    #[test]
    fn test_add_routes_operations() {
        let mut table = RoutingTable::new();
        cut(&mut table, FacetCut::add(module(1), vec![op("a()"), op("b()")])).unwrap();

        assert_eq!(table.module_of(op("a()")), Some(module(1)));
        assert_eq!(table.module_of(op("b()")), Some(module(1)));
        assert_eq!(table.module_addresses(), vec![module(1)]);
        assert_eq!(table.operations_of(module(1)), vec![op("a()"), op("b()")]);
    }

    #[test]
    fn test_add_already_mapped() {
        let mut table = RoutingTable::new();
        cut(&mut table, FacetCut::add(module(1), vec![op("a()")])).unwrap();

        let err = cut(&mut table, FacetCut::add(module(2), vec![op("a()")])).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::OperationAlreadyMapped {
                operation: op("a()"),
                module: module(1),
            }
        );
    }

    #[test]
    fn test_add_native_operation_is_already_mapped_to_runtime() {
        let mut table = RoutingTable::new();
        let native = op("admin()");
        let record = FacetCut::add(module(1), vec![native]);
        let err = table.apply(&record, RUNTIME, |o| o == native).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::OperationAlreadyMapped {
                operation: native,
                module: RUNTIME,
            }
        );
    }

    #[test]
    fn test_add_zero_module_rejected() {
        let mut table = RoutingTable::new();
        let err = cut(&mut table, FacetCut::add(Address::ZERO, vec![op("a()")])).unwrap_err();
        assert_eq!(err, RuntimeError::ZeroModule);
    }

    #[test]
    fn test_empty_operation_list_rejected() {
        let mut table = RoutingTable::new();
        let err = cut(&mut table, FacetCut::add(module(1), vec![])).unwrap_err();
        assert!(matches!(err, RuntimeError::EmptyOperationList { .. }));
    }

    #[test]
    fn test_replace_moves_operation_between_modules() {
        let mut table = RoutingTable::new();
        cut(&mut table, FacetCut::add(module(1), vec![op("a()"), op("b()")])).unwrap();
        cut(&mut table, FacetCut::replace(module(2), vec![op("a()")])).unwrap();

        assert_eq!(table.module_of(op("a()")), Some(module(2)));
        assert_eq!(table.operations_of(module(1)), vec![op("b()")]);
        assert_eq!(table.module_addresses(), vec![module(1), module(2)]);
    }

    #[test]
    fn test_replace_last_operation_drops_old_module() {
        let mut table = RoutingTable::new();
        cut(&mut table, FacetCut::add(module(1), vec![op("a()")])).unwrap();
        cut(&mut table, FacetCut::replace(module(2), vec![op("a()")])).unwrap();

        assert_eq!(table.module_addresses(), vec![module(2)]);
    }

    #[test]
    fn test_replace_unmapped_fails() {
        let mut table = RoutingTable::new();
        let err = cut(&mut table, FacetCut::replace(module(1), vec![op("a()")])).unwrap_err();
        assert_eq!(err, RuntimeError::OperationNotMapped(op("a()")));
    }

    #[test]
    fn test_replace_with_same_module_is_noop_error() {
        let mut table = RoutingTable::new();
        cut(&mut table, FacetCut::add(module(1), vec![op("a()")])).unwrap();
        let err = cut(&mut table, FacetCut::replace(module(1), vec![op("a()")])).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::NoOpReplace {
                operation: op("a()"),
                module: module(1),
            }
        );
    }

    #[test]
    fn test_remove_requires_sentinel_module() {
        let mut table = RoutingTable::new();
        cut(&mut table, FacetCut::add(module(1), vec![op("a()")])).unwrap();

        let record = FacetCut {
            action: CutAction::Remove,
            module: module(1),
            operations: vec![op("a()")],
        };
        let err = table.apply(&record, RUNTIME, no_native).unwrap_err();
        assert_eq!(err, RuntimeError::RemoveModuleMismatch { module: module(1) });
        assert_eq!(table.module_of(op("a()")), Some(module(1)));
    }

    #[test]
    fn test_remove_drops_route_and_module() {
        let mut table = RoutingTable::new();
        cut(&mut table, FacetCut::add(module(1), vec![op("a()")])).unwrap();
        cut(&mut table, FacetCut::remove(vec![op("a()")])).unwrap();

        assert!(table.is_empty());
        assert!(table.module_addresses().is_empty());
    }

    #[test]
    fn test_remove_unmapped_fails() {
        let mut table = RoutingTable::new();
        let err = cut(&mut table, FacetCut::remove(vec![op("a()")])).unwrap_err();
        assert_eq!(err, RuntimeError::OperationNotMapped(op("a()")));
    }

    #[test]
    fn test_init_call_from_parts() {
        assert_eq!(InitCall::from_parts(Address::ZERO, Bytes::new()).unwrap(), None);

        let init = InitCall::from_parts(module(1), Bytes::from_slice(&[1, 2, 3, 4]))
            .unwrap()
            .unwrap();
        assert_eq!(init.target, module(1));

        assert!(matches!(
            InitCall::from_parts(Address::ZERO, Bytes::from_slice(&[1])),
            Err(RuntimeError::InvalidInit(_))
        ));
        assert!(matches!(
            InitCall::from_parts(module(1), Bytes::new()),
            Err(RuntimeError::InvalidInit(_))
        ));
    }
}
