//! # Native Operations
//!
//! Operations the runtime serves with its own code, before consulting the
//! routing table: composition, introspection, interface detection and the
//! admin capability. They never appear in the loupe output and cannot be
//! routed to a module.

use crate::domain::abi::{self, signatures, DiamondCutArgs, InterfaceRegistry};
use crate::domain::authorization;
use crate::domain::routing::{InitCall, ModuleOperations, RoutingTable};
use crate::domain::storage::namespaces;
use crate::domain::value_objects::{Address, Bytes, InterfaceId, OperationId};
use crate::errors::RuntimeError;
use crate::runtime::cut;
use crate::runtime::executor::{Executor, Frame};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Operations served by the runtime itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeOperation {
    /// `diamondCut(...)`
    DiamondCut,
    /// `facets()`
    Facets,
    /// `facetFunctionSelectors(address)`
    FacetFunctionSelectors,
    /// `facetAddresses()`
    FacetAddresses,
    /// `facetAddress(bytes4)`
    FacetAddress,
    /// `supportsInterface(bytes4)`
    SupportsInterface,
    /// `admin()`
    Admin,
    /// `changeAdmin(address)`
    ChangeAdmin,
    /// `isTrustedForwarder(address)`
    IsTrustedForwarder,
}

impl NativeOperation {
    /// Every native operation.
    pub const ALL: [Self; 9] = [
        Self::DiamondCut,
        Self::Facets,
        Self::FacetFunctionSelectors,
        Self::FacetAddresses,
        Self::FacetAddress,
        Self::SupportsInterface,
        Self::Admin,
        Self::ChangeAdmin,
        Self::IsTrustedForwarder,
    ];

    /// Canonical signature.
    #[must_use]
    pub const fn signature(self) -> &'static str {
        match self {
            Self::DiamondCut => signatures::DIAMOND_CUT,
            Self::Facets => signatures::FACETS,
            Self::FacetFunctionSelectors => signatures::FACET_FUNCTION_SELECTORS,
            Self::FacetAddresses => signatures::FACET_ADDRESSES,
            Self::FacetAddress => signatures::FACET_ADDRESS,
            Self::SupportsInterface => signatures::SUPPORTS_INTERFACE,
            Self::Admin => signatures::ADMIN,
            Self::ChangeAdmin => signatures::CHANGE_ADMIN,
            Self::IsTrustedForwarder => signatures::IS_TRUSTED_FORWARDER,
        }
    }

    /// Operation id.
    #[must_use]
    pub fn id(self) -> OperationId {
        OperationId::from_signature(self.signature())
    }

    /// Looks up the native operation with this id.
    #[must_use]
    pub fn from_id(id: OperationId) -> Option<Self> {
        static TABLE: OnceLock<HashMap<OperationId, NativeOperation>> = OnceLock::new();
        TABLE
            .get_or_init(|| Self::ALL.iter().map(|op| (op.id(), *op)).collect())
            .get(&id)
            .copied()
    }
}

/// Returns true if the runtime serves `id` itself.
#[must_use]
pub fn is_native(id: OperationId) -> bool {
    NativeOperation::from_id(id).is_some()
}

pub(crate) fn execute(
    exec: &mut Executor,
    frame: Frame,
    operation: NativeOperation,
    args: &[u8],
) -> Result<Bytes, RuntimeError> {
    match operation {
        NativeOperation::DiamondCut => {
            let DiamondCutArgs {
                records,
                init,
                calldata,
            } = abi::decode_args(args)?;
            let init = InitCall::from_parts(init, calldata)?;
            cut::diamond_cut(exec, frame, &records, init)?;
            abi::encode_return(&())
        }
        NativeOperation::Facets => {
            let table = routing_table(exec)?;
            let modules: Vec<ModuleOperations> = table.modules().to_vec();
            abi::encode_return(&modules)
        }
        NativeOperation::FacetFunctionSelectors => {
            let module: Address = abi::decode_args(args)?;
            abi::encode_return(&routing_table(exec)?.operations_of(module))
        }
        NativeOperation::FacetAddresses => {
            abi::encode_return(&routing_table(exec)?.module_addresses())
        }
        NativeOperation::FacetAddress => {
            let op: OperationId = abi::decode_args(args)?;
            let module = routing_table(exec)?.module_of(op).unwrap_or(Address::ZERO);
            abi::encode_return(&module)
        }
        NativeOperation::SupportsInterface => {
            let id: InterfaceId = abi::decode_args(args)?;
            let registry: InterfaceRegistry = exec.storage.load(namespaces::interfaces())?;
            abi::encode_return(&registry.supports(id))
        }
        NativeOperation::Admin => abi::encode_return(&authorization::current_admin(&exec.storage)?),
        NativeOperation::ChangeAdmin => {
            let new: Address = abi::decode_args(args)?;
            let event = authorization::change_admin(&mut exec.storage, frame.sender, new)?;
            exec.emit(event);
            abi::encode_return(&())
        }
        NativeOperation::IsTrustedForwarder => {
            let candidate: Address = abi::decode_args(args)?;
            abi::encode_return(&exec.forwarders.is_trusted_forwarder(candidate))
        }
    }
}

fn routing_table(exec: &Executor) -> Result<RoutingTable, RuntimeError> {
    Ok(exec.storage.load(namespaces::routing())?)
}

// =============================================================================
// TESTS
// =============================================================================
