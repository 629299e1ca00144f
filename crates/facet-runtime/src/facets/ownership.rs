//! # Ownership Facet
//!
//! Exposes the owner capability through dispatch.

use crate::domain::abi::{decode_args, encode_return};
use crate::domain::authorization;
use crate::domain::value_objects::{Address, Bytes, OperationId};
use crate::errors::RuntimeError;
use crate::ports::outbound::Facet;
use crate::runtime::context::CallContext;

/// Signatures served by [`OwnershipFacet`].
pub mod signatures {
    /// `owner()`
    pub const OWNER: &str = "owner()";
    /// `transferOwnership(address)`
    pub const TRANSFER_OWNERSHIP: &str = "transferOwnership(address)";
}

/// `owner()` and `transferOwnership(address)`.
#[derive(Clone, Debug)]
pub struct OwnershipFacet {
    owner: OperationId,
    transfer_ownership: OperationId,
}

impl OwnershipFacet {
    /// Creates the facet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            owner: OperationId::from_signature(signatures::OWNER),
            transfer_ownership: OperationId::from_signature(signatures::TRANSFER_OWNERSHIP),
        }
    }
}

impl Default for OwnershipFacet {
    fn default() -> Self {
        Self::new()
    }
}

impl Facet for OwnershipFacet {
    fn name(&self) -> &str {
        "ownership"
    }

    fn operations(&self) -> Vec<OperationId> {
        vec![self.owner, self.transfer_ownership]
    }

    fn execute(
        &self,
        ctx: &mut CallContext<'_>,
        operation: OperationId,
        args: &[u8],
    ) -> Result<Bytes, RuntimeError> {
        if operation == self.owner {
            return encode_return(&authorization::current_owner(ctx.storage())?);
        }
        if operation == self.transfer_ownership {
            let new: Address = decode_args(args)?;
            let caller = ctx.msg_sender();
            let event = authorization::transfer_ownership(ctx.storage_mut(), caller, new)?;
            ctx.emit(event);
            return encode_return(&());
        }
        Err(RuntimeError::UnknownOperation(operation))
    }
}

// =============================================================================
// TESTS
// =============================================================================
