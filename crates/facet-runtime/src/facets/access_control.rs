//! # Access-Control Facet
//!
//! Exposes the role registry through dispatch.
//!
//! The owner grants and revokes roles; any account may renounce a role it
//! holds. `initAccessControl` seeds the registry once per runtime and only
//! the admin may run it. It advances the access-control namespace from
//! phase 0, so a second run (or a re-entrant run from inside the first)
//! fails with `PhaseAlreadyReached`.

use crate::domain::abi::{decode_args, encode_return};
use crate::domain::authorization;
use crate::domain::storage::namespaces;
use crate::domain::value_objects::{Address, Bytes, InterfaceId, OperationId, RoleId};
use crate::errors::RuntimeError;
use crate::ports::outbound::Facet;
use crate::runtime::context::CallContext;
use tracing::debug;

/// Signatures served by [`AccessControlFacet`].
pub mod signatures {
    /// `hasRole(bytes32,address)`
    pub const HAS_ROLE: &str = "hasRole(bytes32,address)";
    /// `grantRole(bytes32,address)`
    pub const GRANT_ROLE: &str = "grantRole(bytes32,address)";
    /// `revokeRole(bytes32,address)`
    pub const REVOKE_ROLE: &str = "revokeRole(bytes32,address)";
    /// `renounceRole(bytes32)`
    pub const RENOUNCE_ROLE: &str = "renounceRole(bytes32)";
    /// `initAccessControl((bytes32,address)[])`
    pub const INIT_ACCESS_CONTROL: &str = "initAccessControl((bytes32,address)[])";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    HasRole,
    GrantRole,
    RevokeRole,
    RenounceRole,
    Init,
}

impl Op {
    const ALL: [(Self, &'static str); 5] = [
        (Self::HasRole, signatures::HAS_ROLE),
        (Self::GrantRole, signatures::GRANT_ROLE),
        (Self::RevokeRole, signatures::REVOKE_ROLE),
        (Self::RenounceRole, signatures::RENOUNCE_ROLE),
        (Self::Init, signatures::INIT_ACCESS_CONTROL),
    ];

    fn from_id(id: OperationId) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(_, sig)| OperationId::from_signature(sig) == id)
            .map(|(op, _)| *op)
    }
}

/// Role registry operations and their one-time initializer.
#[derive(Clone, Debug, Default)]
pub struct AccessControlFacet;

impl AccessControlFacet {
    /// Creates the facet.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Interface id of the role operations (initializer excluded).
    #[must_use]
    pub fn interface_id() -> InterfaceId {
        InterfaceId::from_operations(&[
            OperationId::from_signature(signatures::HAS_ROLE),
            OperationId::from_signature(signatures::GRANT_ROLE),
            OperationId::from_signature(signatures::REVOKE_ROLE),
            OperationId::from_signature(signatures::RENOUNCE_ROLE),
        ])
    }

    fn init(ctx: &mut CallContext<'_>, grants: Vec<(RoleId, Address)>) -> Result<(), RuntimeError> {
        ctx.advance_phase(namespaces::access_control(), 0)?;
        ctx.enforce_is_admin()?;
        let sender = ctx.msg_sender();
        for (role, account) in grants {
            let granted = authorization::insert_role(ctx.storage_mut(), sender, role, account)?;
            if let Some(event) = granted {
                ctx.emit(event);
            }
        }
        ctx.set_supported_interface(Self::interface_id(), true)
    }
}

impl Facet for AccessControlFacet {
    fn name(&self) -> &str {
        "access-control"
    }

    fn operations(&self) -> Vec<OperationId> {
        Op::ALL
            .iter()
            .map(|(_, sig)| OperationId::from_signature(sig))
            .collect()
    }

    fn execute(
        &self,
        ctx: &mut CallContext<'_>,
        operation: OperationId,
        args: &[u8],
    ) -> Result<Bytes, RuntimeError> {
        let op = Op::from_id(operation).ok_or(RuntimeError::UnknownOperation(operation))?;
        let caller = ctx.msg_sender();
        debug!(?op, caller = %caller, "Access-control operation");

        match op {
            Op::HasRole => {
                let (role, account): (RoleId, Address) = decode_args(args)?;
                encode_return(&authorization::has_role(ctx.storage(), role, account)?)
            }
            Op::GrantRole => {
                let (role, account): (RoleId, Address) = decode_args(args)?;
                let changed = authorization::grant_role(ctx.storage_mut(), caller, role, account)?;
                if let Some(event) = changed {
                    ctx.emit(event);
                }
                encode_return(&())
            }
            Op::RevokeRole => {
                let (role, account): (RoleId, Address) = decode_args(args)?;
                let changed = authorization::revoke_role(ctx.storage_mut(), caller, role, account)?;
                if let Some(event) = changed {
                    ctx.emit(event);
                }
                encode_return(&())
            }
            Op::RenounceRole => {
                let role: RoleId = decode_args(args)?;
                let dropped = authorization::renounce_role(ctx.storage_mut(), caller, role)?;
                if let Some(event) = dropped {
                    ctx.emit(event);
                }
                encode_return(&())
            }
            Op::Init => {
                let grants: Vec<(RoleId, Address)> = decode_args(args)?;
                Self::init(ctx, grants)?;
                encode_return(&())
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
