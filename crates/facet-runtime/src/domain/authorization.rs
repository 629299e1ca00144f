//! # Authorization Primitives
//!
//! Three independent capabilities, each stored in its own namespace:
//!
//! | Capability | Governs | Changed by |
//! |------------|---------|------------|
//! | admin | composition (cuts) | `change_admin`, admin only |
//! | owner | business operations | `transfer_ownership`, owner only |
//! | roles | fine-grained permissions | `grant_role` / `revoke_role`, owner only |
//!
//! Every function takes the logical caller explicitly. Callers pass the
//! identity produced by the resolver, never the physical sender.

use crate::domain::entities::RuntimeEvent;
use crate::domain::storage::{namespaces, Storage};
use crate::domain::value_objects::{Address, RoleId};
use crate::errors::RuntimeError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

// =============================================================================
// LAYOUTS
// =============================================================================

/// Admin region layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSlot {
    /// Current admin; zero means no holder.
    pub admin: Address,
}

/// Ownership region layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipSlot {
    /// Current owner; zero means no holder.
    pub owner: Address,
}

/// Access-control region layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    roles: BTreeMap<RoleId, BTreeSet<Address>>,
}

impl RoleRegistry {
    /// Returns true if `account` holds `role`.
    #[must_use]
    pub fn contains(&self, role: RoleId, account: Address) -> bool {
        self.roles
            .get(&role)
            .is_some_and(|holders| holders.contains(&account))
    }

    /// Adds a holder. Returns false if already held.
    pub fn insert(&mut self, role: RoleId, account: Address) -> bool {
        self.roles.entry(role).or_default().insert(account)
    }

    /// Removes a holder. Returns false if not held.
    pub fn remove(&mut self, role: RoleId, account: Address) -> bool {
        let Some(holders) = self.roles.get_mut(&role) else {
            return false;
        };
        let removed = holders.remove(&account);
        if holders.is_empty() {
            self.roles.remove(&role);
        }
        removed
    }

    /// Holders of a role.
    #[must_use]
    pub fn holders(&self, role: RoleId) -> Vec<Address> {
        self.roles
            .get(&role)
            .map(|h| h.iter().copied().collect())
            .unwrap_or_default()
    }
}

// =============================================================================
// ADMIN
// =============================================================================

/// Current admin (zero if none).
///
/// # Errors
///
/// Storage decode failure.
pub fn current_admin(storage: &Storage) -> Result<Address, RuntimeError> {
    Ok(storage.load::<AdminSlot>(namespaces::admin())?.admin)
}

/// Fails with `NotAdmin` unless `caller` is the admin.
///
/// The zero address never holds the capability.
///
/// # Errors
///
/// `NotAdmin`, or storage decode failure.
pub fn enforce_is_admin(storage: &Storage, caller: Address) -> Result<(), RuntimeError> {
    let admin = current_admin(storage)?;
    if admin.is_zero() || admin != caller {
        return Err(RuntimeError::NotAdmin { caller });
    }
    Ok(())
}

/// Writes the admin slot without authorization. Construction only.
pub(crate) fn init_admin(
    storage: &mut Storage,
    admin: Address,
) -> Result<RuntimeEvent, RuntimeError> {
    let previous = current_admin(storage)?;
    storage.store(namespaces::admin(), &AdminSlot { admin })?;
    Ok(RuntimeEvent::AdminChanged {
        previous,
        new: admin,
    })
}

/// Hands the admin capability to `new`.
///
/// Setting the current value again is allowed and still notifies.
///
/// # Errors
///
/// `NotAdmin` if `caller` is not the admin.
pub fn change_admin(
    storage: &mut Storage,
    caller: Address,
    new: Address,
) -> Result<RuntimeEvent, RuntimeError> {
    enforce_is_admin(storage, caller)?;
    info!(previous = %caller, new = %new, "Admin changed");
    init_admin(storage, new)
}

// =============================================================================
// OWNER
// =============================================================================

/// Current owner (zero if none).
///
/// # Errors
///
/// Storage decode failure.
pub fn current_owner(storage: &Storage) -> Result<Address, RuntimeError> {
    Ok(storage.load::<OwnershipSlot>(namespaces::ownership())?.owner)
}

/// Fails with `NotOwner` unless `caller` is the owner; succeeds silently.
///
/// # Errors
///
/// `NotOwner`, or storage decode failure.
pub fn enforce_is_owner(storage: &Storage, caller: Address) -> Result<(), RuntimeError> {
    let owner = current_owner(storage)?;
    if owner.is_zero() || owner != caller {
        return Err(RuntimeError::NotOwner { caller });
    }
    Ok(())
}

/// Writes the owner slot without authorization. Construction only.
pub(crate) fn init_owner(
    storage: &mut Storage,
    owner: Address,
) -> Result<RuntimeEvent, RuntimeError> {
    let previous = current_owner(storage)?;
    storage.store(namespaces::ownership(), &OwnershipSlot { owner })?;
    Ok(RuntimeEvent::OwnershipTransferred {
        previous,
        new: owner,
    })
}

/// Hands the owner capability to `new`. Zero renounces it.
///
/// # Errors
///
/// `NotOwner` if `caller` is not the owner.
pub fn transfer_ownership(
    storage: &mut Storage,
    caller: Address,
    new: Address,
) -> Result<RuntimeEvent, RuntimeError> {
    enforce_is_owner(storage, caller)?;
    info!(previous = %caller, new = %new, "Ownership transferred");
    init_owner(storage, new)
}

// =============================================================================
// ROLES
// =============================================================================

/// Returns true if `account` holds `role`.
///
/// # Errors
///
/// Storage decode failure.
pub fn has_role(storage: &Storage, role: RoleId, account: Address) -> Result<bool, RuntimeError> {
    Ok(storage
        .load::<RoleRegistry>(namespaces::access_control())?
        .contains(role, account))
}

/// Fails with `MissingRole` unless `account` holds `role`.
///
/// # Errors
///
/// `MissingRole`, or storage decode failure.
pub fn enforce_has_role(
    storage: &Storage,
    role: RoleId,
    account: Address,
) -> Result<(), RuntimeError> {
    if has_role(storage, role, account)? {
        Ok(())
    } else {
        Err(RuntimeError::MissingRole { role, account })
    }
}

/// Adds `account` to `role` without authorization.
///
/// Used by initializers that already passed the phase guard.
pub(crate) fn insert_role(
    storage: &mut Storage,
    sender: Address,
    role: RoleId,
    account: Address,
) -> Result<Option<RuntimeEvent>, RuntimeError> {
    let ns = namespaces::access_control();
    let mut registry: RoleRegistry = storage.load(ns)?;
    if !registry.insert(role, account) {
        return Ok(None);
    }
    storage.store(ns, &registry)?;
    info!(%role, account = %account, sender = %sender, "Role granted");
    Ok(Some(RuntimeEvent::RoleGranted {
        role,
        account,
        sender,
    }))
}

fn delete_role(
    storage: &mut Storage,
    sender: Address,
    role: RoleId,
    account: Address,
) -> Result<Option<RuntimeEvent>, RuntimeError> {
    let ns = namespaces::access_control();
    let mut registry: RoleRegistry = storage.load(ns)?;
    if !registry.remove(role, account) {
        return Ok(None);
    }
    storage.store(ns, &registry)?;
    info!(%role, account = %account, sender = %sender, "Role revoked");
    Ok(Some(RuntimeEvent::RoleRevoked {
        role,
        account,
        sender,
    }))
}

/// Grants `role` to `account`. Owner only.
///
/// Returns `None` (no state change, no notification) if already held.
///
/// # Errors
///
/// `NotOwner` if `caller` is not the owner.
pub fn grant_role(
    storage: &mut Storage,
    caller: Address,
    role: RoleId,
    account: Address,
) -> Result<Option<RuntimeEvent>, RuntimeError> {
    enforce_is_owner(storage, caller)?;
    insert_role(storage, caller, role, account)
}

/// Revokes `role` from `account`. Owner only.
///
/// Returns `None` if the role was not held.
///
/// # Errors
///
/// `NotOwner` if `caller` is not the owner.
pub fn revoke_role(
    storage: &mut Storage,
    caller: Address,
    role: RoleId,
    account: Address,
) -> Result<Option<RuntimeEvent>, RuntimeError> {
    enforce_is_owner(storage, caller)?;
    delete_role(storage, caller, role, account)
}

/// Drops `role` from the caller itself. Needs no capability.
///
/// # Errors
///
/// Storage decode failure.
pub fn renounce_role(
    storage: &mut Storage,
    caller: Address,
    role: RoleId,
) -> Result<Option<RuntimeEvent>, RuntimeError> {
    delete_role(storage, caller, role, caller)
}

// =============================================================================
// TESTS
// =============================================================================
