//! # In-Memory Module Host
//!
//! Address → code map standing in for the host environment. Modules are
//! deployed once and never change; `destroy` exists so tests can simulate
//! code disappearing from under a route.

use crate::domain::value_objects::{keccak256, Address};
use crate::ports::outbound::{Facet, ModuleHost};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Address of the `nonce`-th module deployed by `deployer`.
///
/// The last 20 bytes of `keccak256(deployer ++ nonce_be)`.
#[must_use]
pub fn compute_module_address(deployer: Address, nonce: u64) -> Address {
    let mut preimage = Vec::with_capacity(Address::LEN + 8);
    preimage.extend_from_slice(deployer.as_bytes());
    preimage.extend_from_slice(&nonce.to_be_bytes());
    let hash = keccak256(&preimage);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.0[12..]);
    Address::new(addr)
}

/// In-memory module host.
#[derive(Default)]
pub struct InMemoryModuleHost {
    modules: RwLock<HashMap<Address, Arc<dyn Facet>>>,
    nonces: RwLock<HashMap<Address, u64>>,
}

impl InMemoryModuleHost {
    /// Create an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploys `facet` at the next address derived from `deployer`.
    pub fn deploy(&self, deployer: Address, facet: Arc<dyn Facet>) -> Address {
        let nonce = {
            let mut nonces = self.nonces.write();
            let slot = nonces.entry(deployer).or_insert(0);
            let current = *slot;
            *slot += 1;
            current
        };
        let address = compute_module_address(deployer, nonce);
        debug!(module = %address, facet = facet.name(), nonce, "Module deployed");
        self.modules.write().insert(address, facet);
        address
    }

    /// Places `facet` at a fixed address, replacing any code there.
    pub fn install(&self, address: Address, facet: Arc<dyn Facet>) {
        self.modules.write().insert(address, facet);
    }

    /// Removes the code at `address`. Returns true if there was any.
    pub fn destroy(&self, address: Address) -> bool {
        self.modules.write().remove(&address).is_some()
    }

    /// Number of deployed modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    /// Returns true if nothing is deployed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }
}

impl ModuleHost for InMemoryModuleHost {
    fn module(&self, address: Address) -> Option<Arc<dyn Facet>> {
        self.modules.read().get(&address).cloned()
    }
}

impl std::fmt::Debug for InMemoryModuleHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryModuleHost")
            .field("modules", &self.len())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
