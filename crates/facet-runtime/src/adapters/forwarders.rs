//! # Trusted Forwarder Registry Adapter

use crate::domain::value_objects::Address;
use crate::ports::outbound::TrustedForwarderRegistry;
use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::info;

/// In-memory forwarder registry.
#[derive(Debug, Default)]
pub struct InMemoryForwarderRegistry {
    forwarders: RwLock<HashSet<Address>>,
}

impl InMemoryForwarderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with an initial set of forwarders. Zero addresses are skipped.
    #[must_use]
    pub fn with_forwarders(forwarders: impl IntoIterator<Item = Address>) -> Self {
        let registry = Self::new();
        for forwarder in forwarders {
            registry.register(forwarder);
        }
        registry
    }

    /// Registers a forwarder. Returns false if zero or already present.
    pub fn register(&self, forwarder: Address) -> bool {
        if forwarder.is_zero() {
            return false;
        }
        let added = self.forwarders.write().insert(forwarder);
        if added {
            info!(forwarder = %forwarder, "Trusted forwarder registered");
        }
        added
    }

    /// Unregisters a forwarder. Returns true if it was present.
    pub fn unregister(&self, forwarder: Address) -> bool {
        self.forwarders.write().remove(&forwarder)
    }
}

impl TrustedForwarderRegistry for InMemoryForwarderRegistry {
    fn is_trusted_forwarder(&self, address: Address) -> bool {
        self.forwarders.read().contains(&address)
    }
}
