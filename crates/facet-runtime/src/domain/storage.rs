//! # Storage Regions
//!
//! Every logical subsystem (routing, admin, ownership, access control, and any
//! module's own state) owns one region of the runtime's storage. Regions are
//! addressed by a [`Namespace`] derived from a stable identifier string, so
//! unrelated subsystems never alias the same persisted state.
//!
//! A region holds two things:
//! - the phase counter consulted by the phase guard
//! - a body: one typed layout struct, encoded with `bincode`
//!
//! Changing how namespaces are derived is a breaking storage migration.

use crate::domain::value_objects::{keccak256, Hash};
use crate::errors::StorageError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// NAMESPACE
// =============================================================================

/// Collision-free key of a storage region: `keccak256(id)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Namespace(Hash);

impl Namespace {
    /// Derives the namespace of a subsystem from its stable identifier.
    #[must_use]
    pub fn derive(id: &str) -> Self {
        Self(keccak256(id.as_bytes()))
    }

    /// Returns the derived key.
    #[must_use]
    pub const fn key(&self) -> &Hash {
        &self.0
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", self.0)
    }
}

/// Stable identifiers of the runtime's own regions.
pub mod namespaces {
    use super::Namespace;

    /// Routing table id.
    pub const ROUTING_ID: &str = "facet.runtime.routing.storage";
    /// Admin slot id.
    pub const ADMIN_ID: &str = "facet.runtime.admin.storage";
    /// Owner slot id.
    pub const OWNERSHIP_ID: &str = "facet.runtime.ownership.storage";
    /// Role registry id.
    pub const ACCESS_CONTROL_ID: &str = "facet.runtime.access-control.storage";
    /// Supported interface registry id.
    pub const INTERFACES_ID: &str = "facet.runtime.interfaces.storage";

    /// Routing table region.
    #[must_use]
    pub fn routing() -> Namespace {
        Namespace::derive(ROUTING_ID)
    }

    /// Admin slot region.
    #[must_use]
    pub fn admin() -> Namespace {
        Namespace::derive(ADMIN_ID)
    }

    /// Owner slot region.
    #[must_use]
    pub fn ownership() -> Namespace {
        Namespace::derive(OWNERSHIP_ID)
    }

    /// Role registry region.
    #[must_use]
    pub fn access_control() -> Namespace {
        Namespace::derive(ACCESS_CONTROL_ID)
    }

    /// Supported interface registry region.
    #[must_use]
    pub fn interfaces() -> Namespace {
        Namespace::derive(INTERFACES_ID)
    }
}

// =============================================================================
// REGION
// =============================================================================

/// One subsystem's persisted state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Region {
    /// Phase counter; never decremented.
    pub(crate) phase: u64,
    /// Encoded layout struct; empty until first write.
    pub(crate) body: Vec<u8>,
}

// =============================================================================
// STORAGE
// =============================================================================

/// The runtime's persistent key-addressed storage.
///
/// Cloning a `Storage` produces an independent snapshot; the executor uses
/// that to discard writes made by failing calls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Storage {
    regions: HashMap<Namespace, Region>,
}

impl Storage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the typed layout of a region, or its default if never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupted` if the body does not decode as `T`.
    pub fn load<T>(&self, namespace: Namespace) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        match self.regions.get(&namespace) {
            Some(region) if !region.body.is_empty() => bincode::deserialize(&region.body)
                .map_err(|e| StorageError::Corrupted {
                    namespace,
                    reason: e.to_string(),
                }),
            _ => Ok(T::default()),
        }
    }

    /// Writes the typed layout of a region.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Encode` if `value` cannot be encoded.
    pub fn store<T>(&mut self, namespace: Namespace, value: &T) -> Result<(), StorageError>
    where
        T: Serialize,
    {
        let body = bincode::serialize(value).map_err(|e| StorageError::Encode {
            namespace,
            reason: e.to_string(),
        })?;
        self.regions.entry(namespace).or_default().body = body;
        Ok(())
    }

    /// Returns the phase counter of a region (0 if never written).
    #[must_use]
    pub fn phase(&self, namespace: Namespace) -> u64 {
        self.regions.get(&namespace).map_or(0, |r| r.phase)
    }

    /// Overwrites the phase counter. Only the phase guard calls this.
    pub(crate) fn set_phase(&mut self, namespace: Namespace, phase: u64) {
        self.regions.entry(namespace).or_default().phase = phase;
    }

    /// Returns true if the region has ever been written.
    #[must_use]
    pub fn contains(&self, namespace: Namespace) -> bool {
        self.regions.contains_key(&namespace)
    }

    /// Number of regions written so far.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
