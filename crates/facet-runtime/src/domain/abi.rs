//! # Calldata Codec
//!
//! Calldata is the 4-byte operation id followed by the `bincode` encoding of
//! the operation's argument tuple. Return data is the `bincode` encoding of
//! the result value.

use crate::domain::routing::FacetCut;
use crate::domain::value_objects::{Address, Bytes, InterfaceId, OperationId};
use crate::errors::RuntimeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Encodes a call to `operation`.
///
/// # Errors
///
/// `Decode` if the arguments cannot be encoded.
pub fn encode_call<A: Serialize>(operation: OperationId, args: &A) -> Result<Bytes, RuntimeError> {
    let mut out = operation.as_bytes().to_vec();
    out.extend(bincode::serialize(args)?);
    Ok(Bytes::from(out))
}

/// Encodes a call by signature.
///
/// # Errors
///
/// `Decode` if the arguments cannot be encoded.
pub fn encode_signature_call<A: Serialize>(
    signature: &str,
    args: &A,
) -> Result<Bytes, RuntimeError> {
    encode_call(OperationId::from_signature(signature), args)
}

/// Splits calldata into operation id and encoded arguments.
///
/// # Errors
///
/// `MalformedCalldata` if shorter than an operation id.
pub fn split_calldata(calldata: &[u8]) -> Result<(OperationId, &[u8]), RuntimeError> {
    let operation = OperationId::from_calldata(calldata)
        .ok_or(RuntimeError::MalformedCalldata { len: calldata.len() })?;
    Ok((operation, &calldata[OperationId::LEN..]))
}

/// Decodes an argument tuple.
///
/// # Errors
///
/// `Decode` on malformed input.
pub fn decode_args<A: DeserializeOwned>(args: &[u8]) -> Result<A, RuntimeError> {
    Ok(bincode::deserialize(args)?)
}

/// Encodes a return value.
///
/// # Errors
///
/// `Decode` if the value cannot be encoded.
pub fn encode_return<R: Serialize>(value: &R) -> Result<Bytes, RuntimeError> {
    Ok(Bytes::from(bincode::serialize(value)?))
}

/// Decodes return data.
///
/// # Errors
///
/// `Decode` on malformed input.
pub fn decode_return<R: DeserializeOwned>(data: &[u8]) -> Result<R, RuntimeError> {
    Ok(bincode::deserialize(data)?)
}

// =============================================================================
// NATIVE OPERATION SIGNATURES
// =============================================================================

/// Canonical signatures of operations served by the runtime itself.
pub mod signatures {
    /// Apply a composition batch.
    pub const DIAMOND_CUT: &str = "diamondCut((address,uint8,bytes4[])[],address,bytes)";
    /// All modules with their operations.
    pub const FACETS: &str = "facets()";
    /// Operations served by one module.
    pub const FACET_FUNCTION_SELECTORS: &str = "facetFunctionSelectors(address)";
    /// All module addresses.
    pub const FACET_ADDRESSES: &str = "facetAddresses()";
    /// Module serving one operation.
    pub const FACET_ADDRESS: &str = "facetAddress(bytes4)";
    /// Interface detection.
    pub const SUPPORTS_INTERFACE: &str = "supportsInterface(bytes4)";
    /// Current admin.
    pub const ADMIN: &str = "admin()";
    /// Hand over the admin capability.
    pub const CHANGE_ADMIN: &str = "changeAdmin(address)";
    /// Forwarder membership check.
    pub const IS_TRUSTED_FORWARDER: &str = "isTrustedForwarder(address)";
}

/// Arguments of the cut operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiamondCutArgs {
    /// Records, applied in order.
    pub records: Vec<FacetCut>,
    /// Init target; zero for none.
    pub init: Address,
    /// Init calldata; empty for none.
    pub calldata: Bytes,
}

/// Interface ids registered at construction.
pub mod interfaces {
    use super::signatures;
    use crate::domain::value_objects::{InterfaceId, OperationId};

    /// Interface detection (`supportsInterface`).
    #[must_use]
    pub fn interface_detection() -> InterfaceId {
        InterfaceId::from_operations(&[OperationId::from_signature(signatures::SUPPORTS_INTERFACE)])
    }

    /// Composition (`diamondCut`).
    #[must_use]
    pub fn diamond_cut() -> InterfaceId {
        InterfaceId::from_operations(&[OperationId::from_signature(signatures::DIAMOND_CUT)])
    }

    /// Introspection (the four loupe operations).
    #[must_use]
    pub fn diamond_loupe() -> InterfaceId {
        InterfaceId::from_operations(&[
            OperationId::from_signature(signatures::FACETS),
            OperationId::from_signature(signatures::FACET_FUNCTION_SELECTORS),
            OperationId::from_signature(signatures::FACET_ADDRESSES),
            OperationId::from_signature(signatures::FACET_ADDRESS),
        ])
    }
}

/// Supported-interface registry layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRegistry {
    supported: std::collections::BTreeSet<InterfaceId>,
}

impl InterfaceRegistry {
    /// Returns true if the interface is registered.
    #[must_use]
    pub fn supports(&self, id: InterfaceId) -> bool {
        self.supported.contains(&id)
    }

    /// Registers or unregisters an interface.
    pub fn set(&mut self, id: InterfaceId, supported: bool) {
        if supported {
            self.supported.insert(id);
        } else {
            self.supported.remove(&id);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
