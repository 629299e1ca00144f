//! # Error Types
//!
//! All error types for composition, dispatch and authorization.
//!
//! Every failure is terminal for the current top-level call: the runtime
//! discards all state written during that call before surfacing the error.

use crate::domain::storage::Namespace;
use crate::domain::value_objects::{Address, Bytes, OperationId, RoleId};
use thiserror::Error;

// =============================================================================
// RUNTIME ERRORS
// =============================================================================

/// Failure reason of a call into the runtime.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    // --- authorization -------------------------------------------------------
    /// Caller does not hold the admin capability.
    #[error("caller {caller:?} is not the admin")]
    NotAdmin { caller: Address },

    /// Caller does not hold the owner capability.
    #[error("caller {caller:?} is not the owner")]
    NotOwner { caller: Address },

    /// Account does not hold the required role.
    #[error("account {account:?} is missing role {role}")]
    MissingRole { role: RoleId, account: Address },

    // --- composition / dispatch integrity ------------------------------------
    /// Add of an operation that is already routed.
    #[error("operation {operation} already mapped to {module:?}")]
    OperationAlreadyMapped {
        operation: OperationId,
        module: Address,
    },

    /// Replace or Remove of an operation that is not routed.
    #[error("operation {0} is not mapped")]
    OperationNotMapped(OperationId),

    /// Replace that targets the module already serving the operation.
    #[error("operation {operation} already served by {module:?}")]
    NoOpReplace {
        operation: OperationId,
        module: Address,
    },

    /// Remove record whose module field is not the sentinel.
    #[error("remove record must use the zero module, got {module:?}")]
    RemoveModuleMismatch { module: Address },

    /// No module serves the operation.
    #[error("unknown operation {0}")]
    UnknownOperation(OperationId),

    /// Cut record with no operation ids.
    #[error("cut record for {module:?} has no operations")]
    EmptyOperationList { module: Address },

    /// Add or Replace naming the sentinel module.
    #[error("add/replace record names the zero module")]
    ZeroModule,

    /// Module address has no code on the host.
    #[error("no module deployed at {0:?}")]
    ModuleNotDeployed(Address),

    /// Init target and init calldata must be both present or both absent.
    #[error("invalid init: {0}")]
    InvalidInit(String),

    // --- lifecycle -------------------------------------------------------------
    /// Phase counter did not match the expected phase.
    #[error("phase already reached for {namespace:?}: expected {expected}, stored {current}")]
    PhaseAlreadyReached {
        namespace: Namespace,
        expected: u64,
        current: u64,
    },

    // --- execution -------------------------------------------------------------
    /// Calldata shorter than an operation id.
    #[error("malformed calldata: {len} bytes")]
    MalformedCalldata { len: usize },

    /// Arguments or return data could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Nested self-calls exceeded the configured depth.
    #[error("call depth exceeded: {depth} > {max}")]
    CallDepthExceeded { depth: u16, max: u16 },

    /// Storage region access failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Module-defined failure; reason bytes are propagated unchanged.
    #[error("revert: {0:?}")]
    Revert(Bytes),
}

impl RuntimeError {
    /// Stable, machine-readable reason code (the variant name).
    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::NotAdmin { .. } => "NotAdmin",
            Self::NotOwner { .. } => "NotOwner",
            Self::MissingRole { .. } => "MissingRole",
            Self::OperationAlreadyMapped { .. } => "OperationAlreadyMapped",
            Self::OperationNotMapped(_) => "OperationNotMapped",
            Self::NoOpReplace { .. } => "NoOpReplace",
            Self::RemoveModuleMismatch { .. } => "RemoveModuleMismatch",
            Self::UnknownOperation(_) => "UnknownOperation",
            Self::EmptyOperationList { .. } => "EmptyOperationList",
            Self::ZeroModule => "ZeroModule",
            Self::ModuleNotDeployed(_) => "ModuleNotDeployed",
            Self::InvalidInit(_) => "InvalidInit",
            Self::PhaseAlreadyReached { .. } => "PhaseAlreadyReached",
            Self::MalformedCalldata { .. } => "MalformedCalldata",
            Self::Decode(_) => "Decode",
            Self::CallDepthExceeded { .. } => "CallDepthExceeded",
            Self::Storage(_) => "Storage",
            Self::Revert(_) => "Revert",
        }
    }

    /// Returns true if the caller lacked a capability.
    #[must_use]
    pub fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            Self::NotAdmin { .. } | Self::NotOwner { .. } | Self::MissingRole { .. }
        )
    }

    /// Returns true if the failure concerns routing table integrity
    /// (malformed cut or operation not composed).
    #[must_use]
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::OperationAlreadyMapped { .. }
                | Self::OperationNotMapped(_)
                | Self::NoOpReplace { .. }
                | Self::RemoveModuleMismatch { .. }
                | Self::UnknownOperation(_)
                | Self::EmptyOperationList { .. }
                | Self::ZeroModule
                | Self::ModuleNotDeployed(_)
                | Self::InvalidInit(_)
        )
    }

    /// Shorthand for a module-defined revert with a UTF-8 reason.
    #[must_use]
    pub fn revert(reason: &str) -> Self {
        Self::Revert(Bytes::from_slice(reason.as_bytes()))
    }
}

impl From<bincode::Error> for RuntimeError {
    fn from(err: bincode::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

// =============================================================================
// STORAGE ERRORS
// =============================================================================

/// Errors from typed storage region access.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Region body could not be decoded as the requested layout.
    #[error("corrupt region {namespace:?}: {reason}")]
    Corrupted { namespace: Namespace, reason: String },

    /// Layout could not be encoded.
    #[error("encode failed for {namespace:?}: {reason}")]
    Encode { namespace: Namespace, reason: String },
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },

    /// TOML parsing error.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Address field is not 20 hex-encoded bytes.
    #[error("invalid address for {field}: {value}")]
    InvalidAddress { field: String, value: String },
}

// =============================================================================
// TESTS
// =============================================================================
