//! # Request and Response Payloads
//!
//! Messages exchanged with a [`RuntimeService`](crate::service::RuntimeService).
//! Every request/response pair shares a `correlation_id`.
//!
//! The physical caller is carried in the request; the logical caller is
//! never taken from the payload but resolved from the calldata tag, and
//! only for trusted forwarders.

use crate::domain::entities::LogEntry;
use crate::domain::value_objects::{Address, Bytes};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// INBOUND
// =============================================================================

/// Request to execute one top-level call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallRequestPayload {
    /// Physical caller.
    pub caller: Address,
    /// Operation id followed by encoded arguments (and, for forwarded
    /// calls, the sender tag).
    pub calldata: Bytes,
    /// Execute without committing.
    #[serde(default)]
    pub read_only: bool,
}

// =============================================================================
// OUTBOUND
// =============================================================================

/// Outcome of a call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallResponsePayload {
    /// Correlates with the request.
    pub correlation_id: Uuid,
    /// Whether the call committed (or, if read-only, would have).
    pub success: bool,
    /// Return data; empty on failure.
    pub output: Bytes,
    /// Notifications committed by this call.
    pub logs: Vec<LogEntry>,
    /// Stable failure code (see `RuntimeError::reason_code`).
    pub reason_code: Option<String>,
    /// Human-readable failure reason.
    pub revert_reason: Option<String>,
}

impl CallResponsePayload {
    /// Successful response.
    #[must_use]
    pub fn success(correlation_id: Uuid, output: Bytes, logs: Vec<LogEntry>) -> Self {
        Self {
            correlation_id,
            success: true,
            output,
            logs,
            reason_code: None,
            revert_reason: None,
        }
    }

    /// Failed response.
    #[must_use]
    pub fn failure(correlation_id: Uuid, reason_code: &str, reason: String) -> Self {
        Self {
            correlation_id,
            success: false,
            output: Bytes::new(),
            logs: Vec::new(),
            reason_code: Some(reason_code.to_string()),
            revert_reason: Some(reason),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
