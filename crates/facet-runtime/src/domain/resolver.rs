//! # Logical-Caller Resolver
//!
//! Works out who a call is really from. A trusted relay forwards a signed
//! request by appending the original sender's 20-byte address to the
//! calldata. Only calls from a registered forwarder have that tag honored;
//! for anyone else the physical caller is the logical caller and the
//! calldata passes through untouched.
//!
//! Resolution runs once per top-level call. Every authorization check and
//! notification in that call uses the resolved sender.

use crate::domain::entities::ResolvedCall;
use crate::domain::value_objects::{Address, Bytes};
use tracing::debug;

/// Width of the appended sender tag.
pub const SENDER_TAG_LEN: usize = Address::LEN;

/// Resolves the logical caller of a call.
#[must_use]
pub fn resolve_logical_caller(
    physical: Address,
    calldata: &[u8],
    is_trusted_forwarder: impl Fn(Address) -> bool,
) -> ResolvedCall {
    if calldata.len() >= SENDER_TAG_LEN && is_trusted_forwarder(physical) {
        let split = calldata.len() - SENDER_TAG_LEN;
        if let Some(sender) = Address::from_slice(&calldata[split..]) {
            debug!(forwarder = %physical, sender = %sender, "Forwarded call resolved");
            return ResolvedCall {
                sender,
                forwarder: Some(physical),
                calldata: Bytes::from_slice(&calldata[..split]),
            };
        }
    }

    ResolvedCall {
        sender: physical,
        forwarder: None,
        calldata: Bytes::from_slice(calldata),
    }
}

/// Appends a sender tag, as a forwarder does before relaying.
#[must_use]
pub fn append_sender_tag(calldata: &[u8], sender: Address) -> Bytes {
    let mut out = Vec::with_capacity(calldata.len() + SENDER_TAG_LEN);
    out.extend_from_slice(calldata);
    out.extend_from_slice(sender.as_bytes());
    Bytes::from(out)
}

// =============================================================================
// TESTS
// =============================================================================
