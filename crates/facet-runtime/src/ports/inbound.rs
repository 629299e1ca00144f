//! # Driving Ports (API - Inbound)
//!
//! The interface through which callers reach a composed runtime.

use crate::domain::entities::LogEntry;
use crate::domain::routing::{FacetCut, InitCall};
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::RuntimeError;
use async_trait::async_trait;

/// Primary API of a composed runtime.
///
/// ## Usage
///
/// ```ignore
/// let output = api.call(caller, calldata).await?;
/// ```
#[async_trait]
pub trait RuntimeApi: Send + Sync {
    /// Executes one top-level call from `caller` (the physical sender).
    ///
    /// All state changes commit together on success; on failure nothing
    /// commits and the reason is returned.
    async fn call(&self, caller: Address, calldata: Bytes) -> Result<Bytes, RuntimeError>;

    /// Executes a call against a scratch copy of state. Never commits.
    async fn view(&self, caller: Address, calldata: Bytes) -> Result<Bytes, RuntimeError>;

    /// Encodes and submits a cut.
    async fn cut(
        &self,
        caller: Address,
        records: Vec<FacetCut>,
        init: Option<InitCall>,
    ) -> Result<(), RuntimeError>;

    /// Committed notifications, oldest first.
    async fn logs(&self) -> Vec<LogEntry>;
}
