//! # Runtime Engine
//!
//! Executes calls against a composed runtime.
//!
//! - `diamond`: top-level call, commit or discard
//! - `executor`: frame dispatch, depth limit, checkpoints
//! - `context`: what module code sees
//! - `native`: operations served by the runtime itself
//! - `cut`: the composition executor

pub mod context;
mod cut;
pub mod diamond;
pub(crate) mod executor;
pub mod native;

pub use context::CallContext;
pub use diamond::Diamond;
pub use native::{is_native, NativeOperation};
