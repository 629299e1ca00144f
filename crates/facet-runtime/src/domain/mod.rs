//! # Domain Layer (Inner Hexagon)
//!
//! Pure rules of the composition runtime.
//! NO I/O, NO async, NO knowledge of how modules are hosted.
//!
//! - Dependencies point INWARD only (runtime and adapters depend on this).
//! - Functions take storage and the logical caller explicitly.

pub mod abi;
pub mod authorization;
pub mod entities;
pub mod invariants;
pub mod phase;
pub mod resolver;
pub mod routing;
pub mod storage;
pub mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use routing::*;
pub use storage::{namespaces, Namespace, Storage};
pub use value_objects::*;
