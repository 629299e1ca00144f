//! # Authorization Facets
//!
//! Modules that expose the owner capability and the role registry through
//! dispatch. Compose them into a runtime with a cut like any other module.

pub mod access_control;
pub mod ownership;

pub use access_control::AccessControlFacet;
pub use ownership::OwnershipFacet;
