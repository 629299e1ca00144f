//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the outbound ports.
//!
//! - `module_host`: in-memory address → module code map
//! - `forwarders`: in-memory trusted-forwarder registry
//! - `config`: static and TOML configuration providers

pub mod config;
pub mod forwarders;
pub mod module_host;

pub use config::*;
pub use forwarders::*;
pub use module_host::*;
