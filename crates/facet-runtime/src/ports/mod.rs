//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions at the edges of the runtime.
//!
//! - **Driving Ports (Inbound)**: `RuntimeApi`
//! - **Driven Ports (Outbound)**: `Facet`, `ModuleHost`, `TrustedForwarderRegistry`, `ConfigProvider`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
