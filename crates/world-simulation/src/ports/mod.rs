//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions at the edges of the world simulation.
//!
//! - **Driving Ports (Inbound)**: `WorldSimulationApi`
//! - **Driven Ports (Outbound)**: `FheCoprocessor`, `AuditPublisher`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
