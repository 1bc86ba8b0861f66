//! # Integration Tests
//!
//! Every test drives the public API of `world-simulation` with its in-memory
//! adapters, or with small test doubles implementing the outbound ports.

pub mod access_control;
pub mod decision_flow;
pub mod telemetry;
