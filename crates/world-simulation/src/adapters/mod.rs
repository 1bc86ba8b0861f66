//! # Adapters Layer (Outer Hexagon)
//!
//! In-memory implementations of the driven ports, plus the client-side
//! decryption helper.
//!
//! - Adapters implement domain ports
//! - A deployment swaps these for a real coprocessor client and log sink

pub mod audit_log;
pub mod coprocessor;
pub mod decryption;

pub use audit_log::*;
pub use coprocessor::*;
pub use decryption::*;
