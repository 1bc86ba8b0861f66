//! # Domain Layer (Inner Hexagon)
//!
//! Pure state machine for the encrypted world simulation.
//! NO I/O, NO async. Homomorphic arithmetic reaches the domain only through
//! the `FheCoprocessor` port passed into each operation.
//!
//! - Dependencies point INWARD only (adapters depend on this, not vice versa).

pub mod access_control;
pub mod contract;
pub mod entities;
pub mod invariants;
pub mod scenarios;
pub mod value_objects;

pub use access_control::*;
pub use contract::*;
pub use entities::*;
pub use invariants::*;
pub use scenarios::*;
pub use value_objects::*;
