//! # World Simulation - Encrypted Decision Aggregation
//!
//! A ledger-resident state machine that accumulates homomorphically
//! encrypted deltas into four encrypted world KPIs and an encrypted decision
//! counter. Access control and the emergency pause operate on cleartext
//! metadata only; KPI values stay opaque ciphertext handles manipulated
//! through an external FHE coprocessor.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Counters change only by homomorphic addition | `domain/contract.rs` - `apply_encrypted_decision()` |
//! | INVARIANT-2 | Submitter is owner or registered, contract not paused | `domain/invariants.rs` - `check_submission_allowed()` |
//! | INVARIANT-3 | Batch lengths equal and within `1..=50` | `domain/access_control.rs` - `stage_batch()` |
//! | INVARIANT-4 | Null identity never set individually | `domain/invariants.rs` - `check_identity_invariant()` |
//! | INVARIANT-5 | Decision count advances by exactly one | `domain/invariants.rs` - `check_decision_count_invariant()` |
//!
//! ## Entry Points
//!
//! | Operation | Access | Failures |
//! |-----------|--------|----------|
//! | `set_authorized` | Owner | `AccessDenied`, `InvalidIdentity` |
//! | `batch_set_authorized` | Owner | `AccessDenied`, `LengthMismatch`, `BatchTooLarge` |
//! | `set_paused` | Owner | `AccessDenied` |
//! | `apply_encrypted_decision` | Owner or authorized | `ContractPaused`, `NotAuthorized`, `InvalidProof` |
//! | `get_world_state`, `get_decisions_count`, `is_authorized`, `paused` | Any | none |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `FheCoprocessor` | Proof verification, homomorphic add, ACL grants |
//! | `AuditPublisher` | Event log persistence and fan-out |
//!
//! ## Usage Example
//!
//! ```ignore
//! use world_simulation::prelude::*;
//!
//! let service = create_test_service();
//! service.set_authorized(&CallContext::now(TEST_OWNER), player, true).await?;
//!
//! let decision = service
//!     .coprocessor()
//!     .encrypt_decision(TEST_CONTRACT_ADDRESS, player, [3, 5, 7, 2]);
//! let outcome = service
//!     .apply_encrypted_decision(&CallContext::now(player), decision)
//!     .await?;
//! assert_eq!(outcome.new_count, 1);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        AdminOutcome, DecisionOutcome, DecodedWorldState, EncryptedDecision, Kpi, StateSnapshot,
        WorldState,
    };

    // Value objects
    pub use crate::domain::value_objects::{Address, CallContext, CiphertextHandle, InputProof};

    // State machine
    pub use crate::domain::access_control::{AuthorizationRegistry, PauseSwitch, MAX_BATCH_SIZE};
    pub use crate::domain::contract::WorldSimulation;

    // Scenarios
    pub use crate::domain::scenarios::{
        builtin_scenarios, decode_signed, encode_signed, find_scenario, recommended_scenarios,
        DecisionOption, DecisionScenario, ScenarioCategory, SignedDeltas,
    };

    // Invariants
    pub use crate::domain::invariants::{
        check_counters_never_reset, check_decision_count_invariant, check_identity_invariant,
        check_submission_allowed, check_unchanged_on_failure,
    };

    // Ports
    pub use crate::ports::inbound::WorldSimulationApi;
    pub use crate::ports::outbound::{AuditPublisher, FheCoprocessor, ProofBinding};

    // Events
    pub use crate::events::{topics, AuditEvent, AuditRecord};

    // Errors
    pub use crate::errors::{CoprocessorError, WorldSimError};

    // Adapters
    pub use crate::adapters::{
        CoprocessorConfig, DecryptionRequest, EncryptedInput, InMemoryAuditLog,
        InMemoryCoprocessor,
    };

    // Service
    pub use crate::service::{
        create_test_service, ServiceConfig, ServiceStats, WorldSimulationService,
        TEST_CONTRACT_ADDRESS, TEST_OWNER,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component name.
pub const COMPONENT_NAME: &str = "World Simulation";

// =============================================================================
// TESTS
// =============================================================================
