//! # Error Types
//!
//! All error types for the world simulation core.

use crate::domain::value_objects::{Address, CiphertextHandle};
use thiserror::Error;

// =============================================================================
// WORLD SIMULATION ERRORS
// =============================================================================

/// Reasons an operation against the world simulation is rejected.
///
/// Every variant aborts the whole operation; no state is mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldSimError {
    /// Caller lacks owner privilege for an owner-only operation.
    #[error("access denied: {caller} is not the owner")]
    AccessDenied {
        /// Rejected caller.
        caller: Address,
    },

    /// Caller is neither the owner nor an authorized submitter.
    #[error("not authorized: {caller} may not submit decisions")]
    NotAuthorized {
        /// Rejected caller.
        caller: Address,
    },

    /// A mutating decision was attempted while paused.
    #[error("contract paused")]
    ContractPaused,

    /// The null identity was supplied to a single-entry authorization change.
    #[error("invalid identity: the zero address cannot be authorized")]
    InvalidIdentity,

    /// Batch identity and status sequences differ in length.
    #[error("length mismatch: {identities} identities, {statuses} statuses")]
    LengthMismatch {
        /// Number of identities supplied.
        identities: usize,
        /// Number of statuses supplied.
        statuses: usize,
    },

    /// Batch is empty or larger than the allowed maximum.
    #[error("invalid batch size: {len} (allowed 1..={max})")]
    BatchTooLarge {
        /// Rows supplied.
        len: usize,
        /// Largest accepted batch.
        max: usize,
    },

    /// The coprocessor rejected the input proof.
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    /// The coprocessor failed while computing on verified handles.
    #[error("coprocessor error: {0}")]
    Coprocessor(#[from] CoprocessorError),

    /// A state invariant would have been broken by the staged commit.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl WorldSimError {
    /// The revert string the ledger reports for this failure.
    #[must_use]
    pub fn revert_reason(&self) -> &'static str {
        match self {
            Self::AccessDenied { .. } => "Only owner",
            Self::NotAuthorized { .. } => "Not authorized",
            Self::ContractPaused => "Contract paused",
            Self::InvalidIdentity => "Invalid user address",
            Self::LengthMismatch { .. } => "Array length mismatch",
            Self::BatchTooLarge { .. } => "Invalid batch size",
            Self::InvalidProof(_) => "Invalid proof",
            Self::Coprocessor(_) => "Coprocessor failure",
            Self::InvariantViolation(_) => "Invariant violation",
        }
    }

    /// Short machine label, used for metrics and structured logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::AccessDenied { .. } => "access_denied",
            Self::NotAuthorized { .. } => "not_authorized",
            Self::ContractPaused => "contract_paused",
            Self::InvalidIdentity => "invalid_identity",
            Self::LengthMismatch { .. } => "length_mismatch",
            Self::BatchTooLarge { .. } => "batch_too_large",
            Self::InvalidProof(_) => "invalid_proof",
            Self::Coprocessor(_) => "coprocessor",
            Self::InvariantViolation(_) => "invariant_violation",
        }
    }
}

// =============================================================================
// COPROCESSOR ERRORS
// =============================================================================

/// Errors reported by the FHE coprocessor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoprocessorError {
    /// Proof does not bind the handles to the caller and contract.
    #[error("proof rejected: {0}")]
    ProofRejected(String),

    /// Handle is not known to the coprocessor.
    #[error("unknown ciphertext handle: {0}")]
    UnknownHandle(CiphertextHandle),

    /// Requester has no decryption permission on the handle.
    #[error("{requester} is not allowed to decrypt {handle}")]
    AccessNotAllowed {
        /// Handle requested.
        handle: CiphertextHandle,
        /// Identity without a grant.
        requester: Address,
    },

    /// Coprocessor could not be reached.
    #[error("coprocessor unavailable")]
    Unavailable,
}

// =============================================================================
// TESTS
// =============================================================================
