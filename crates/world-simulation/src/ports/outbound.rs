//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the world simulation depends on:
//! - The FHE coprocessor (proof verification and homomorphic arithmetic)
//! - The audit publisher (event log persistence and fan-out)
//!
//! Adapters in `crate::adapters` provide in-memory implementations; a
//! deployment substitutes a real coprocessor client and log sink.

use crate::domain::value_objects::{Address, CiphertextHandle, InputProof};
use crate::errors::CoprocessorError;
use crate::events::AuditRecord;
use async_trait::async_trait;

// =============================================================================
// FHE COPROCESSOR
// =============================================================================

/// Identities an input proof must be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofBinding {
    /// The contract the inputs were encrypted for.
    pub contract: Address,
    /// The identity that encrypted the inputs.
    pub user: Address,
}

/// Homomorphic arithmetic over encrypted u32 values.
///
/// Calls are synchronous: each either returns a result or fails, with no
/// suspension in between. Arithmetic wraps modulo 2^32. The uninitialized
/// handle is an encryption of zero.
pub trait FheCoprocessor: Send + Sync {
    /// Verifies `proof` over `handles` for `binding` and returns the handles
    /// usable in arithmetic, in input order.
    ///
    /// # Errors
    ///
    /// `ProofRejected` if the proof does not bind these handles to
    /// `binding.user` and `binding.contract`.
    fn verify_inputs(
        &self,
        handles: &[CiphertextHandle],
        proof: &InputProof,
        binding: ProofBinding,
    ) -> Result<Vec<CiphertextHandle>, CoprocessorError>;

    /// Encrypted `lhs + rhs`.
    fn add(
        &self,
        lhs: CiphertextHandle,
        rhs: CiphertextHandle,
    ) -> Result<CiphertextHandle, CoprocessorError>;

    /// Encrypted `lhs + scalar`.
    fn add_scalar(
        &self,
        lhs: CiphertextHandle,
        scalar: u32,
    ) -> Result<CiphertextHandle, CoprocessorError>;

    /// Grants `grantee` permission to use and decrypt `handle`.
    fn allow(&self, handle: CiphertextHandle, grantee: Address) -> Result<(), CoprocessorError>;

    /// Verifies a single delta and adds it onto `current`.
    fn verify_and_add(
        &self,
        current: CiphertextHandle,
        delta: CiphertextHandle,
        proof: &InputProof,
        binding: ProofBinding,
    ) -> Result<CiphertextHandle, CoprocessorError> {
        let verified = self.verify_inputs(&[delta], proof, binding)?;
        let delta = verified
            .first()
            .copied()
            .ok_or_else(|| CoprocessorError::ProofRejected("no verified handle".into()))?;
        self.add(current, delta)
    }
}

// =============================================================================
// AUDIT PUBLISHER
// =============================================================================

/// Persists audit records and fans them out to observers.
#[async_trait]
pub trait AuditPublisher: Send + Sync {
    /// Appends a record and notifies subscribers.
    ///
    /// Returns the number of live subscribers that received it. The record's
    /// `sequence` is assigned by the publisher.
    async fn publish(&self, record: AuditRecord) -> usize;

    /// Total records ever published.
    fn events_published(&self) -> u64;
}

// =============================================================================
// TESTS
// =============================================================================
