//! # Driving Ports (API - Inbound)
//!
//! The operations a hosting ledger exposes for a deployed world simulation.
//! Mutating calls carry the authenticated [`CallContext`]. Reads take no
//! caller and are never gated.

use crate::domain::entities::{AdminOutcome, DecisionOutcome, EncryptedDecision, WorldState};
use crate::domain::value_objects::{Address, CallContext, CiphertextHandle};
use crate::errors::WorldSimError;
use async_trait::async_trait;

// =============================================================================
// WORLD SIMULATION API (Primary Driving Port)
// =============================================================================

/// Primary API of the world simulation.
///
/// ## Usage
///
/// ```ignore
/// api.set_authorized(&CallContext::now(owner), player, true).await?;
/// let outcome = api
///     .apply_encrypted_decision(&CallContext::now(player), decision)
///     .await?;
/// assert_eq!(outcome.new_count, 1);
/// ```
#[async_trait]
pub trait WorldSimulationApi: Send + Sync {
    /// Sets one registry row. Owner only.
    ///
    /// # Errors
    ///
    /// `InvalidIdentity` for the null identity, `AccessDenied` for non-owners.
    async fn set_authorized(
        &self,
        ctx: &CallContext,
        identity: Address,
        permitted: bool,
    ) -> Result<AdminOutcome, WorldSimError>;

    /// Sets up to 50 registry rows atomically. Owner only.
    ///
    /// # Errors
    ///
    /// `AccessDenied`, `LengthMismatch`, or `BatchTooLarge`.
    async fn batch_set_authorized(
        &self,
        ctx: &CallContext,
        identities: &[Address],
        statuses: &[bool],
    ) -> Result<AdminOutcome, WorldSimError>;

    /// Sets the pause flag. Owner only.
    ///
    /// # Errors
    ///
    /// `AccessDenied` for non-owners.
    async fn set_paused(&self, ctx: &CallContext, paused: bool)
        -> Result<AdminOutcome, WorldSimError>;

    /// Adds four encrypted deltas into the world state and counts the decision.
    ///
    /// # Errors
    ///
    /// `ContractPaused`, `NotAuthorized`, or `InvalidProof`, checked in that order.
    async fn apply_encrypted_decision(
        &self,
        ctx: &CallContext,
        decision: EncryptedDecision,
    ) -> Result<DecisionOutcome, WorldSimError>;

    /// The four KPI handles.
    async fn get_world_state(&self) -> WorldState;

    /// The encrypted decision counter.
    async fn get_decisions_count(&self) -> CiphertextHandle;

    /// Owner or registry row set to `true`.
    async fn is_authorized(&self, identity: Address) -> bool;

    /// Raw registry row.
    async fn authorized_entry(&self, identity: Address) -> bool;

    /// Pause flag.
    async fn paused(&self) -> bool;

    /// Contract owner.
    async fn owner(&self) -> Address;
}
