//! # World Simulation Contract
//!
//! The ledger-resident state machine: owner, authorization registry, pause
//! switch, four encrypted KPI counters, and the encrypted decision counter.
//!
//! Every mutating operation stages its full effect in locals and assigns
//! fields only after all preconditions and coprocessor calls succeed, so a
//! failed operation leaves the state exactly as it found it.

use crate::domain::access_control::{stage_batch, AuthorizationRegistry, PauseSwitch};
use crate::domain::entities::{
    AdminOutcome, DecisionOutcome, EncryptedDecision, Kpi, StateSnapshot, WorldState,
};
use crate::domain::invariants::{
    check_decision_count_invariant, check_identity_invariant, check_submission_allowed,
};
use crate::domain::value_objects::{Address, CallContext, CiphertextHandle};
use crate::errors::WorldSimError;
use crate::events::AuditEvent;
use crate::ports::outbound::{FheCoprocessor, ProofBinding};
use serde::{Deserialize, Serialize};

/// Contract instance state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSimulation {
    contract_address: Address,
    owner: Address,
    registry: AuthorizationRegistry,
    pause: PauseSwitch,
    world_state: WorldState,
    decisions_count: CiphertextHandle,
    /// Cleartext shadow of `decisions_count`, carried only in event payloads.
    /// Wraps modulo 2^32 together with the encrypted counter.
    decisions_applied: u32,
}

impl WorldSimulation {
    /// Deploys a fresh instance at `contract_address` owned by `owner`.
    ///
    /// Registry empty, not paused, all counters uninitialized.
    #[must_use]
    pub fn deploy(contract_address: Address, owner: Address) -> Self {
        Self {
            contract_address,
            owner,
            registry: AuthorizationRegistry::new(),
            pause: PauseSwitch::default(),
            world_state: WorldState::default(),
            decisions_count: CiphertextHandle::ZERO,
            decisions_applied: 0,
        }
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), WorldSimError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(WorldSimError::AccessDenied { caller })
        }
    }

    // =========================================================================
    // OWNER OPERATIONS
    // =========================================================================

    /// Sets one registry row.
    ///
    /// # Errors
    ///
    /// `InvalidIdentity` for the null identity (checked first, whoever calls),
    /// `AccessDenied` if the caller is not the owner.
    pub fn set_authorized(
        &mut self,
        ctx: &CallContext,
        identity: Address,
        permitted: bool,
    ) -> Result<AdminOutcome, WorldSimError> {
        if !check_identity_invariant(&identity) {
            return Err(WorldSimError::InvalidIdentity);
        }
        self.ensure_owner(ctx.caller)?;

        self.registry.set(identity, permitted);

        Ok(AdminOutcome {
            events: vec![AuditEvent::AuthorizationUpdated {
                identity,
                status: permitted,
            }],
        })
    }

    /// Sets up to `MAX_BATCH_SIZE` registry rows atomically, in input order.
    ///
    /// # Errors
    ///
    /// `AccessDenied`, then `LengthMismatch`, then `BatchTooLarge`.
    pub fn batch_set_authorized(
        &mut self,
        ctx: &CallContext,
        identities: &[Address],
        statuses: &[bool],
    ) -> Result<AdminOutcome, WorldSimError> {
        self.ensure_owner(ctx.caller)?;
        let rows = stage_batch(identities, statuses)?;

        self.registry.apply_batch(&rows);

        Ok(AdminOutcome {
            events: rows
                .into_iter()
                .map(|(identity, status)| AuditEvent::AuthorizationUpdated { identity, status })
                .collect(),
        })
    }

    /// Sets the pause flag.
    ///
    /// # Errors
    ///
    /// `AccessDenied` if the caller is not the owner.
    pub fn set_paused(
        &mut self,
        ctx: &CallContext,
        paused: bool,
    ) -> Result<AdminOutcome, WorldSimError> {
        self.ensure_owner(ctx.caller)?;

        self.pause.set(paused);

        Ok(AdminOutcome {
            events: vec![AuditEvent::PauseUpdated { paused }],
        })
    }

    // =========================================================================
    // DECISION AGGREGATION
    // =========================================================================

    /// Verifies four encrypted deltas and adds them into the KPI counters.
    ///
    /// Preconditions are checked in order, each short-circuiting the rest:
    /// not paused, caller permitted, proof valid. On success every counter is
    /// replaced by `counter + delta` (mod 2^32) and the decision counter by
    /// `count + 1`; the new handles are made usable by this contract and the
    /// caller.
    ///
    /// # Errors
    ///
    /// `ContractPaused`, `NotAuthorized`, `InvalidProof`, or `Coprocessor` if
    /// arithmetic on verified handles fails.
    pub fn apply_encrypted_decision<C>(
        &mut self,
        ctx: &CallContext,
        decision: &EncryptedDecision,
        coprocessor: &C,
    ) -> Result<DecisionOutcome, WorldSimError>
    where
        C: FheCoprocessor + ?Sized,
    {
        if !check_submission_allowed(
            &self.owner,
            &self.registry,
            self.pause.is_paused(),
            &ctx.caller,
        ) {
            // Pause is reported ahead of authorization.
            self.pause.ensure_running()?;
            return Err(WorldSimError::NotAuthorized { caller: ctx.caller });
        }

        let binding = ProofBinding {
            contract: self.contract_address,
            user: ctx.caller,
        };
        let verified = coprocessor
            .verify_inputs(&decision.delta_handles(), &decision.proof, binding)
            .map_err(|e| WorldSimError::InvalidProof(e.to_string()))?;
        if verified.len() != Kpi::ALL.len() {
            return Err(WorldSimError::InvalidProof(format!(
                "expected {} verified handles, got {}",
                Kpi::ALL.len(),
                verified.len()
            )));
        }

        // Stage.
        let mut staged_world = self.world_state;
        for kpi in Kpi::ALL {
            let sum = coprocessor.add(self.world_state.get(kpi), verified[kpi.index()])?;
            staged_world.set(kpi, sum);
        }
        let staged_count = coprocessor.add_scalar(self.decisions_count, 1)?;

        for handle in staged_world.handles().into_iter().chain([staged_count]) {
            coprocessor.allow(handle, self.contract_address)?;
            coprocessor.allow(handle, ctx.caller)?;
        }

        let previous_count = self.decisions_applied;
        let new_count = previous_count.wrapping_add(1);
        if !check_decision_count_invariant(previous_count, new_count) {
            return Err(WorldSimError::InvariantViolation(format!(
                "decision count {previous_count} did not advance to {new_count}"
            )));
        }

        // Commit.
        self.world_state = staged_world;
        self.decisions_count = staged_count;
        self.decisions_applied = new_count;

        Ok(DecisionOutcome {
            previous_count,
            new_count,
            world_state: staged_world,
            decisions_count: staged_count,
            events: vec![
                AuditEvent::DecisionApplied {
                    sender: ctx.caller,
                    timestamp: ctx.timestamp,
                },
                AuditEvent::DecisionCountUpdated {
                    sender: ctx.caller,
                    previous_count,
                    new_count,
                },
            ],
        })
    }

    // =========================================================================
    // READS (never gated)
    // =========================================================================

    /// Address proofs are bound to.
    #[must_use]
    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Contract owner.
    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// The four KPI handles, verbatim.
    #[must_use]
    pub fn get_world_state(&self) -> WorldState {
        self.world_state
    }

    /// The encrypted decision counter.
    #[must_use]
    pub fn get_decisions_count(&self) -> CiphertextHandle {
        self.decisions_count
    }

    /// Cleartext number of committed decisions.
    #[must_use]
    pub fn decisions_applied(&self) -> u32 {
        self.decisions_applied
    }

    /// Owner, or registry row set to `true`.
    #[must_use]
    pub fn is_authorized(&self, identity: &Address) -> bool {
        *identity == self.owner || self.registry.get(identity)
    }

    /// Raw registry row, ignoring ownership.
    #[must_use]
    pub fn authorized_entry(&self, identity: &Address) -> bool {
        self.registry.get(identity)
    }

    /// Pause flag.
    #[must_use]
    pub fn paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// Copy of every mutable field.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            owner: self.owner,
            registry: self.registry.entries(),
            paused: self.pause.is_paused(),
            world_state: self.world_state,
            decisions_count: self.decisions_count,
            decisions_applied: self.decisions_applied,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
