//! # Domain Entities
//!
//! World state, decision inputs, and operation outcomes.

use crate::domain::value_objects::{Address, CiphertextHandle, InputProof};
use crate::events::AuditEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// KPI
// =============================================================================

/// One of the four world KPIs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kpi {
    /// Overall world evolution.
    WorldEvolution,
    /// Stability.
    Stability,
    /// Innovation.
    Innovation,
    /// Mystery.
    Mystery,
}

impl Kpi {
    /// All KPIs in submission order.
    pub const ALL: [Kpi; 4] = [
        Kpi::WorldEvolution,
        Kpi::Stability,
        Kpi::Innovation,
        Kpi::Mystery,
    ];

    /// Position in submission order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Kpi::WorldEvolution => 0,
            Kpi::Stability => 1,
            Kpi::Innovation => 2,
            Kpi::Mystery => 3,
        }
    }

    /// Field name as exposed by `getWorldState`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Kpi::WorldEvolution => "worldEvolution",
            Kpi::Stability => "stability",
            Kpi::Innovation => "innovation",
            Kpi::Mystery => "mystery",
        }
    }
}

impl fmt::Display for Kpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// WORLD STATE
// =============================================================================

/// The four encrypted KPI counters.
///
/// Counters start uninitialized and only ever change by homomorphic addition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldState {
    /// Encrypted world evolution.
    pub world_evolution: CiphertextHandle,
    /// Encrypted stability.
    pub stability: CiphertextHandle,
    /// Encrypted innovation.
    pub innovation: CiphertextHandle,
    /// Encrypted mystery.
    pub mystery: CiphertextHandle,
}

impl WorldState {
    /// Handle stored for `kpi`.
    #[must_use]
    pub fn get(&self, kpi: Kpi) -> CiphertextHandle {
        match kpi {
            Kpi::WorldEvolution => self.world_evolution,
            Kpi::Stability => self.stability,
            Kpi::Innovation => self.innovation,
            Kpi::Mystery => self.mystery,
        }
    }

    pub(crate) fn set(&mut self, kpi: Kpi, handle: CiphertextHandle) {
        match kpi {
            Kpi::WorldEvolution => self.world_evolution = handle,
            Kpi::Stability => self.stability = handle,
            Kpi::Innovation => self.innovation = handle,
            Kpi::Mystery => self.mystery = handle,
        }
    }

    /// The handles in submission order.
    #[must_use]
    pub fn handles(&self) -> [CiphertextHandle; 4] {
        Kpi::ALL.map(|kpi| self.get(kpi))
    }

    /// True if no decision has touched the state yet.
    #[must_use]
    pub fn is_uninitialized(&self) -> bool {
        self.handles().iter().all(|h| !h.is_initialized())
    }
}

// =============================================================================
// DECISION INPUT
// =============================================================================

/// Arguments of one `applyEncryptedDecision` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedDecision {
    /// Encrypted delta for world evolution.
    pub world_evolution_delta: CiphertextHandle,
    /// Encrypted delta for stability.
    pub stability_delta: CiphertextHandle,
    /// Encrypted delta for innovation.
    pub innovation_delta: CiphertextHandle,
    /// Encrypted delta for mystery.
    pub mystery_delta: CiphertextHandle,
    /// Proof binding the four handles to the caller and contract.
    pub proof: InputProof,
}

impl EncryptedDecision {
    /// Builds a decision from handles in submission order.
    #[must_use]
    pub fn new(handles: [CiphertextHandle; 4], proof: InputProof) -> Self {
        let [world_evolution_delta, stability_delta, innovation_delta, mystery_delta] = handles;
        Self {
            world_evolution_delta,
            stability_delta,
            innovation_delta,
            mystery_delta,
            proof,
        }
    }

    /// The all-zero dummy payload with an empty proof.
    #[must_use]
    pub fn trivial() -> Self {
        Self::new([CiphertextHandle::ZERO; 4], InputProof::empty())
    }

    /// Delta handle for `kpi`.
    #[must_use]
    pub fn delta(&self, kpi: Kpi) -> CiphertextHandle {
        match kpi {
            Kpi::WorldEvolution => self.world_evolution_delta,
            Kpi::Stability => self.stability_delta,
            Kpi::Innovation => self.innovation_delta,
            Kpi::Mystery => self.mystery_delta,
        }
    }

    /// Delta handles in submission order.
    #[must_use]
    pub fn delta_handles(&self) -> [CiphertextHandle; 4] {
        Kpi::ALL.map(|kpi| self.delta(kpi))
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Result of a committed decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    /// Cleartext count before the decision.
    pub previous_count: u32,
    /// Cleartext count after the decision (wraps with the encrypted counter).
    pub new_count: u32,
    /// World state after the decision.
    pub world_state: WorldState,
    /// Encrypted count after the decision.
    pub decisions_count: CiphertextHandle,
    /// Events emitted, in emission order.
    pub events: Vec<AuditEvent>,
}

/// Result of a committed owner operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminOutcome {
    /// Events emitted, in emission order.
    pub events: Vec<AuditEvent>,
}

// =============================================================================
// DECODED VIEW
// =============================================================================

/// Cleartext world state as recovered by an authorized decryptor.
///
/// Produced off-chain only; the contract never holds one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedWorldState {
    /// World evolution.
    pub world_evolution: u32,
    /// Stability.
    pub stability: u32,
    /// Innovation.
    pub innovation: u32,
    /// Mystery.
    pub mystery: u32,
    /// Decisions applied.
    pub decisions_count: u32,
}

impl DecodedWorldState {
    /// Assembles a view from decryption results. Handles missing from
    /// `results` (uninitialized counters) read as zero.
    #[must_use]
    pub fn from_results(
        world: &WorldState,
        decisions_count: CiphertextHandle,
        results: &BTreeMap<CiphertextHandle, u32>,
    ) -> Self {
        let read = |h: CiphertextHandle| results.get(&h).copied().unwrap_or(0);
        Self {
            world_evolution: read(world.world_evolution),
            stability: read(world.stability),
            innovation: read(world.innovation),
            mystery: read(world.mystery),
            decisions_count: read(decisions_count),
        }
    }

    /// KPI value for `kpi`.
    #[must_use]
    pub fn get(&self, kpi: Kpi) -> u32 {
        match kpi {
            Kpi::WorldEvolution => self.world_evolution,
            Kpi::Stability => self.stability,
            Kpi::Innovation => self.innovation,
            Kpi::Mystery => self.mystery,
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Complete copy of the contract's mutable state.
///
/// Two snapshots compare equal exactly when no observable state differs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Contract owner.
    pub owner: Address,
    /// Registry rows, ordered by identity.
    pub registry: BTreeMap<Address, bool>,
    /// Pause flag.
    pub paused: bool,
    /// KPI counters.
    pub world_state: WorldState,
    /// Encrypted decision count.
    pub decisions_count: CiphertextHandle,
    /// Cleartext decision count.
    pub decisions_applied: u32,
}

// =============================================================================
// TESTS
// =============================================================================
