//! # Domain Invariants
//!
//! Predicates that must hold across every operation on the world simulation.
//!
//! | Invariant | Check |
//! |-----------|-------|
//! | Decisions require (owner or authorized) and not paused | `check_submission_allowed` |
//! | Batch shape: equal lengths, 1..=50 rows | `access_control::stage_batch` |
//! | Null identity never authorized singly | `check_identity_invariant` |
//! | Decision count advances by exactly one | `check_decision_count_invariant` |
//! | Failed operations leave state untouched | `check_unchanged_on_failure` |

use crate::domain::access_control::AuthorizationRegistry;
use crate::domain::entities::StateSnapshot;
use crate::domain::value_objects::Address;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// A decision may be applied only by the owner or an authorized identity,
/// and only while not paused.
#[must_use]
pub fn check_submission_allowed(
    owner: &Address,
    registry: &AuthorizationRegistry,
    paused: bool,
    caller: &Address,
) -> bool {
    let permitted = caller == owner || registry.get(caller);
    permitted && !paused
}

/// The null identity is never a valid single-entry registry key.
#[must_use]
pub fn check_identity_invariant(identity: &Address) -> bool {
    !identity.is_zero()
}

/// The cleartext count advances by exactly one per committed decision,
/// modulo 2^32 like the encrypted counter it shadows.
#[must_use]
pub fn check_decision_count_invariant(previous: u32, new: u32) -> bool {
    previous.wrapping_add(1) == new
}

/// A rejected operation must leave every observable field as it was.
#[must_use]
pub fn check_unchanged_on_failure(before: &StateSnapshot, after: &StateSnapshot) -> bool {
    before == after
}

/// KPI counters only ever move forward from the uninitialized handle: once a
/// counter is written it is never reset. One operation moves the cleartext
/// count by at most one step.
#[must_use]
pub fn check_counters_never_reset(before: &StateSnapshot, after: &StateSnapshot) -> bool {
    let counters_ok = before
        .world_state
        .handles()
        .iter()
        .zip(after.world_state.handles().iter())
        .all(|(b, a)| !b.is_initialized() || a.is_initialized());
    let count_ok =
        !before.decisions_count.is_initialized() || after.decisions_count.is_initialized();
    let step = after.decisions_applied.wrapping_sub(before.decisions_applied);
    counters_ok && count_ok && step <= 1
}

// =============================================================================
// TESTS
// =============================================================================
