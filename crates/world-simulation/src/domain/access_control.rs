//! # Access Control
//!
//! The owner-governed authorization registry and the emergency pause switch.
//! Both are plain data; ownership checks live on the contract.

use crate::domain::value_objects::Address;
use crate::errors::WorldSimError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of rows in one batch registry update.
pub const MAX_BATCH_SIZE: usize = 50;

// =============================================================================
// AUTHORIZATION REGISTRY
// =============================================================================

/// Mapping of identity to decision-submission permission.
///
/// Rows are never deleted; revoking flips a row to `false`. A missing row
/// reads as `false`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRegistry {
    entries: BTreeMap<Address, bool>,
}

impl AuthorizationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw registry row for `identity`.
    #[must_use]
    pub fn get(&self, identity: &Address) -> bool {
        self.entries.get(identity).copied().unwrap_or(false)
    }

    /// Writes one row.
    pub fn set(&mut self, identity: Address, permitted: bool) {
        self.entries.insert(identity, permitted);
    }

    /// Writes pre-validated rows in input order. Later duplicates win.
    pub fn apply_batch(&mut self, rows: &[(Address, bool)]) {
        for (identity, permitted) in rows {
            self.entries.insert(*identity, *permitted);
        }
    }

    /// Number of rows ever written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no row was ever written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of every row.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<Address, bool> {
        self.entries.clone()
    }
}

/// Validates a batch update and pairs the two sequences.
///
/// Length equality is checked before size so a mismatched oversized batch
/// reports `LengthMismatch`.
pub fn stage_batch(
    identities: &[Address],
    statuses: &[bool],
) -> Result<Vec<(Address, bool)>, WorldSimError> {
    if identities.len() != statuses.len() {
        return Err(WorldSimError::LengthMismatch {
            identities: identities.len(),
            statuses: statuses.len(),
        });
    }
    if identities.is_empty() || identities.len() > MAX_BATCH_SIZE {
        return Err(WorldSimError::BatchTooLarge {
            len: identities.len(),
            max: MAX_BATCH_SIZE,
        });
    }
    Ok(identities
        .iter()
        .copied()
        .zip(statuses.iter().copied())
        .collect())
}

// =============================================================================
// PAUSE SWITCH
// =============================================================================

/// Emergency gate over decision submission. Reads are never gated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSwitch {
    paused: bool,
}

impl PauseSwitch {
    /// Current flag.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Sets the flag unconditionally.
    pub fn set(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Fails with `ContractPaused` while the switch is on.
    pub fn ensure_running(&self) -> Result<(), WorldSimError> {
        if self.paused {
            Err(WorldSimError::ContractPaused)
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
