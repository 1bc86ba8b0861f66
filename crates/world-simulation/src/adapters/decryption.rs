//! # Out-of-Band Decryption
//!
//! Client-side helper that turns the handles returned by `get_world_state`
//! and `get_decisions_count` into a cleartext [`DecodedWorldState`].
//!
//! Only initialized handles are sent for decryption. The uninitialized
//! handle is an encryption of zero by convention and has no ACL entry, so it
//! is resolved locally.

use crate::adapters::coprocessor::InMemoryCoprocessor;
use crate::domain::entities::{DecodedWorldState, WorldState};
use crate::domain::value_objects::{Address, CiphertextHandle};
use crate::errors::CoprocessorError;
use tracing::debug;

/// A batch of handles to decrypt for one world-state read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptionRequest {
    world: WorldState,
    decisions_count: CiphertextHandle,
    handles: Vec<CiphertextHandle>,
}

impl DecryptionRequest {
    /// Selects the initialized handles among the KPI counters and the
    /// decision counter.
    #[must_use]
    pub fn for_state(world: &WorldState, decisions_count: CiphertextHandle) -> Self {
        let handles = world
            .handles()
            .into_iter()
            .chain([decisions_count])
            .filter(CiphertextHandle::is_initialized)
            .collect();
        Self {
            world: *world,
            decisions_count,
            handles,
        }
    }

    /// Handles that need the coprocessor.
    #[must_use]
    pub fn handles(&self) -> &[CiphertextHandle] {
        &self.handles
    }

    /// True when nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Decrypts the request on behalf of `user`.
    ///
    /// # Errors
    ///
    /// Fails if `user` was never granted one of the selected handles.
    pub fn decrypt(
        &self,
        coprocessor: &InMemoryCoprocessor,
        user: Address,
    ) -> Result<DecodedWorldState, CoprocessorError> {
        if self.is_empty() {
            debug!("World state uninitialized, nothing to decrypt");
            return Ok(DecodedWorldState::default());
        }
        let results = coprocessor.user_decrypt_many(&self.handles, user)?;
        debug!(handles = self.handles.len(), %user, "Decrypted world state");
        Ok(DecodedWorldState::from_results(
            &self.world,
            self.decisions_count,
            &results,
        ))
    }
}

// =============================================================================
// TESTS
// =============================================================================
