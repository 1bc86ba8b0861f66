//! # Audit Events
//!
//! Append-only records emitted by the world simulation on every committed
//! state change. The core never reads these back; they exist for external
//! observers (leaderboards, timelines, dashboards).
//!
//! | Event | Emitted by | Payload |
//! |-------|-----------|---------|
//! | `DecisionApplied` | `apply_encrypted_decision` | sender, timestamp |
//! | `DecisionCountUpdated` | `apply_encrypted_decision` | sender, previous, new |
//! | `AuthorizationUpdated` | `set_authorized`, `batch_set_authorized` | identity, status |
//! | `PauseUpdated` | `set_paused` | paused |

use crate::domain::value_objects::Address;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// EVENTS
// =============================================================================

/// An audit event produced by a committed operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum AuditEvent {
    /// A decision was aggregated into the world state.
    DecisionApplied {
        /// Submitting identity.
        sender: Address,
        /// Ledger execution timestamp.
        timestamp: u64,
    },
    /// The decision counter advanced.
    DecisionCountUpdated {
        /// Submitting identity.
        sender: Address,
        /// Count before this decision.
        previous_count: u32,
        /// Count after this decision.
        new_count: u32,
    },
    /// A registry row was written.
    AuthorizationUpdated {
        /// Registry key.
        identity: Address,
        /// New permission.
        status: bool,
    },
    /// The pause switch was set.
    PauseUpdated {
        /// New flag value.
        paused: bool,
    },
}

impl AuditEvent {
    /// Routing topic for this event.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::DecisionApplied { .. } | Self::DecisionCountUpdated { .. } => topics::DECISIONS,
            Self::AuthorizationUpdated { .. } | Self::PauseUpdated { .. } => topics::GOVERNANCE,
        }
    }

    /// The identity the event is indexed by, if any.
    #[must_use]
    pub fn indexed_sender(&self) -> Option<Address> {
        match self {
            Self::DecisionApplied { sender, .. } | Self::DecisionCountUpdated { sender, .. } => {
                Some(*sender)
            }
            Self::AuthorizationUpdated { identity, .. } => Some(*identity),
            Self::PauseUpdated { .. } => None,
        }
    }
}

/// An event as persisted in the audit log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Position in the log, assigned on append.
    pub sequence: u64,
    /// Identifier shared by all records of one operation.
    pub correlation_id: Uuid,
    /// The event.
    pub event: AuditEvent,
}

// =============================================================================
// TOPICS
// =============================================================================

/// Audit topics.
pub mod topics {
    /// Decision aggregation events.
    pub const DECISIONS: &str = "world.decisions";
    /// Registry and pause switch events.
    pub const GOVERNANCE: &str = "world.governance";
}

// =============================================================================
// TESTS
// =============================================================================
