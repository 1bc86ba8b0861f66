//! # World Simulation Service
//!
//! Async front for a deployed [`WorldSimulation`]. Serializes every mutating
//! call behind one write lock, the way the hosting ledger commits one
//! transaction at a time, and publishes the emitted events to the audit log
//! only after the operation committed.
//!
//! Reads share the lock and never wait on the coprocessor.

use crate::adapters::{InMemoryAuditLog, InMemoryCoprocessor, DEFAULT_EVENT_CHANNEL_CAPACITY};
use crate::domain::contract::WorldSimulation;
use crate::domain::entities::{
    AdminOutcome, DecisionOutcome, EncryptedDecision, StateSnapshot, WorldState,
};
use crate::domain::value_objects::{Address, CallContext, CiphertextHandle};
use crate::errors::WorldSimError;
use crate::events::{AuditEvent, AuditRecord};
use crate::ports::inbound::WorldSimulationApi;
use crate::ports::outbound::{AuditPublisher, FheCoprocessor};

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Contract address used by [`create_test_service`].
pub const TEST_CONTRACT_ADDRESS: Address = Address::repeat_byte(0xC0);

/// Owner used by [`create_test_service`].
pub const TEST_OWNER: Address = Address::repeat_byte(0xAA);

/// World Simulation Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Audit log broadcast capacity.
    pub event_channel_capacity: usize,
    /// Log resulting handles of every committed decision.
    pub enable_tracing: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            enable_tracing: false,
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from the environment.
    ///
    /// - `WS_EVENT_CHANNEL_CAPACITY`: broadcast capacity (default: 1024)
    /// - `WS_ENABLE_TRACING`: `true`/`1` to log handles (default: false)
    ///
    /// Unparseable values fall back to the default with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let event_channel_capacity = match lookup("WS_EVENT_CHANNEL_CAPACITY") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    warn!(value = %raw, "Invalid WS_EVENT_CHANNEL_CAPACITY, using default");
                    defaults.event_channel_capacity
                }
            },
            None => defaults.event_channel_capacity,
        };

        let enable_tracing = lookup("WS_ENABLE_TRACING")
            .map_or(defaults.enable_tracing, |v| {
                v.eq_ignore_ascii_case("true") || v == "1"
            });

        Self {
            event_channel_capacity,
            enable_tracing,
        }
    }
}

/// Statistics for the World Simulation Service.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ServiceStats {
    /// Decisions committed.
    pub decisions_applied: u64,
    /// Decisions rejected for any reason.
    pub decisions_rejected: u64,
    /// Owner operations committed.
    pub admin_operations: u64,
    /// Owner operations rejected.
    pub admin_rejected: u64,
    /// Rejections keyed by error label.
    pub rejections_by_reason: BTreeMap<String, u64>,
    /// Audit records published.
    pub events_published: u64,
    /// Average decision application time in microseconds.
    pub avg_decision_time_us: u64,
}

/// The main World Simulation Service.
///
/// This service:
/// 1. Serializes operations against one contract instance
/// 2. Delegates homomorphic work to the injected coprocessor
/// 3. Publishes committed events to the audit publisher
/// 4. Maintains statistics and metrics
pub struct WorldSimulationService<C: FheCoprocessor, P: AuditPublisher> {
    /// Service configuration.
    config: ServiceConfig,
    /// Contract state.
    contract: Arc<RwLock<WorldSimulation>>,
    /// FHE coprocessor.
    coprocessor: Arc<C>,
    /// Audit log sink.
    publisher: Arc<P>,
    /// Service statistics.
    stats: Arc<RwLock<ServiceStats>>,
}

impl<C: FheCoprocessor, P: AuditPublisher> WorldSimulationService<C, P> {
    /// Wraps an existing contract instance.
    pub fn new(
        contract: WorldSimulation,
        coprocessor: Arc<C>,
        publisher: Arc<P>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            config,
            contract: Arc::new(RwLock::new(contract)),
            coprocessor,
            publisher,
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        }
    }

    /// Deploys a fresh contract and wraps it.
    pub fn deploy(
        contract_address: Address,
        owner: Address,
        coprocessor: Arc<C>,
        publisher: Arc<P>,
        config: ServiceConfig,
    ) -> Self {
        info!(contract = %contract_address, owner = %owner, "Deploying world simulation");
        Self::new(
            WorldSimulation::deploy(contract_address, owner),
            coprocessor,
            publisher,
            config,
        )
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        let mut stats = self.stats.read().await.clone();
        stats.events_published = self.publisher.events_published();
        stats
    }

    /// Service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The injected coprocessor.
    #[must_use]
    pub fn coprocessor(&self) -> &Arc<C> {
        &self.coprocessor
    }

    /// The injected audit publisher.
    #[must_use]
    pub fn publisher(&self) -> &Arc<P> {
        &self.publisher
    }

    /// Address proofs must be bound to.
    pub async fn contract_address(&self) -> Address {
        self.contract.read().await.contract_address()
    }

    /// Copy of every mutable field.
    pub async fn snapshot(&self) -> StateSnapshot {
        self.contract.read().await.snapshot()
    }

    /// Cleartext number of committed decisions.
    pub async fn decisions_applied(&self) -> u32 {
        self.contract.read().await.decisions_applied()
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    async fn publish_events(&self, events: &[AuditEvent]) -> Uuid {
        let correlation_id = Uuid::new_v4();
        for event in events {
            let receivers = self
                .publisher
                .publish(AuditRecord {
                    sequence: 0,
                    correlation_id,
                    event: event.clone(),
                })
                .await;
            debug!(topic = event.topic(), receivers, "Audit event emitted");
        }
        correlation_id
    }

    async fn record_admin(
        &self,
        operation: &'static str,
        result: &Result<AdminOutcome, WorldSimError>,
    ) {
        let mut stats = self.stats.write().await;
        match result {
            Ok(_) => {
                stats.admin_operations += 1;
                #[cfg(feature = "metrics")]
                world_telemetry::metric_inc!(world_telemetry::ADMIN_OPERATIONS, &[operation]);
            }
            Err(e) => {
                stats.admin_rejected += 1;
                *stats
                    .rejections_by_reason
                    .entry(e.label().to_string())
                    .or_insert(0) += 1;
                warn!(
                    operation,
                    reason = e.revert_reason(),
                    error = %e,
                    "Owner operation rejected"
                );
            }
        }
    }

    async fn record_decision(
        &self,
        result: &Result<DecisionOutcome, WorldSimError>,
        elapsed_us: u64,
    ) {
        let mut stats = self.stats.write().await;
        match result {
            Ok(_) => {
                stats.decisions_applied += 1;
                let total = stats.decisions_applied;
                stats.avg_decision_time_us =
                    (stats.avg_decision_time_us * (total - 1) + elapsed_us) / total;
                #[cfg(feature = "metrics")]
                world_telemetry::metric_inc!(world_telemetry::DECISIONS_APPLIED);
            }
            Err(e) => {
                stats.decisions_rejected += 1;
                *stats
                    .rejections_by_reason
                    .entry(e.label().to_string())
                    .or_insert(0) += 1;
                #[cfg(feature = "metrics")]
                world_telemetry::metric_inc!(world_telemetry::DECISIONS_REJECTED, &[e.label()]);
            }
        }
    }
}

impl WorldSimulationService<InMemoryCoprocessor, InMemoryAuditLog> {
    /// Deploys with a strict in-memory coprocessor and an audit log sized by
    /// `config.event_channel_capacity`.
    #[must_use]
    pub fn in_memory(contract_address: Address, owner: Address, config: ServiceConfig) -> Self {
        let publisher = Arc::new(InMemoryAuditLog::with_capacity(
            config.event_channel_capacity,
        ));
        Self::deploy(
            contract_address,
            owner,
            Arc::new(InMemoryCoprocessor::new()),
            publisher,
            config,
        )
    }
}

/// Create a service with in-memory adapters, deployed at
/// [`TEST_CONTRACT_ADDRESS`] and owned by [`TEST_OWNER`].
#[must_use]
pub fn create_test_service() -> WorldSimulationService<InMemoryCoprocessor, InMemoryAuditLog> {
    WorldSimulationService::in_memory(TEST_CONTRACT_ADDRESS, TEST_OWNER, ServiceConfig::default())
}

// =============================================================================
// WorldSimulationApi Implementation
// =============================================================================

#[async_trait]
impl<C: FheCoprocessor + 'static, P: AuditPublisher + 'static> WorldSimulationApi
    for WorldSimulationService<C, P>
{
    #[instrument(skip(self, ctx), fields(caller = %ctx.caller))]
    async fn set_authorized(
        &self,
        ctx: &CallContext,
        identity: Address,
        permitted: bool,
    ) -> Result<AdminOutcome, WorldSimError> {
        let mut contract = self.contract.write().await;
        let result = contract.set_authorized(ctx, identity, permitted);
        self.record_admin("set_authorized", &result).await;

        let outcome = result?;
        info!(permitted, "Authorization updated");
        self.publish_events(&outcome.events).await;
        Ok(outcome)
    }

    #[instrument(
        skip(self, ctx, identities, statuses),
        fields(caller = %ctx.caller, len = identities.len())
    )]
    async fn batch_set_authorized(
        &self,
        ctx: &CallContext,
        identities: &[Address],
        statuses: &[bool],
    ) -> Result<AdminOutcome, WorldSimError> {
        let mut contract = self.contract.write().await;
        let result = contract.batch_set_authorized(ctx, identities, statuses);
        self.record_admin("batch_set_authorized", &result).await;

        let outcome = result?;
        info!(rows = outcome.events.len(), "Authorization batch applied");
        self.publish_events(&outcome.events).await;
        Ok(outcome)
    }

    #[instrument(skip(self, ctx), fields(caller = %ctx.caller))]
    async fn set_paused(
        &self,
        ctx: &CallContext,
        paused: bool,
    ) -> Result<AdminOutcome, WorldSimError> {
        let mut contract = self.contract.write().await;
        let result = contract.set_paused(ctx, paused);
        self.record_admin("set_paused", &result).await;

        let outcome = result?;
        #[cfg(feature = "metrics")]
        world_telemetry::CONTRACT_PAUSED.set(if paused { 1.0 } else { 0.0 });
        info!(paused, "Pause switch set");
        self.publish_events(&outcome.events).await;
        Ok(outcome)
    }

    #[instrument(skip(self, ctx, decision), fields(caller = %ctx.caller))]
    async fn apply_encrypted_decision(
        &self,
        ctx: &CallContext,
        decision: EncryptedDecision,
    ) -> Result<DecisionOutcome, WorldSimError> {
        let start = Instant::now();

        let mut contract = self.contract.write().await;
        let result = contract.apply_encrypted_decision(ctx, &decision, self.coprocessor.as_ref());

        let elapsed = start.elapsed();
        #[cfg(feature = "metrics")]
        world_telemetry::DECISION_DURATION.observe(elapsed.as_secs_f64());
        let elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.record_decision(&result, elapsed_us).await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(reason = e.revert_reason(), error = %e, "Decision rejected");
                return Err(e);
            }
        };

        info!(
            previous_count = outcome.previous_count,
            new_count = outcome.new_count,
            elapsed_us,
            "Decision applied"
        );
        if self.config.enable_tracing {
            debug!(
                world_state = ?outcome.world_state,
                decisions_count = %outcome.decisions_count,
                "Committed handles"
            );
        }

        let correlation_id = self.publish_events(&outcome.events).await;
        debug!(%correlation_id, "Decision events published");
        Ok(outcome)
    }

    async fn get_world_state(&self) -> WorldState {
        self.contract.read().await.get_world_state()
    }

    async fn get_decisions_count(&self) -> CiphertextHandle {
        self.contract.read().await.get_decisions_count()
    }

    async fn is_authorized(&self, identity: Address) -> bool {
        self.contract.read().await.is_authorized(&identity)
    }

    async fn authorized_entry(&self, identity: Address) -> bool {
        self.contract.read().await.authorized_entry(&identity)
    }

    async fn paused(&self) -> bool {
        self.contract.read().await.paused()
    }

    async fn owner(&self) -> Address {
        self.contract.read().await.owner()
    }
}

// =============================================================================
// TESTS
// =============================================================================
