//! # Telemetry Tests
//!
//! Metrics and audit publishing observed from outside the service.
//!
//! Prometheus counters are process-global and other tests run in parallel,
//! so metric assertions compare against a baseline and allow for growth.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use world_simulation::prelude::*;
    use world_telemetry::{
        gather_metrics, register_metrics, ADMIN_OPERATIONS, CONTRACT_PAUSED, DECISIONS_APPLIED,
        DECISIONS_REJECTED, DECISION_DURATION,
    };

    const ALICE: Address = Address::repeat_byte(0x01);
    const MALLORY: Address = Address::repeat_byte(0x66);

    fn ctx(caller: Address) -> CallContext {
        CallContext::at(caller, 1_700_000_000)
    }

    /// Publisher that keeps records in a plain list and has no subscribers.
    #[derive(Default)]
    struct RecordingPublisher {
        records: Mutex<Vec<AuditRecord>>,
        published: AtomicU64,
    }

    #[async_trait]
    impl AuditPublisher for RecordingPublisher {
        async fn publish(&self, record: AuditRecord) -> usize {
            self.records.lock().push(record);
            self.published.fetch_add(1, Ordering::Relaxed);
            0
        }

        fn events_published(&self) -> u64 {
            self.published.load(Ordering::Relaxed)
        }
    }

    // =============================================================================
    // PROMETHEUS
    // =============================================================================

    #[tokio::test]
    async fn test_metrics_exported_after_operations() {
        register_metrics().unwrap();
        let applied_before = DECISIONS_APPLIED.get();
        let rejected_before = DECISIONS_REJECTED
            .with_label_values(&["not_authorized"])
            .get();
        let admin_before = ADMIN_OPERATIONS
            .with_label_values(&["set_authorized"])
            .get();
        let samples_before = DECISION_DURATION.get_sample_count();

        let service = create_test_service();
        service
            .set_authorized(&ctx(TEST_OWNER), ALICE, true)
            .await
            .unwrap();
        let decision = service
            .coprocessor()
            .encrypt_decision(TEST_CONTRACT_ADDRESS, ALICE, [1, 2, 3, 4]);
        service
            .apply_encrypted_decision(&ctx(ALICE), decision)
            .await
            .unwrap();
        let denied = service
            .coprocessor()
            .encrypt_decision(TEST_CONTRACT_ADDRESS, MALLORY, [1, 1, 1, 1]);
        assert!(service
            .apply_encrypted_decision(&ctx(MALLORY), denied)
            .await
            .is_err());

        assert!(DECISIONS_APPLIED.get() >= applied_before + 1.0);
        assert!(
            DECISIONS_REJECTED
                .with_label_values(&["not_authorized"])
                .get()
                >= rejected_before + 1.0
        );
        assert!(
            ADMIN_OPERATIONS
                .with_label_values(&["set_authorized"])
                .get()
                >= admin_before + 1.0
        );
        assert!(DECISION_DURATION.get_sample_count() >= samples_before + 2);

        let text = gather_metrics().unwrap();
        for name in [
            "ws_decisions_applied_total",
            "ws_decisions_rejected_total",
            "ws_admin_operations_total",
            "ws_decision_duration_seconds",
            "ws_contract_paused",
        ] {
            assert!(text.contains(name), "missing {name}");
        }
    }

    #[tokio::test]
    async fn test_pause_gauge_tracks_switch() {
        register_metrics().unwrap();
        let service = create_test_service();

        service.set_paused(&ctx(TEST_OWNER), true).await.unwrap();
        let paused_text = gather_metrics().unwrap();
        service.set_paused(&ctx(TEST_OWNER), false).await.unwrap();

        // Other tests may flip the gauge concurrently; only the exposition
        // format is asserted here.
        assert!(paused_text.contains("# TYPE ws_contract_paused gauge"));
        assert!((0.0..=1.0).contains(&CONTRACT_PAUSED.get()));
    }

    // =============================================================================
    // AUDIT PORT
    // =============================================================================

    #[tokio::test]
    async fn test_custom_publisher_receives_ordered_records() {
        let publisher = Arc::new(RecordingPublisher::default());
        let service = WorldSimulationService::deploy(
            TEST_CONTRACT_ADDRESS,
            TEST_OWNER,
            Arc::new(InMemoryCoprocessor::new()),
            Arc::clone(&publisher),
            ServiceConfig::default(),
        );

        service
            .batch_set_authorized(&ctx(TEST_OWNER), &[ALICE, MALLORY], &[true, false])
            .await
            .unwrap();
        let decision = service
            .coprocessor()
            .encrypt_decision(TEST_CONTRACT_ADDRESS, ALICE, [0, 0, 0, 1]);
        service
            .apply_encrypted_decision(&ctx(ALICE), decision)
            .await
            .unwrap();
        assert!(service.set_paused(&ctx(MALLORY), true).await.is_err());

        let records = publisher.records.lock().clone();
        assert_eq!(records.len(), 4);
        assert_eq!(service.stats().await.events_published, 4);

        // One correlation id per operation.
        assert_eq!(records[0].correlation_id, records[1].correlation_id);
        assert_eq!(records[2].correlation_id, records[3].correlation_id);
        assert_ne!(records[1].correlation_id, records[2].correlation_id);

        assert_eq!(records[0].event.topic(), topics::GOVERNANCE);
        assert_eq!(records[2].event.topic(), topics::DECISIONS);
        assert!(matches!(
            records[3].event,
            AuditEvent::DecisionCountUpdated {
                previous_count: 0,
                new_count: 1,
                ..
            }
        ));
    }
}
