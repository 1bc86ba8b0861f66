//! # Decision Flow Tests
//!
//! End-to-end flows through `WorldSimulationService`:
//!
//! 1. **Owner → registry → player submission**: encrypted deltas aggregate and
//!    decrypt back for the submitter
//! 2. **Audit fan-out**: a leaderboard subscriber sees every committed decision
//! 3. **Coprocessor failure mid-operation**: nothing is committed
//! 4. **Decryption grants**: only the contract and the latest submitter may
//!    decrypt the current handles

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use uuid::Uuid;

    use world_simulation::prelude::*;

    const ALICE: Address = Address::repeat_byte(0x01);
    const BOB: Address = Address::repeat_byte(0x02);

    type TestService = WorldSimulationService<InMemoryCoprocessor, InMemoryAuditLog>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn ctx(caller: Address) -> CallContext {
        CallContext::at(caller, 1_700_000_000)
    }

    fn encrypt(service: &TestService, user: Address, values: [u32; 4]) -> EncryptedDecision {
        service
            .coprocessor()
            .encrypt_decision(TEST_CONTRACT_ADDRESS, user, values)
    }

    async fn decrypt_as(
        service: &TestService,
        user: Address,
    ) -> Result<DecodedWorldState, CoprocessorError> {
        DecryptionRequest::for_state(
            &service.get_world_state().await,
            service.get_decisions_count().await,
        )
        .decrypt(service.coprocessor(), user)
    }

    /// Coprocessor that fails the Nth homomorphic addition.
    struct FlakyCoprocessor {
        inner: InMemoryCoprocessor,
        adds: AtomicUsize,
        fail_on: usize,
    }

    impl FlakyCoprocessor {
        fn failing_on(fail_on: usize) -> Self {
            Self {
                inner: InMemoryCoprocessor::new(),
                adds: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    impl FheCoprocessor for FlakyCoprocessor {
        fn verify_inputs(
            &self,
            handles: &[CiphertextHandle],
            proof: &InputProof,
            binding: ProofBinding,
        ) -> Result<Vec<CiphertextHandle>, CoprocessorError> {
            self.inner.verify_inputs(handles, proof, binding)
        }

        fn add(
            &self,
            lhs: CiphertextHandle,
            rhs: CiphertextHandle,
        ) -> Result<CiphertextHandle, CoprocessorError> {
            if self.adds.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return Err(CoprocessorError::Unavailable);
            }
            self.inner.add(lhs, rhs)
        }

        fn add_scalar(
            &self,
            lhs: CiphertextHandle,
            scalar: u32,
        ) -> Result<CiphertextHandle, CoprocessorError> {
            self.inner.add_scalar(lhs, scalar)
        }

        fn allow(
            &self,
            handle: CiphertextHandle,
            grantee: Address,
        ) -> Result<(), CoprocessorError> {
            self.inner.allow(handle, grantee)
        }
    }

    // =============================================================================
    // HAPPY PATH
    // =============================================================================

    #[tokio::test]
    async fn test_authorized_user_submission_decrypts() {
        let service = create_test_service();
        service
            .set_authorized(&ctx(TEST_OWNER), ALICE, true)
            .await
            .unwrap();

        service
            .apply_encrypted_decision(&ctx(ALICE), encrypt(&service, ALICE, [3, 5, 7, 2]))
            .await
            .unwrap();

        let decoded = decrypt_as(&service, ALICE).await.unwrap();
        assert_eq!(
            [
                decoded.world_evolution,
                decoded.stability,
                decoded.innovation,
                decoded.mystery
            ],
            [3, 5, 7, 2]
        );
        assert_eq!(decoded.decisions_count, 1);
    }

    #[tokio::test]
    async fn test_batch_authorized_users() {
        let service = create_test_service();
        service
            .batch_set_authorized(&ctx(TEST_OWNER), &[ALICE, BOB], &[true, false])
            .await
            .unwrap();

        assert!(service.is_authorized(ALICE).await);
        assert!(!service.is_authorized(BOB).await);
    }

    #[tokio::test]
    async fn test_fresh_state_decrypts_to_zero() {
        let service = create_test_service();
        assert_eq!(
            decrypt_as(&service, BOB).await.unwrap(),
            DecodedWorldState::default()
        );
    }

    #[tokio::test]
    async fn test_trivial_payload_on_permissive_network() {
        let service = WorldSimulationService::deploy(
            TEST_CONTRACT_ADDRESS,
            TEST_OWNER,
            Arc::new(InMemoryCoprocessor::permissive()),
            Arc::new(InMemoryAuditLog::new()),
            ServiceConfig::default(),
        );

        let outcome = service
            .apply_encrypted_decision(&ctx(TEST_OWNER), EncryptedDecision::trivial())
            .await
            .unwrap();
        assert_eq!(outcome.new_count, 1);

        let decoded = decrypt_as(&service, TEST_OWNER).await.unwrap();
        assert_eq!(decoded.stability, 0);
        assert_eq!(decoded.decisions_count, 1);
    }

    // =============================================================================
    // AUDIT FAN-OUT
    // =============================================================================

    #[tokio::test]
    async fn test_leaderboard_subscriber_counts_decisions() {
        let service = create_test_service();
        let mut leaderboard = service.publisher().subscribe();
        service
            .batch_set_authorized(&ctx(TEST_OWNER), &[ALICE, BOB], &[true, true])
            .await
            .unwrap();

        for user in [ALICE, BOB, ALICE] {
            service
                .apply_encrypted_decision(&ctx(user), encrypt(&service, user, [1, 1, 1, 1]))
                .await
                .unwrap();
        }

        let mut applied: HashMap<Address, u32> = HashMap::new();
        let mut last_count = 0;
        // 2 authorization records + 3 × 2 decision records.
        for _ in 0..8 {
            let record = timeout(Duration::from_millis(100), leaderboard.recv())
                .await
                .expect("timeout waiting for record")
                .expect("should receive record");
            assert_ne!(record.correlation_id, Uuid::nil());
            match record.event {
                AuditEvent::DecisionApplied { sender, .. } => {
                    *applied.entry(sender).or_insert(0) += 1;
                }
                AuditEvent::DecisionCountUpdated { new_count, .. } => last_count = new_count,
                _ => {}
            }
        }

        assert_eq!(applied.get(&ALICE), Some(&2));
        assert_eq!(applied.get(&BOB), Some(&1));
        assert_eq!(last_count, 3);
        assert_eq!(service.publisher().records_for(ALICE).len(), 5);
    }

    // =============================================================================
    // FAILURE ATOMICITY
    // =============================================================================

    #[tokio::test]
    async fn test_coprocessor_failure_commits_nothing() {
        // Third addition of the second decision fails.
        let coprocessor = Arc::new(FlakyCoprocessor::failing_on(7));
        let audit = Arc::new(InMemoryAuditLog::new());
        let service = WorldSimulationService::deploy(
            TEST_CONTRACT_ADDRESS,
            TEST_OWNER,
            Arc::clone(&coprocessor),
            Arc::clone(&audit),
            ServiceConfig::default(),
        );

        let first = coprocessor
            .inner
            .encrypt_decision(TEST_CONTRACT_ADDRESS, TEST_OWNER, [1, 2, 3, 4]);
        service
            .apply_encrypted_decision(&ctx(TEST_OWNER), first)
            .await
            .unwrap();
        let before = service.snapshot().await;
        let published = audit.events_published();

        let second = coprocessor
            .inner
            .encrypt_decision(TEST_CONTRACT_ADDRESS, TEST_OWNER, [1, 1, 1, 1]);
        let err = service
            .apply_encrypted_decision(&ctx(TEST_OWNER), second)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            WorldSimError::Coprocessor(CoprocessorError::Unavailable)
        );
        assert!(check_unchanged_on_failure(&before, &service.snapshot().await));
        assert_eq!(audit.events_published(), published);
    }

    #[tokio::test]
    async fn test_pause_round_trip() {
        let service = create_test_service();
        service.set_paused(&ctx(TEST_OWNER), true).await.unwrap();
        let before = service.snapshot().await;

        let err = service
            .apply_encrypted_decision(&ctx(TEST_OWNER), encrypt(&service, TEST_OWNER, [1, 1, 1, 1]))
            .await
            .unwrap_err();
        assert_eq!(err, WorldSimError::ContractPaused);
        assert_eq!(service.snapshot().await, before);

        service.set_paused(&ctx(TEST_OWNER), false).await.unwrap();
        service
            .apply_encrypted_decision(&ctx(TEST_OWNER), encrypt(&service, TEST_OWNER, [1, 1, 1, 1]))
            .await
            .unwrap();
        assert_ne!(service.get_world_state().await, before.world_state);
        assert_eq!(service.decisions_applied().await, 1);
    }

    // =============================================================================
    // DECRYPTION GRANTS
    // =============================================================================

    #[tokio::test]
    async fn test_only_latest_submitter_can_decrypt() {
        let service = create_test_service();
        service
            .batch_set_authorized(&ctx(TEST_OWNER), &[ALICE, BOB], &[true, true])
            .await
            .unwrap();

        service
            .apply_encrypted_decision(&ctx(ALICE), encrypt(&service, ALICE, [2, 2, 2, 2]))
            .await
            .unwrap();
        assert!(decrypt_as(&service, ALICE).await.is_ok());
        assert!(matches!(
            decrypt_as(&service, BOB).await,
            Err(CoprocessorError::AccessNotAllowed { .. })
        ));

        service
            .apply_encrypted_decision(&ctx(BOB), encrypt(&service, BOB, [1, 0, 0, 0]))
            .await
            .unwrap();
        assert_eq!(decrypt_as(&service, BOB).await.unwrap().world_evolution, 3);
        assert!(decrypt_as(&service, ALICE).await.is_err());

        let state = service.get_world_state().await;
        for handle in state.handles() {
            assert!(service
                .coprocessor()
                .is_allowed(handle, TEST_CONTRACT_ADDRESS));
        }
    }

    // =============================================================================
    // SCENARIOS
    // =============================================================================

    #[tokio::test]
    async fn test_recommendations_follow_decrypted_state() {
        let service = create_test_service();
        let fresh = decrypt_as(&service, TEST_OWNER).await.unwrap();
        assert_eq!(recommended_scenarios(&fresh)[0].id, "crisis-management");

        let full_throttle = find_scenario("tech-breakthrough")
            .and_then(|s| s.option("Full Throttle").cloned())
            .unwrap();
        for _ in 0..12 {
            service
                .apply_encrypted_decision(
                    &ctx(TEST_OWNER),
                    encrypt(&service, TEST_OWNER, full_throttle.deltas.to_wire()),
                )
                .await
                .unwrap();
        }

        let decoded = decrypt_as(&service, TEST_OWNER).await.unwrap();
        assert_eq!(decode_signed(decoded.innovation), 72);
        assert_eq!(decode_signed(decoded.stability), -24);

        let ids: Vec<String> = recommended_scenarios(&decoded)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids[0], "tech-breakthrough");
        assert_eq!(ids[1], "crisis-management");
        assert_eq!(ids.len(), 4);
    }
}
