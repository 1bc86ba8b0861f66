//! # Access Control Tests
//!
//! Registry and pause switch behaviour at the API boundary:
//!
//! - Owner-only mutation, whoever else calls
//! - Batch shape rules (equal lengths, `1..=50` rows) with no partial writes
//! - Null identity rejection on single-entry updates
//! - Reads available to anyone, in any pause state

#[cfg(test)]
mod tests {
    use world_simulation::prelude::*;

    const ALICE: Address = Address::repeat_byte(0x01);
    const BOB: Address = Address::repeat_byte(0x02);
    const MALLORY: Address = Address::repeat_byte(0x66);

    fn ctx(caller: Address) -> CallContext {
        CallContext::at(caller, 1_700_000_000)
    }

    fn identities(n: usize) -> Vec<Address> {
        (0..n)
            .map(|i| {
                let mut bytes = [0u8; 20];
                bytes[0] = 0x10;
                bytes[18..].copy_from_slice(&u16::try_from(i).unwrap().to_be_bytes());
                Address::new(bytes)
            })
            .collect()
    }

    // =============================================================================
    // OWNER-ONLY OPERATIONS
    // =============================================================================

    #[tokio::test]
    async fn test_non_owner_cannot_mutate() {
        let service = create_test_service();
        let before = service.snapshot().await;

        let results = [
            service.set_authorized(&ctx(MALLORY), MALLORY, true).await,
            service
                .batch_set_authorized(&ctx(MALLORY), &[MALLORY], &[true])
                .await,
            service.set_paused(&ctx(MALLORY), true).await,
        ];
        for result in results {
            let err = result.unwrap_err();
            assert_eq!(err, WorldSimError::AccessDenied { caller: MALLORY });
            assert_eq!(err.revert_reason(), "Only owner");
        }
        assert_eq!(service.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_authorized_user_is_not_an_admin() {
        let service = create_test_service();
        service
            .set_authorized(&ctx(TEST_OWNER), ALICE, true)
            .await
            .unwrap();

        assert!(matches!(
            service.set_authorized(&ctx(ALICE), BOB, true).await,
            Err(WorldSimError::AccessDenied { .. })
        ));
        assert!(!service.is_authorized(BOB).await);
    }

    #[tokio::test]
    async fn test_owner_cannot_deauthorize_self() {
        let service = create_test_service();
        service
            .set_authorized(&ctx(TEST_OWNER), TEST_OWNER, false)
            .await
            .unwrap();

        assert!(!service.authorized_entry(TEST_OWNER).await);
        assert!(service.is_authorized(TEST_OWNER).await);
    }

    // =============================================================================
    // NULL IDENTITY
    // =============================================================================

    #[tokio::test]
    async fn test_zero_identity_rejected_regardless_of_caller() {
        let service = create_test_service();
        for caller in [TEST_OWNER, ALICE, Address::ZERO] {
            for permitted in [true, false] {
                let err = service
                    .set_authorized(&ctx(caller), Address::ZERO, permitted)
                    .await
                    .unwrap_err();
                assert_eq!(err, WorldSimError::InvalidIdentity);
            }
        }
        assert!(service.snapshot().await.registry.is_empty());
    }

    // =============================================================================
    // BATCH SHAPE
    // =============================================================================

    #[tokio::test]
    async fn test_batch_of_exactly_fifty_succeeds() {
        let service = create_test_service();
        let users = identities(MAX_BATCH_SIZE);
        let outcome = service
            .batch_set_authorized(&ctx(TEST_OWNER), &users, &vec![true; MAX_BATCH_SIZE])
            .await
            .unwrap();

        assert_eq!(outcome.events.len(), MAX_BATCH_SIZE);
        for user in users {
            assert!(service.is_authorized(user).await);
        }
    }

    #[tokio::test]
    async fn test_batch_size_bounds() {
        let service = create_test_service();
        let before = service.snapshot().await;

        for len in [0, MAX_BATCH_SIZE + 1, 200] {
            let err = service
                .batch_set_authorized(&ctx(TEST_OWNER), &identities(len), &vec![true; len])
                .await
                .unwrap_err();
            assert!(matches!(err, WorldSimError::BatchTooLarge { .. }));
            assert_eq!(err.revert_reason(), "Invalid batch size");
        }
        assert_eq!(service.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_length_mismatch_reported_before_size() {
        let service = create_test_service();
        let err = service
            .batch_set_authorized(&ctx(TEST_OWNER), &identities(60), &[true; 3])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WorldSimError::LengthMismatch {
                identities: 60,
                statuses: 3
            }
        );
        assert!(service.snapshot().await.registry.is_empty());
    }

    #[tokio::test]
    async fn test_batch_duplicates_last_write_wins() {
        let service = create_test_service();
        service
            .batch_set_authorized(
                &ctx(TEST_OWNER),
                &[ALICE, BOB, ALICE, BOB],
                &[false, true, true, false],
            )
            .await
            .unwrap();

        assert!(service.authorized_entry(ALICE).await);
        assert!(!service.authorized_entry(BOB).await);
    }

    #[tokio::test]
    async fn test_batch_rows_persist_as_false_after_revocation() {
        let service = create_test_service();
        service
            .batch_set_authorized(&ctx(TEST_OWNER), &[ALICE, BOB], &[true, true])
            .await
            .unwrap();
        service
            .batch_set_authorized(&ctx(TEST_OWNER), &[ALICE], &[false])
            .await
            .unwrap();

        let registry = service.snapshot().await.registry;
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&ALICE), Some(&false));
    }

    // =============================================================================
    // PAUSE
    // =============================================================================

    #[tokio::test]
    async fn test_reads_unaffected_by_pause() {
        let service = create_test_service();
        service
            .set_authorized(&ctx(TEST_OWNER), ALICE, true)
            .await
            .unwrap();
        service.set_paused(&ctx(TEST_OWNER), true).await.unwrap();
        service.set_paused(&ctx(TEST_OWNER), true).await.unwrap();

        assert!(service.paused().await);
        assert!(service.is_authorized(ALICE).await);
        assert_eq!(service.get_decisions_count().await, CiphertextHandle::ZERO);
        assert!(service.get_world_state().await.is_uninitialized());
        assert_eq!(service.owner().await, TEST_OWNER);
    }

    #[tokio::test]
    async fn test_owner_operations_allowed_while_paused() {
        let service = create_test_service();
        service.set_paused(&ctx(TEST_OWNER), true).await.unwrap();

        service
            .set_authorized(&ctx(TEST_OWNER), ALICE, true)
            .await
            .unwrap();
        assert!(service.is_authorized(ALICE).await);
    }
}
