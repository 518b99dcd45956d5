//! # StakeWise Flow
//!
//! Deposit data from upload through a committed set to registration and
//! exit, across several users and nodes.
//!
//! ## Lifecycle Tested:
//!
//! ```text
//! upload ──→ PENDING ──commit──→ UPLOADED ──register──→ REGISTERED ──exit──→ REMOVED
//! ```

#[cfg(test)]
mod tests {
    use crate::fixtures::{deposit_data, pubkey, TestEnv, DEPLOYMENT, VAULT};
    use ns_mock::{
        decrypt_exit_message, error_keys, DepositData, EncryptedExitData, MockConfig, MockError,
        NodeSetMockApi, ValidatorStatus,
    };

    fn status_of(env: &TestEnv, token: &str, byte: u8) -> ValidatorStatus {
        env.mock
            .get_stakewise_validators(token, DEPLOYMENT, VAULT)
            .unwrap()
            .into_iter()
            .find(|v| v.pubkey == pubkey(byte))
            .map(|v| v.status)
            .unwrap()
    }

    // =============================================================================
    // UPLOAD
    // =============================================================================

    #[test]
    fn test_upload_is_idempotent() {
        let env = TestEnv::new(MockConfig::default());
        let (_, token) = env.active_node("alice@example.com");

        let records = vec![deposit_data(1, VAULT), deposit_data(2, VAULT)];
        assert_eq!(
            env.mock
                .upload_deposit_data(&token, DEPLOYMENT, VAULT, records.clone())
                .unwrap(),
            2
        );
        assert_eq!(
            env.mock
                .upload_deposit_data(&token, DEPLOYMENT, VAULT, records)
                .unwrap(),
            0
        );

        let validators = env
            .mock
            .get_stakewise_validators(&token, DEPLOYMENT, VAULT)
            .unwrap();
        assert_eq!(validators.len(), 2);
        assert!(validators
            .iter()
            .all(|v| v.status == ValidatorStatus::Pending && !v.exit_message_uploaded));
    }

    #[test]
    fn test_client_json_upload_is_served_back_unchanged() {
        let env = TestEnv::new(MockConfig::default());
        let (_, token) = env.active_node("alice@example.com");

        // Deposit file as a client tool writes it: hex fields, no prefix.
        let mut credentials = [0u8; 32];
        credentials[0] = 0x01;
        credentials[12..].copy_from_slice(&VAULT);
        let body = serde_json::json!([{
            "pubkey": hex::encode([0x42u8; 48]),
            "withdrawal_credentials": hex::encode(credentials),
            "amount": 32_000_000_000u64,
            "signature": hex::encode([0x99u8; 96]),
            "deposit_message_root": hex::encode([0x0du8; 32]),
            "deposit_data_root": hex::encode([0x0eu8; 32]),
            "fork_version": "01017000",
            "network_name": "holesky",
        }]);
        let records: Vec<DepositData> = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(records[0].withdrawal_address(), VAULT);

        env.mock
            .upload_deposit_data(&token, DEPLOYMENT, VAULT, records)
            .unwrap();
        let set = env.mock.create_deposit_data_set(DEPLOYMENT, VAULT, 1).unwrap();
        env.mock.commit_deposit_data_set(DEPLOYMENT, VAULT, set).unwrap();

        let served = env.mock.get_deposit_data(&token, DEPLOYMENT, VAULT).unwrap();
        assert_eq!(serde_json::to_value(&served.deposit_data).unwrap(), body);
    }

    #[test]
    fn test_sealed_exit_from_client_json() {
        let env = TestEnv::new(MockConfig::default());
        let (_, token) = env.active_node("alice@example.com");
        env.mock
            .upload_deposit_data(&token, DEPLOYMENT, VAULT, vec![deposit_data(7, VAULT)])
            .unwrap();

        let sealed = env.sealed_exit(pubkey(7), 3).encrypted_exit_message;
        assert!(hex::decode(&sealed).is_ok());
        let body = serde_json::json!([{
            "pubkey": hex::encode([7u8; 48]),
            "encrypted_exit_message": sealed,
        }]);
        let exits: Vec<EncryptedExitData> = serde_json::from_value(body).unwrap();
        assert_eq!(
            env.mock
                .upload_signed_exits(&token, DEPLOYMENT, VAULT, &exits)
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_pubkey_already_held_by_other_node_is_skipped() {
        let env = TestEnv::new(MockConfig::default());
        let (_, alice) = env.active_node("alice@example.com");
        let (_, bob) = env.active_node("bob@example.com");

        env.mock
            .upload_deposit_data(&alice, DEPLOYMENT, VAULT, vec![deposit_data(1, VAULT)])
            .unwrap();
        assert_eq!(
            env.mock
                .upload_deposit_data(&bob, DEPLOYMENT, VAULT, vec![deposit_data(1, VAULT)])
                .unwrap(),
            0
        );
        assert!(env
            .mock
            .get_stakewise_validators(&bob, DEPLOYMENT, VAULT)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_upload_to_wrong_vault_rejects_whole_batch() {
        let env = TestEnv::new(MockConfig::default());
        let (_, token) = env.active_node("alice@example.com");

        let records = vec![deposit_data(1, VAULT), deposit_data(2, [0xBB; 20])];
        let err = env
            .mock
            .upload_deposit_data(&token, DEPLOYMENT, VAULT, records)
            .unwrap_err();
        assert_eq!(err.error_key(), error_keys::INVALID_VAULT);
        assert!(env
            .mock
            .get_stakewise_validators(&token, DEPLOYMENT, VAULT)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_upload_to_unknown_vault() {
        let env = TestEnv::new(MockConfig::default());
        let (_, token) = env.active_node("alice@example.com");
        let other = [0xBB; 20];
        assert_eq!(
            env.mock
                .upload_deposit_data(&token, DEPLOYMENT, other, vec![deposit_data(1, other)]),
            Err(MockError::VaultNotFound(other))
        );
    }

    // =============================================================================
    // DEPOSIT-DATA SETS
    // =============================================================================

    #[test]
    fn test_fair_share_set_takes_one_per_user_in_user_order() {
        let env = TestEnv::new(MockConfig::default());
        let (_, u1) = env.active_node("u1@example.com");
        let (_, u2) = env.active_node("u2@example.com");
        let (_, u3) = env.active_node("u3@example.com");

        env.mock
            .upload_deposit_data(&u1, DEPLOYMENT, VAULT, vec![deposit_data(0x10, VAULT)])
            .unwrap();
        env.mock
            .upload_deposit_data(
                &u2,
                DEPLOYMENT,
                VAULT,
                vec![deposit_data(0x20, VAULT), deposit_data(0x21, VAULT)],
            )
            .unwrap();
        env.mock
            .upload_deposit_data(&u3, DEPLOYMENT, VAULT, vec![deposit_data(0x30, VAULT)])
            .unwrap();

        let set = env.mock.create_deposit_data_set(DEPLOYMENT, VAULT, 1).unwrap();
        let pubkeys: Vec<_> = set.iter().map(|d| d.pubkey).collect();
        assert_eq!(pubkeys, vec![pubkey(0x10), pubkey(0x20), pubkey(0x30)]);

        // Committing consumes them; the next set holds only the leftover.
        assert_eq!(
            env.mock.commit_deposit_data_set(DEPLOYMENT, VAULT, set).unwrap(),
            1
        );
        let next = env.mock.create_deposit_data_set(DEPLOYMENT, VAULT, 1).unwrap();
        assert_eq!(
            next.iter().map(|d| d.pubkey).collect::<Vec<_>>(),
            vec![pubkey(0x21)]
        );
    }

    #[test]
    fn test_committed_set_is_served_with_its_version() {
        let env = TestEnv::new(MockConfig::default());
        let (_, token) = env.active_node("alice@example.com");
        assert_eq!(
            env.mock.get_deposit_data_meta(&token, DEPLOYMENT, VAULT),
            Ok(0)
        );

        env.mock
            .upload_deposit_data(
                &token,
                DEPLOYMENT,
                VAULT,
                vec![deposit_data(1, VAULT), deposit_data(2, VAULT)],
            )
            .unwrap();
        let set = env.mock.create_deposit_data_set(DEPLOYMENT, VAULT, 5).unwrap();
        env.mock
            .commit_deposit_data_set(DEPLOYMENT, VAULT, set.clone())
            .unwrap();

        let served = env.mock.get_deposit_data(&token, DEPLOYMENT, VAULT).unwrap();
        assert_eq!(served.version, 1);
        assert_eq!(served.deposit_data, set);
        assert_eq!(
            env.mock.get_deposit_data_meta(&token, DEPLOYMENT, VAULT),
            Ok(1)
        );
        assert_eq!(status_of(&env, &token, 1), ValidatorStatus::Uploaded);
    }

    // =============================================================================
    // STATUS
    // =============================================================================

    #[test]
    fn test_full_lifecycle() {
        let env = TestEnv::new(MockConfig::default());
        let (_, token) = env.active_node("alice@example.com");
        env.mock
            .upload_deposit_data(&token, DEPLOYMENT, VAULT, vec![deposit_data(1, VAULT)])
            .unwrap();
        assert_eq!(status_of(&env, &token, 1), ValidatorStatus::Pending);

        // Registration needs the validator to be in a committed set first.
        assert!(matches!(
            env.mock
                .mark_validators_registered(DEPLOYMENT, VAULT, &[pubkey(1)]),
            Err(MockError::InvalidStatusTransition { .. })
        ));

        let set = env.mock.create_deposit_data_set(DEPLOYMENT, VAULT, 1).unwrap();
        env.mock.commit_deposit_data_set(DEPLOYMENT, VAULT, set).unwrap();
        env.mock
            .mark_validators_registered(DEPLOYMENT, VAULT, &[pubkey(1)])
            .unwrap();
        assert_eq!(status_of(&env, &token, 1), ValidatorStatus::Registered);

        env.mock
            .mark_validator_removed(DEPLOYMENT, VAULT, &pubkey(1))
            .unwrap();
        assert_eq!(status_of(&env, &token, 1), ValidatorStatus::Removed);

        // Removed is terminal unless an operator overrides it.
        assert!(env
            .mock
            .mark_validators_registered(DEPLOYMENT, VAULT, &[pubkey(1)])
            .is_err());
        env.mock
            .override_validator_status(DEPLOYMENT, VAULT, &pubkey(1), ValidatorStatus::Registered)
            .unwrap();
        assert_eq!(status_of(&env, &token, 1), ValidatorStatus::Registered);
    }

    // =============================================================================
    // EXITS
    // =============================================================================

    #[test]
    fn test_signed_exits_are_stored_decrypted() {
        let env = TestEnv::new(MockConfig::default());
        let (node, token) = env.active_node("alice@example.com");
        env.mock
            .upload_deposit_data(&token, DEPLOYMENT, VAULT, vec![deposit_data(1, VAULT)])
            .unwrap();

        let exit = env.sealed_exit(pubkey(1), 41);
        assert_eq!(
            env.mock
                .upload_signed_exits(&token, DEPLOYMENT, VAULT, &[exit.clone()])
                .unwrap(),
            1
        );

        let validators = env
            .mock
            .get_stakewise_validators(&token, DEPLOYMENT, VAULT)
            .unwrap();
        assert!(validators[0].exit_message_uploaded);

        // The relay identity opens what the client sealed.
        let opened = decrypt_exit_message(Some(&env.relay), &exit.encrypted_exit_message).unwrap();
        assert_eq!(opened.message.validator_index, 41);
    }

    #[test]
    fn test_stakewise_exits_overwrite() {
        let env = TestEnv::new(MockConfig::default());
        let (_, token) = env.active_node("alice@example.com");
        env.mock
            .upload_deposit_data(&token, DEPLOYMENT, VAULT, vec![deposit_data(1, VAULT)])
            .unwrap();

        for index in [1, 2] {
            assert_eq!(
                env.mock
                    .upload_signed_exits(&token, DEPLOYMENT, VAULT, &[env.sealed_exit(pubkey(1), index)])
                    .unwrap(),
                1
            );
        }
    }

    #[test]
    fn test_exit_for_foreign_validator() {
        let env = TestEnv::new(MockConfig::default());
        let (_, alice) = env.active_node("alice@example.com");
        let (_, bob) = env.active_node("bob@example.com");
        env.mock
            .upload_deposit_data(&alice, DEPLOYMENT, VAULT, vec![deposit_data(1, VAULT)])
            .unwrap();

        let err = env
            .mock
            .upload_signed_exits(&bob, DEPLOYMENT, VAULT, &[env.sealed_exit(pubkey(1), 1)])
            .unwrap_err();
        assert_eq!(err.error_key(), error_keys::INVALID_PERMISSIONS);
    }

    #[test]
    fn test_exit_sealed_to_wrong_key() {
        let env = TestEnv::new(MockConfig::default());
        let (_, token) = env.active_node("alice@example.com");
        env.mock
            .upload_deposit_data(&token, DEPLOYMENT, VAULT, vec![deposit_data(1, VAULT)])
            .unwrap();

        let stranger = ns_crypto::RelayIdentity::generate();
        let exit = ns_mock::EncryptedExitData {
            pubkey: pubkey(1),
            encrypted_exit_message: ns_mock::encrypt_exit_message(
                &crate::fixtures::exit_message(1),
                &stranger.recipient().to_hex(),
            )
            .unwrap(),
        };
        assert!(matches!(
            env.mock.upload_signed_exits(&token, DEPLOYMENT, VAULT, &[exit]),
            Err(MockError::CorruptCiphertext(_))
        ));
    }
}
