//! # Signature Flow
//!
//! Whitelist and minipool-deposit signatures as a contract would check them:
//! the admin key must recover from the personal-message hash of the encoded
//! subject, and nonces only move when an operator advances them.

#[cfg(test)]
mod tests {
    use crate::fixtures::{TestEnv, CHAIN_ID, DEPLOYMENT, FACTORY, WHITELIST};
    use ns_crypto::recover_personal_signer;
    use ns_mock::signing::{deposit_hash, whitelist_hash, DepositSubject};
    use ns_mock::{MockConfig, MockError, NodeSetMockApi};
    use primitive_types::U256;

    const MINIPOOL: [u8; 20] = [0x3c; 20];

    // =============================================================================
    // WHITELIST
    // =============================================================================

    #[test]
    fn test_whitelist_signature_recovers_to_admin() {
        let env = TestEnv::new(MockConfig::default());
        let (node, token) = env.active_node("alice@example.com");

        let issued = env.mock.get_whitelist_signature(&token, DEPLOYMENT).unwrap();
        assert_eq!(issued.nonce, 0);
        assert_eq!(issued.chain_id, CHAIN_ID);
        assert_eq!(issued.contract, WHITELIST);
        assert!(matches!(issued.signature.v(), 27 | 28));

        let hash = whitelist_hash(&node.address(), &WHITELIST, issued.nonce, CHAIN_ID);
        let signer = recover_personal_signer(&hash, &issued.signature).unwrap();
        assert_eq!(signer, env.admin.address());
    }

    #[test]
    fn test_whitelist_signature_stable_until_nonce_advances() {
        let env = TestEnv::new(MockConfig::default());
        let (node, token) = env.active_node("alice@example.com");

        let first = env.mock.get_whitelist_signature(&token, DEPLOYMENT).unwrap();
        let again = env.mock.get_whitelist_signature(&token, DEPLOYMENT).unwrap();
        assert_eq!(first, again);

        assert_eq!(
            env.mock
                .increment_whitelist_nonce(DEPLOYMENT, node.address())
                .unwrap(),
            1
        );
        let next = env.mock.get_whitelist_signature(&token, DEPLOYMENT).unwrap();
        assert_eq!(next.nonce, 1);
        assert_ne!(next.signature, first.signature);
    }

    #[test]
    fn test_missing_admin_key() {
        let env = TestEnv::new(MockConfig::default());
        env.mock
            .add_deployment("mainnet-dev", 1, WHITELIST, FACTORY)
            .unwrap();
        let (_, token) = env.active_node("alice@example.com");

        let err = env
            .mock
            .get_whitelist_signature(&token, "mainnet-dev")
            .unwrap_err();
        assert_eq!(err, MockError::MissingPrivateKey("mainnet-dev".to_string()));
        assert!(err.is_programmer_error());
    }

    #[test]
    fn test_unknown_deployment() {
        let env = TestEnv::new(MockConfig::default());
        let (_, token) = env.active_node("alice@example.com");
        assert_eq!(
            env.mock.get_whitelist_signature(&token, "nowhere"),
            Err(MockError::DeploymentNotFound("nowhere".to_string()))
        );
    }

    // =============================================================================
    // MINIPOOL DEPOSIT
    // =============================================================================

    #[test]
    fn test_deposit_signature_recovers_to_admin() {
        let env = TestEnv::new(MockConfig::default());
        let (node, token) = env.active_node("alice@example.com");
        let salt = U256::from_big_endian(&rand::random::<[u8; 32]>());

        let issued = env
            .mock
            .get_minipool_deposit_signature(&token, DEPLOYMENT, MINIPOOL, salt)
            .unwrap();
        assert_eq!(issued.contract, FACTORY);

        let hash = deposit_hash(&DepositSubject {
            minipool: MINIPOOL,
            salt,
            node: node.address(),
            factory: FACTORY,
            nonce: issued.nonce,
            chain_id: CHAIN_ID,
        });
        let signer = recover_personal_signer(&hash, &issued.signature).unwrap();
        assert_eq!(signer, env.admin.address());
    }

    #[test]
    fn test_deposit_signature_binds_salt() {
        let env = TestEnv::new(MockConfig::default());
        let (_, token) = env.active_node("alice@example.com");

        let a = env
            .mock
            .get_minipool_deposit_signature(&token, DEPLOYMENT, MINIPOOL, U256::from(1))
            .unwrap();
        let b = env
            .mock
            .get_minipool_deposit_signature(&token, DEPLOYMENT, MINIPOOL, U256::from(2))
            .unwrap();
        assert_eq!(a.nonce, b.nonce);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn test_deposit_nonce_is_independent_of_whitelist_nonce() {
        let env = TestEnv::new(MockConfig::default());
        let (node, token) = env.active_node("alice@example.com");

        env.mock
            .increment_deposit_nonce(DEPLOYMENT, node.address())
            .unwrap();
        assert_eq!(env.mock.deposit_nonce(DEPLOYMENT, &node.address()), Ok(1));
        assert_eq!(env.mock.whitelist_nonce(DEPLOYMENT, &node.address()), Ok(0));

        let issued = env
            .mock
            .get_minipool_deposit_signature(&token, DEPLOYMENT, MINIPOOL, U256::zero())
            .unwrap();
        assert_eq!(issued.nonce, 1);
    }

    #[test]
    fn test_minipool_limit_counts_every_node_of_the_user() {
        let env = TestEnv::new(MockConfig::default());
        env.mock.set_minipool_limit(DEPLOYMENT, Some(1)).unwrap();
        let (first, _) = env.active_node("alice@example.com");
        let (_, second_token) = env.active_node("alice@example.com");

        // The user's first node already holds a minipool, with its exit message.
        let pubkey = crate::fixtures::pubkey(0x01);
        env.mock
            .add_minipool(DEPLOYMENT, first.address(), MINIPOOL, pubkey)
            .unwrap();
        let first_token = env.login(&first);
        env.mock
            .upload_constellation_exits(&first_token, DEPLOYMENT, &[env.sealed_exit(pubkey, 9)])
            .unwrap();

        let err = env
            .mock
            .get_minipool_deposit_signature(&second_token, DEPLOYMENT, [0x3d; 20], U256::one())
            .unwrap_err();
        assert_eq!(
            err,
            MockError::MinipoolLimitReached {
                user: "alice@example.com".to_string(),
                limit: 1,
            }
        );

        // Lifting the cap unblocks the user.
        env.mock.set_minipool_limit(DEPLOYMENT, None).unwrap();
        assert!(env
            .mock
            .get_minipool_deposit_signature(&second_token, DEPLOYMENT, [0x3d; 20], U256::one())
            .is_ok());
    }

    #[test]
    fn test_deposit_blocked_until_exit_message_uploaded() {
        let env = TestEnv::new(MockConfig::default());
        let (node, token) = env.active_node("alice@example.com");
        let pubkey = crate::fixtures::pubkey(0x07);
        env.mock
            .add_minipool(DEPLOYMENT, node.address(), MINIPOOL, pubkey)
            .unwrap();

        assert_eq!(
            env.mock
                .get_minipool_deposit_signature(&token, DEPLOYMENT, [0x3d; 20], U256::one()),
            Err(MockError::MissingExitMessage(pubkey))
        );

        env.mock
            .upload_constellation_exits(&token, DEPLOYMENT, &[env.sealed_exit(pubkey, 70)])
            .unwrap();
        assert!(env
            .mock
            .get_minipool_deposit_signature(&token, DEPLOYMENT, [0x3d; 20], U256::one())
            .is_ok());
    }
}
