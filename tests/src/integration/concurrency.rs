//! # Concurrent Access
//!
//! Many clients hitting one shared mock from a multi-threaded runtime.

#[cfg(test)]
mod tests {
    use crate::fixtures::{deposit_data, TestEnv, DEPLOYMENT, VAULT};
    use ns_mock::{MockConfig, NodeSetMockApi};
    use std::sync::Arc;

    const CLIENTS: u8 = 16;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_logins_and_uploads() {
        let env = Arc::new(TestEnv::new(MockConfig::default()));
        let nodes: Vec<_> = (0..CLIENTS)
            .map(|i| env.whitelisted_node(&format!("user{i}@example.com")))
            .collect();
        for node in &nodes {
            env.register(node);
        }

        let mut handles = Vec::new();
        for (i, node) in nodes.into_iter().enumerate() {
            let env = Arc::clone(&env);
            handles.push(tokio::spawn(async move {
                let token = env.login(&node);
                let stored = env
                    .mock
                    .upload_deposit_data(
                        &token,
                        DEPLOYMENT,
                        VAULT,
                        vec![deposit_data(i as u8 + 1, VAULT)],
                    )
                    .unwrap();
                (token, stored)
            }));
        }

        let mut tokens = Vec::new();
        for handle in handles {
            let (token, stored) = handle.await.unwrap();
            assert_eq!(stored, 1);
            tokens.push(token);
        }
        tokens.sort();
        tokens.dedup();
        assert_eq!(tokens.len(), CLIENTS as usize);

        let set = env.mock.create_deposit_data_set(DEPLOYMENT, VAULT, 1).unwrap();
        assert_eq!(set.len(), CLIENTS as usize);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_during_revert_see_whole_states() {
        let env = Arc::new(TestEnv::new(MockConfig::default()));
        let (_, token) = env.active_node("alice@example.com");
        let records: Vec<_> = (1..=8).map(|b| deposit_data(b, VAULT)).collect();
        env.mock.snapshot("empty-vault");
        env.mock
            .upload_deposit_data(&token, DEPLOYMENT, VAULT, records)
            .unwrap();
        env.mock.snapshot("full");

        let writer = {
            let env = Arc::clone(&env);
            tokio::spawn(async move {
                for _ in 0..50 {
                    env.mock.revert("empty-vault").unwrap();
                    env.mock.revert("full").unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        let reader = {
            let env = Arc::clone(&env);
            tokio::spawn(async move {
                for _ in 0..200 {
                    let count = env
                        .mock
                        .get_stakewise_validators(&token, DEPLOYMENT, VAULT)
                        .unwrap()
                        .len();
                    assert!(count == 0 || count == 8, "torn read: {count}");
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
    }
}
