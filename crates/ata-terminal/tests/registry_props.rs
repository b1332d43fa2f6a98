mod common;

use ata_terminal::SessionId;
use common::create_test_registry;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Create,
    Close(usize),
    Switch(usize),
    Send(String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Create),
        2 => (0usize..8).prop_map(Op::Close),
        2 => (0usize..8).prop_map(Op::Switch),
        2 => "[a-z]{0,4}".prop_map(Op::Send),
    ]
}

proptest! {
    #[test]
    fn active_session_is_always_registered(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let (registry, _gateway) = create_test_registry();
            let mut expected_history: Vec<String> = Vec::new();

            for op in ops {
                match op {
                    Op::Create => {
                        registry.create_session().await.unwrap();
                    }
                    Op::Close(n) => {
                        let ids = registry.session_ids();
                        let target = ids
                            .get(n % ids.len().max(1))
                            .cloned()
                            .unwrap_or_else(|| SessionId::from("missing"));
                        let _ = registry.close_session(&target).await;
                    }
                    Op::Switch(n) => {
                        let ids = registry.session_ids();
                        if let Some(target) = ids.get(n % ids.len().max(1)) {
                            registry.set_active_session(target);
                        }
                    }
                    Op::Send(command) => {
                        if registry.send_command(&command).await.is_ok() {
                            expected_history.push(command);
                        }
                    }
                }

                let ids = registry.session_ids();
                match registry.active_id() {
                    Some(active) => assert!(ids.contains(&active)),
                    None => assert!(ids.is_empty()),
                }
            }

            assert_eq!(registry.history(), expected_history);
            assert!(registry.history().iter().all(|c| !c.is_empty()));
        });
    }
}
