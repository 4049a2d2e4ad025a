use crate::core::models::transaction::TransactionStage;
use crate::tests::{create_test_service, register_test_user};
use rust_decimal::Decimal;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_confirms_settle_exactly_once() {
    let service = Arc::new(create_test_service());
    let alice = register_test_user(&service, "alice").await;
    let bob = register_test_user(&service, "bob").await;

    // Repeat to give interleavings a chance to show up.
    for round in 0..25 {
        let tx = service
            .create_transaction(alice.id, bob.id, Decimal::new(100, 0), &alice)
            .await
            .unwrap();

        let s1 = service.clone();
        let a = alice.clone();
        let t1 = tokio::spawn(async move { s1.confirm_transaction(tx.transaction_id, &a).await });

        let s2 = service.clone();
        let b = bob.clone();
        let t2 = tokio::spawn(async move { s2.confirm_transaction(tx.transaction_id, &b).await });

        let r1 = t1.await.unwrap().unwrap();
        let r2 = t2.await.unwrap().unwrap();

        // Exactly one of the two confirmations fires the settlement trigger.
        let completed = [&r1, &r2]
            .iter()
            .filter(|t| t.stage == TransactionStage::Completed)
            .count();
        assert_eq!(completed, 1, "round {}: expected exactly one settling confirm", round);

        let tx = service.get_transaction(tx.transaction_id, &alice).await.unwrap();
        assert_eq!(tx.stage, TransactionStage::Completed);
        assert!(tx.updated_on_users);

        let alice_user = service.get_user(alice.id).await.unwrap().unwrap();
        let bob_user = service.get_user(bob.id).await.unwrap().unwrap();
        let settled_rounds = Decimal::new(100 * (round + 1), 0);
        assert_eq!(alice_user.balance, -settled_rounds, "round {}: double debit", round);
        assert_eq!(bob_user.balance, settled_rounds, "round {}: double credit", round);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_confirm_and_dispute_never_settle_and_cancel() {
    let service = Arc::new(create_test_service());
    let alice = register_test_user(&service, "alice").await;
    let bob = register_test_user(&service, "bob").await;

    for _ in 0..25 {
        let tx = service
            .create_transaction(alice.id, bob.id, Decimal::new(100, 0), &alice)
            .await
            .unwrap();
        service.confirm_transaction(tx.transaction_id, &alice).await.unwrap();

        let s1 = service.clone();
        let b = bob.clone();
        let confirm = tokio::spawn(async move { s1.confirm_transaction(tx.transaction_id, &b).await });

        let s2 = service.clone();
        let b2 = bob.clone();
        let dispute =
            tokio::spawn(async move { s2.dispute_transaction(tx.transaction_id, "race".to_string(), &b2).await });

        let confirm = confirm.await.unwrap();
        let dispute = dispute.await.unwrap();

        let tx = service.get_transaction(tx.transaction_id, &alice).await.unwrap();
        match tx.stage {
            // Dispute won the lock: the later confirm must have been rejected.
            TransactionStage::Cancelled => {
                assert!(dispute.is_ok());
                assert!(confirm.is_err());
                assert!(!tx.updated_on_users);
            }
            // Confirm won the lock and settled: the dispute must have been rejected.
            TransactionStage::Completed => {
                assert!(confirm.is_ok());
                assert!(dispute.is_err());
                assert!(tx.updated_on_users);
            }
            other => panic!("unexpected terminal stage {}", other),
        }
    }

    // Whatever the interleavings, conservation held throughout.
    let alice_user = service.get_user(alice.id).await.unwrap().unwrap();
    let bob_user = service.get_user(bob.id).await.unwrap().unwrap();
    assert_eq!(alice_user.balance + bob_user.balance, Decimal::ZERO);
}
