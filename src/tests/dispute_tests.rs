use crate::core::errors::EsgrowError;
use crate::core::models::dispute::DisputeStage;
use crate::core::models::transaction::TransactionStage;
use crate::tests::{create_test_service, register_test_user};
use rust_decimal::Decimal;

#[tokio::test]
async fn test_dispute_cancels_partially_confirmed_transaction() {
    let service = create_test_service();
    let alice = register_test_user(&service, "alice").await;
    let bob = register_test_user(&service, "bob").await;

    let tx = service
        .create_transaction(alice.id, bob.id, Decimal::new(100, 0), &alice)
        .await
        .unwrap();
    service.confirm_transaction(tx.transaction_id, &alice).await.unwrap();

    let tx = service
        .dispute_transaction(tx.transaction_id, "goods not delivered".to_string(), &bob)
        .await
        .unwrap();

    assert_eq!(tx.stage, TransactionStage::Cancelled);
    // Unilateral cancellation: only the disputing party's confirmation is
    // cleared, the counterparty's flag is left as it was.
    assert!(tx.from_user_confirmed);
    assert!(!tx.to_user_confirmed);
    assert!(tx.to_user_confirmed_date.is_none());
    assert!(!tx.updated_on_users);

    let alice = service.get_user(alice.id).await.unwrap().unwrap();
    let bob_user = service.get_user(bob.id).await.unwrap().unwrap();
    assert_eq!(alice.balance, Decimal::ZERO);
    assert_eq!(bob_user.balance, Decimal::ZERO);

    let disputes = service.get_disputes(tx.transaction_id, &bob).await.unwrap();
    assert_eq!(disputes.len(), 1);
    assert_eq!(disputes[0].user_initiated, bob.id);
    assert_eq!(disputes[0].reason, "goods not delivered");
    assert_eq!(disputes[0].stage, DisputeStage::Disputed);
}

#[tokio::test]
async fn test_dispute_clears_own_confirmation() {
    let service = create_test_service();
    let alice = register_test_user(&service, "alice").await;
    let bob = register_test_user(&service, "bob").await;

    let tx = service
        .create_transaction(alice.id, bob.id, Decimal::new(100, 0), &alice)
        .await
        .unwrap();
    service.confirm_transaction(tx.transaction_id, &alice).await.unwrap();

    let tx = service
        .dispute_transaction(tx.transaction_id, "changed my mind".to_string(), &alice)
        .await
        .unwrap();

    assert_eq!(tx.stage, TransactionStage::Cancelled);
    assert!(!tx.from_user_confirmed);
    assert!(tx.from_user_confirmed_date.is_none());
}

#[tokio::test]
async fn test_dispute_completed_transaction_is_conflict() {
    let service = create_test_service();
    let alice = register_test_user(&service, "alice").await;
    let bob = register_test_user(&service, "bob").await;

    let tx = service
        .create_transaction(alice.id, bob.id, Decimal::new(100, 0), &alice)
        .await
        .unwrap();
    service.confirm_transaction(tx.transaction_id, &alice).await.unwrap();
    service.confirm_transaction(tx.transaction_id, &bob).await.unwrap();

    let result = service
        .dispute_transaction(tx.transaction_id, "too late".to_string(), &alice)
        .await;
    assert!(matches!(result, Err(EsgrowError::TransactionAlreadyCompleted(_))));

    // Settled state and balances are untouched by the rejected dispute.
    let tx = service.get_transaction(tx.transaction_id, &alice).await.unwrap();
    assert_eq!(tx.stage, TransactionStage::Completed);
    assert!(tx.updated_on_users);

    let alice_user = service.get_user(alice.id).await.unwrap().unwrap();
    let bob_user = service.get_user(bob.id).await.unwrap().unwrap();
    assert_eq!(alice_user.balance, Decimal::new(-100, 0));
    assert_eq!(bob_user.balance, Decimal::new(100, 0));

    let disputes = service.get_disputes(tx.transaction_id, &alice).await.unwrap();
    assert!(disputes.is_empty());
}

#[tokio::test]
async fn test_dispute_by_non_party_is_forbidden() {
    let service = create_test_service();
    let alice = register_test_user(&service, "alice").await;
    let bob = register_test_user(&service, "bob").await;
    let mallory = register_test_user(&service, "mallory").await;

    let tx = service
        .create_transaction(alice.id, bob.id, Decimal::new(100, 0), &alice)
        .await
        .unwrap();

    let result = service
        .dispute_transaction(tx.transaction_id, "not mine".to_string(), &mallory)
        .await;
    assert!(matches!(result, Err(EsgrowError::NotTransactionParty(_))));
}

#[tokio::test]
async fn test_cancelled_transaction_cannot_be_revived() {
    let service = create_test_service();
    let alice = register_test_user(&service, "alice").await;
    let bob = register_test_user(&service, "bob").await;

    let tx = service
        .create_transaction(alice.id, bob.id, Decimal::new(100, 0), &alice)
        .await
        .unwrap();
    service.confirm_transaction(tx.transaction_id, &alice).await.unwrap();
    service
        .dispute_transaction(tx.transaction_id, "cancel it".to_string(), &bob)
        .await
        .unwrap();

    // Neither confirming nor re-disputing may touch a cancelled transaction.
    let result = service.confirm_transaction(tx.transaction_id, &bob).await;
    assert!(matches!(result, Err(EsgrowError::TransactionClosed(_, _))));

    let result = service
        .dispute_transaction(tx.transaction_id, "again".to_string(), &alice)
        .await;
    assert!(matches!(result, Err(EsgrowError::TransactionClosed(_, _))));

    let tx = service.get_transaction(tx.transaction_id, &alice).await.unwrap();
    assert_eq!(tx.stage, TransactionStage::Cancelled);
    assert!(!tx.updated_on_users);

    let alice = service.get_user(alice.id).await.unwrap().unwrap();
    assert_eq!(alice.balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_dispute_requires_reason() {
    let service = create_test_service();
    let alice = register_test_user(&service, "alice").await;
    let bob = register_test_user(&service, "bob").await;

    let tx = service
        .create_transaction(alice.id, bob.id, Decimal::new(100, 0), &alice)
        .await
        .unwrap();

    let result = service.dispute_transaction(tx.transaction_id, "  ".to_string(), &bob).await;
    assert!(matches!(result, Err(EsgrowError::InvalidInput(_, _))));
}
