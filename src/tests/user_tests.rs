use crate::core::errors::EsgrowError;
use crate::tests::{create_test_service, register_test_user};
use rust_decimal::Decimal;

#[tokio::test]
async fn test_register_and_login() {
    let service = create_test_service();
    let user = register_test_user(&service, "alice").await;
    assert_eq!(user.username, "alice");
    assert_eq!(user.balance, Decimal::ZERO);

    let (logged_in, token) = service.authenticate("alice", "hunter2pass").await.unwrap();
    assert_eq!(logged_in.id, user.id);

    let claims = service.validate_token(&token).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let service = create_test_service();
    register_test_user(&service, "alice").await;

    let result = service.authenticate("alice", "wrong").await;
    assert!(matches!(result, Err(EsgrowError::InvalidCredentials)));
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let service = create_test_service();
    register_test_user(&service, "alice").await;

    let result = service
        .register_user(
            "alice".to_string(),
            "other@example.com".to_string(),
            "hunter2pass".to_string(),
        )
        .await;
    assert!(matches!(result, Err(EsgrowError::UsernameAlreadyRegistered(_))));
}

#[tokio::test]
async fn test_register_invalid_email() {
    let service = create_test_service();
    let result = service
        .register_user("alice".to_string(), "invalid".to_string(), "hunter2pass".to_string())
        .await;
    assert!(matches!(result, Err(EsgrowError::InvalidEmail(_))));
}

#[tokio::test]
async fn test_validate_token_rejects_garbage() {
    let service = create_test_service();
    let result = service.validate_token("not-a-jwt");
    assert!(matches!(result, Err(EsgrowError::Unauthorized(_))));
}
