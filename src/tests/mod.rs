mod concurrency_tests;
mod dispute_tests;
mod user_tests;

use crate::core::models::user::User;
use crate::core::services::EsgrowService;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;

pub fn create_test_service() -> EsgrowService<InMemoryLogging, InMemoryStorage> {
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    EsgrowService::new(storage, logging, "test-secret".to_string())
}

pub async fn register_test_user(service: &EsgrowService<InMemoryLogging, InMemoryStorage>, username: &str) -> User {
    let (user, _token) = service
        .register_user(
            username.to_string(),
            format!("{}@example.com", username),
            "hunter2pass".to_string(),
        )
        .await
        .unwrap();
    user
}
