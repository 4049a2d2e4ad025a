use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

#[derive(Error, Debug, Serialize)]
pub enum EsgrowError {
    #[error("Username is required")]
    MissingUsername,
    #[error("Username {0} already registered")]
    UsernameAlreadyRegistered(String),
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("Transaction {0} not found")]
    TransactionNotFound(String),
    /// The acting user is neither `from_user` nor `to_user`.
    #[error("User {0} is not a party to the transaction")]
    NotTransactionParty(String),
    /// Completed transactions cannot be disputed.
    #[error("Transaction {0} is already completed")]
    TransactionAlreadyCompleted(String),
    /// Confirm/dispute on a transaction that reached a terminal stage.
    #[error("Transaction {0} is closed in stage {1}")]
    TransactionClosed(String, String),
    #[error("Invalid transaction amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
}
