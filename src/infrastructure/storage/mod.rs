use crate::core::errors::EsgrowError;
use crate::core::models::{dispute::Dispute, transaction::EscrowTransaction, user::User};
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence contract for the ledger. Implementations must keep the paired
/// balance update in `apply_settlement` atomic: no caller may ever observe a
/// state where only one of the two balances has moved.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_user(&self, user: User) -> Result<User, EsgrowError>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, EsgrowError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, EsgrowError>;

    async fn save_transaction(&self, transaction: EscrowTransaction) -> Result<(), EsgrowError>;
    async fn get_transaction(&self, transaction_id: Uuid) -> Result<Option<EscrowTransaction>, EsgrowError>;
    async fn get_transactions_for_user(&self, user_id: Uuid) -> Result<Vec<EscrowTransaction>, EsgrowError>;

    /// Atomically debit `from_user`, credit `to_user` by the transaction
    /// amount and persist the settled transaction record, all as one unit.
    /// Fails without side effects if either user row is missing.
    async fn apply_settlement(&self, transaction: EscrowTransaction) -> Result<EscrowTransaction, EsgrowError>;

    async fn save_dispute(&self, dispute: Dispute) -> Result<(), EsgrowError>;
    async fn get_disputes_for_transaction(&self, transaction_id: Uuid) -> Result<Vec<Dispute>, EsgrowError>;
}

pub mod in_memory;
