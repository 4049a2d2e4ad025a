use crate::core::errors::EsgrowError;
use crate::core::models::{dispute::Dispute, transaction::EscrowTransaction, user::User};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    users_by_username: Arc<RwLock<HashMap<String, Uuid>>>,
    transactions: Arc<RwLock<HashMap<Uuid, EscrowTransaction>>>,
    disputes: Arc<RwLock<HashMap<Uuid, Vec<Dispute>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            users: Arc::new(RwLock::new(HashMap::new())),
            users_by_username: Arc::new(RwLock::new(HashMap::new())),
            transactions: Arc::new(RwLock::new(HashMap::new())),
            disputes: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_user(&self, user: User) -> Result<User, EsgrowError> {
        let mut users_by_username = self.users_by_username.write().await;
        if users_by_username.contains_key(&user.username) {
            return Err(EsgrowError::UsernameAlreadyRegistered(user.username));
        }
        users_by_username.insert(user.username.clone(), user.id);
        let mut users = self.users.write().await;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, EsgrowError> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, EsgrowError> {
        let users_by_username = self.users_by_username.read().await;
        let users = self.users.read().await;
        Ok(users_by_username.get(username).and_then(|id| users.get(id).cloned()))
    }

    async fn save_transaction(&self, transaction: EscrowTransaction) -> Result<(), EsgrowError> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(transaction.transaction_id, transaction);
        Ok(())
    }

    async fn get_transaction(&self, transaction_id: Uuid) -> Result<Option<EscrowTransaction>, EsgrowError> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(&transaction_id).cloned())
    }

    async fn get_transactions_for_user(&self, user_id: Uuid) -> Result<Vec<EscrowTransaction>, EsgrowError> {
        let transactions = self.transactions.read().await;
        let mut found: Vec<EscrowTransaction> = transactions
            .values()
            .filter(|t| t.is_party(user_id))
            .cloned()
            .collect();
        found.sort_by_key(|t| t.created_date);
        Ok(found)
    }

    async fn apply_settlement(&self, transaction: EscrowTransaction) -> Result<EscrowTransaction, EsgrowError> {
        // Both balance mutations and the transaction write happen under the
        // users write lock, so no reader sees a half-applied settlement.
        let mut users = self.users.write().await;
        if !users.contains_key(&transaction.from_user) {
            return Err(EsgrowError::UserNotFound(transaction.from_user.to_string()));
        }
        if !users.contains_key(&transaction.to_user) {
            return Err(EsgrowError::UserNotFound(transaction.to_user.to_string()));
        }

        let now = transaction.modified_date;
        if let Some(from) = users.get_mut(&transaction.from_user) {
            from.balance -= transaction.amount;
            from.modified_date = now;
        }
        if let Some(to) = users.get_mut(&transaction.to_user) {
            to.balance += transaction.amount;
            to.modified_date = now;
        }

        let mut transactions = self.transactions.write().await;
        transactions.insert(transaction.transaction_id, transaction.clone());
        Ok(transaction)
    }

    async fn save_dispute(&self, dispute: Dispute) -> Result<(), EsgrowError> {
        let mut disputes = self.disputes.write().await;
        disputes
            .entry(dispute.transaction_id)
            .or_insert_with(Vec::new)
            .push(dispute);
        Ok(())
    }

    async fn get_disputes_for_transaction(&self, transaction_id: Uuid) -> Result<Vec<Dispute>, EsgrowError> {
        let disputes = self.disputes.read().await;
        Ok(disputes.get(&transaction_id).cloned().unwrap_or_default())
    }
}
