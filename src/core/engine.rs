use crate::core::errors::EsgrowError;
use crate::core::models::transaction::{EscrowTransaction, TransactionStage};
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// The transaction settlement state machine.
///
/// Owns the lifecycle of an escrow transaction: creation, bilateral
/// confirmation, the settlement trigger that moves the amount between the
/// two user balances exactly once, and dispute-driven cancellation.
///
/// Confirm and dispute are read-modify-write cycles, so all operations on
/// the same `transaction_id` are serialized through a per-transaction mutex.
/// Without it, two near-simultaneous confirmations could each observe the
/// counterparty as unconfirmed and settle twice, or a confirmation could
/// clobber a concurrent cancellation.
pub struct SettlementEngine<S: Storage> {
    storage: Arc<S>,
    locks: RwLock<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<S: Storage> SettlementEngine<S> {
    pub fn new(storage: Arc<S>) -> Self {
        SettlementEngine {
            storage,
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Record a new escrow transaction in `Initiated` stage. Funds are only
    /// notionally escrowed at this point, no balance is touched until both
    /// parties confirm.
    pub async fn create(
        &self,
        from_user: Uuid,
        to_user: Uuid,
        amount: Decimal,
    ) -> Result<EscrowTransaction, EsgrowError> {
        if amount < Decimal::ZERO {
            return Err(EsgrowError::InvalidAmount(amount.to_string()));
        }
        if self.storage.get_user(from_user).await?.is_none() {
            return Err(EsgrowError::UserNotFound(from_user.to_string()));
        }
        if self.storage.get_user(to_user).await?.is_none() {
            return Err(EsgrowError::UserNotFound(to_user.to_string()));
        }

        let transaction = EscrowTransaction::new(from_user, to_user, amount);
        self.storage.save_transaction(transaction.clone()).await?;
        info!(
            "Escrow transaction {} created: {} -> {} amount {}",
            transaction.transaction_id, from_user, to_user, amount
        );
        Ok(transaction)
    }

    /// Record a party's confirmation and evaluate the settlement trigger.
    ///
    /// Confirming twice as the same party is a no-op on the flags. Confirming
    /// a transaction in a terminal stage fails with `TransactionClosed`; the
    /// original system allowed a cancelled transaction to be confirmed back
    /// into completion, which is rejected here.
    pub async fn confirm(&self, transaction_id: Uuid, actor: Uuid) -> Result<EscrowTransaction, EsgrowError> {
        let lock = self.lock_for(transaction_id).await;
        let _guard = lock.lock().await;

        let mut transaction = self.load(transaction_id).await?;
        self.ensure_party(&transaction, actor)?;
        if transaction.stage.is_terminal() {
            warn!(
                "Rejected confirmation of closed transaction {} by {}",
                transaction_id, actor
            );
            return Err(EsgrowError::TransactionClosed(
                transaction_id.to_string(),
                transaction.stage.to_string(),
            ));
        }

        let now = Utc::now();
        if actor == transaction.from_user && !transaction.from_user_confirmed {
            transaction.from_user_confirmed = true;
            transaction.from_user_confirmed_date = Some(now);
        }
        if actor == transaction.to_user && !transaction.to_user_confirmed {
            transaction.to_user_confirmed = true;
            transaction.to_user_confirmed_date = Some(now);
        }
        transaction.modified_date = now;
        if transaction.stage == TransactionStage::Initiated {
            transaction.stage = TransactionStage::Pending;
        }

        self.settle_or_save(transaction).await
    }

    /// Unilateral withdrawal by either party. Clears only the disputing
    /// party's confirmation but cancels the transaction outright, even if
    /// the counterparty had already confirmed. Completed transactions cannot
    /// be disputed.
    pub async fn dispute(&self, transaction_id: Uuid, actor: Uuid) -> Result<EscrowTransaction, EsgrowError> {
        let lock = self.lock_for(transaction_id).await;
        let _guard = lock.lock().await;

        let mut transaction = self.load(transaction_id).await?;
        self.ensure_party(&transaction, actor)?;
        match transaction.stage {
            TransactionStage::Completed => {
                return Err(EsgrowError::TransactionAlreadyCompleted(transaction_id.to_string()));
            }
            TransactionStage::Cancelled => {
                return Err(EsgrowError::TransactionClosed(
                    transaction_id.to_string(),
                    transaction.stage.to_string(),
                ));
            }
            TransactionStage::Initiated | TransactionStage::Pending => {}
        }

        if actor == transaction.from_user {
            transaction.from_user_confirmed = false;
            transaction.from_user_confirmed_date = None;
        }
        if actor == transaction.to_user {
            transaction.to_user_confirmed = false;
            transaction.to_user_confirmed_date = None;
        }
        transaction.stage = TransactionStage::Cancelled;
        transaction.modified_date = Utc::now();

        self.storage.save_transaction(transaction.clone()).await?;
        info!("Escrow transaction {} cancelled by dispute from {}", transaction_id, actor);
        Ok(transaction)
    }

    pub async fn get(&self, transaction_id: Uuid) -> Result<EscrowTransaction, EsgrowError> {
        self.load(transaction_id).await
    }

    /// The settlement trigger. Invoked deterministically after every
    /// confirmation write, inside the same per-transaction critical section:
    /// if the amount is positive and both parties have confirmed, the paired
    /// balance update is applied through the store as a single atomic unit
    /// and the transaction completes. The trigger can fire at most once per
    /// transaction because completion is terminal.
    async fn settle_or_save(&self, mut transaction: EscrowTransaction) -> Result<EscrowTransaction, EsgrowError> {
        if transaction.amount > Decimal::ZERO && transaction.both_confirmed() {
            transaction.updated_on_users = true;
            transaction.time_updated_on_users = Some(transaction.modified_date);
            transaction.stage = TransactionStage::Completed;
            let settled = self.storage.apply_settlement(transaction).await?;
            info!(
                "Escrow transaction {} settled: {} moved from {} to {}",
                settled.transaction_id, settled.amount, settled.from_user, settled.to_user
            );
            return Ok(settled);
        }

        debug!(
            "Transaction {} not yet settleable (stage {}, from_confirmed {}, to_confirmed {})",
            transaction.transaction_id,
            transaction.stage,
            transaction.from_user_confirmed,
            transaction.to_user_confirmed
        );
        self.storage.save_transaction(transaction.clone()).await?;
        Ok(transaction)
    }

    async fn load(&self, transaction_id: Uuid) -> Result<EscrowTransaction, EsgrowError> {
        self.storage
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| EsgrowError::TransactionNotFound(transaction_id.to_string()))
    }

    fn ensure_party(&self, transaction: &EscrowTransaction, actor: Uuid) -> Result<(), EsgrowError> {
        if !transaction.is_party(actor) {
            warn!(
                "User {} acted on transaction {} without being a party",
                actor, transaction.transaction_id
            );
            return Err(EsgrowError::NotTransactionParty(actor.to_string()));
        }
        Ok(())
    }

    /// Per-transaction mutex, created on first use. Entries are small and
    /// per-process; the registry lives as long as the engine.
    async fn lock_for(&self, transaction_id: Uuid) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(&transaction_id) {
                return lock.clone();
            }
        }
        let mut locks = self.locks.write().await;
        locks
            .entry(transaction_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
