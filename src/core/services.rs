use crate::auth::jwt::{Claims, JwtService};
use crate::constants::{
    TRANSACTION_CONFIRMED, TRANSACTION_CREATED, TRANSACTION_DISPUTED, TRANSACTION_SETTLED, TRANSACTIONS_QUERIED,
    USER_LOGGED_IN, USER_REGISTERED,
};
use crate::core::engine::SettlementEngine;
use crate::core::errors::{EsgrowError, FieldError};
use crate::core::models::{
    dispute::Dispute,
    transaction::{EscrowTransaction, TransactionStage},
    user::User,
};
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use log::{info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Transactions a user is involved in, partitioned by role.
#[derive(Serialize, Deserialize, Debug, ToSchema, Clone)]
pub struct UserTransactionsResponse {
    from_user: Vec<EscrowTransaction>,
    to_user: Vec<EscrowTransaction>,
}

impl UserTransactionsResponse {
    pub fn from_user(&self) -> &Vec<EscrowTransaction> {
        &self.from_user
    }

    pub fn to_user(&self) -> &Vec<EscrowTransaction> {
        &self.to_user
    }
}

/// External-facing transaction service: authorizes the acting user,
/// validates input, delegates to the settlement engine and records
/// application logs. Balance and stage mutations live in the engine, not
/// here.
pub struct EsgrowService<L: LoggingService, S: Storage> {
    storage: Arc<S>,
    engine: SettlementEngine<S>,
    logging: L,
    jwt_service: JwtService,
}

impl<L: LoggingService, S: Storage> EsgrowService<L, S> {
    pub fn new(storage: S, logging: L, jwt_secret: String) -> Self {
        let storage = Arc::new(storage);
        EsgrowService {
            engine: SettlementEngine::new(storage.clone()),
            storage,
            logging,
            jwt_service: JwtService::new(jwt_secret),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, EsgrowError> {
        self.jwt_service.validate_token(token)
    }

    // USERS

    pub async fn register_user(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<(User, String), EsgrowError> {
        if username.trim().is_empty() {
            return Err(EsgrowError::MissingUsername);
        }
        self.validate_string_input("username", &username, 200)?;
        if !email.contains('@') || !email.contains('.') || email.len() < 5 {
            return Err(EsgrowError::InvalidEmail(email));
        }
        if password.is_empty() {
            return Err(EsgrowError::InvalidInput(
                "password".to_string(),
                FieldError {
                    field: "password".to_string(),
                    title: "Invalid password".to_string(),
                    description: "Password cannot be empty".to_string(),
                },
            ));
        }

        let hashed = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
            .map_err(|e| EsgrowError::InternalServerError(format!("Password hashing error: {}", e)))?;
        let user = self.storage.create_user(User::new(username, email, hashed)).await?;
        info!("Registered user {} ({})", user.username, user.id);

        let token = self.jwt_service.generate_token(&user.id.to_string(), "USER")?;
        self.logging
            .log_action(
                USER_REGISTERED,
                json!({ "user_id": user.id, "username": user.username }),
                Some(user.id),
            )
            .await?;
        Ok((user, token))
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(User, String), EsgrowError> {
        let user = self
            .storage
            .get_user_by_username(username)
            .await?
            .ok_or(EsgrowError::InvalidCredentials)?;

        if !bcrypt::verify(password, &user.password)
            .map_err(|e| EsgrowError::InternalServerError(format!("Password verification error: {}", e)))?
        {
            warn!("Failed login attempt for {}", username);
            return Err(EsgrowError::InvalidCredentials);
        }

        let token = self.jwt_service.generate_token(&user.id.to_string(), "USER")?;
        self.logging
            .log_action(USER_LOGGED_IN, json!({ "user_id": user.id }), Some(user.id))
            .await?;
        Ok((user, token))
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, EsgrowError> {
        self.storage.get_user(user_id).await
    }

    // TRANSACTIONS

    pub async fn create_transaction(
        &self,
        from_user_id: Uuid,
        to_user_id: Uuid,
        amount: Decimal,
        created_by: &User,
    ) -> Result<EscrowTransaction, EsgrowError> {
        // Only the two named parties may open an escrow between them.
        if created_by.id != from_user_id && created_by.id != to_user_id {
            return Err(EsgrowError::NotTransactionParty(created_by.id.to_string()));
        }

        let transaction = self.engine.create(from_user_id, to_user_id, amount).await?;
        self.logging
            .log_action(
                TRANSACTION_CREATED,
                json!({
                    "transaction_id": transaction.transaction_id,
                    "from_user": from_user_id,
                    "to_user": to_user_id,
                    "amount": amount,
                }),
                Some(created_by.id),
            )
            .await?;
        Ok(transaction)
    }

    pub async fn get_transaction(&self, transaction_id: Uuid, actor: &User) -> Result<EscrowTransaction, EsgrowError> {
        let transaction = self.engine.get(transaction_id).await?;
        if !transaction.is_party(actor.id) {
            return Err(EsgrowError::NotTransactionParty(actor.id.to_string()));
        }
        Ok(transaction)
    }

    pub async fn list_transactions_for_user(&self, user: &User) -> Result<UserTransactionsResponse, EsgrowError> {
        let transactions = self.storage.get_transactions_for_user(user.id).await?;
        let (from_user, to_user) = transactions
            .into_iter()
            .partition(|t: &EscrowTransaction| t.from_user == user.id);

        self.logging
            .log_action(TRANSACTIONS_QUERIED, json!({ "user_id": user.id }), Some(user.id))
            .await?;
        Ok(UserTransactionsResponse { from_user, to_user })
    }

    pub async fn confirm_transaction(
        &self,
        transaction_id: Uuid,
        actor: &User,
    ) -> Result<EscrowTransaction, EsgrowError> {
        let transaction = self.engine.confirm(transaction_id, actor.id).await?;

        self.logging
            .log_action(
                TRANSACTION_CONFIRMED,
                json!({ "transaction_id": transaction_id, "stage": transaction.stage }),
                Some(actor.id),
            )
            .await?;
        if transaction.stage == TransactionStage::Completed {
            self.logging
                .log_action(
                    TRANSACTION_SETTLED,
                    json!({
                        "transaction_id": transaction_id,
                        "amount": transaction.amount,
                        "from_user": transaction.from_user,
                        "to_user": transaction.to_user,
                    }),
                    Some(actor.id),
                )
                .await?;
        }
        Ok(transaction)
    }

    /// Dispute handling: the engine rejects disputes on completed
    /// transactions and cancels everything else; a dispute record with the
    /// caller's reason is kept only when the cancellation went through.
    pub async fn dispute_transaction(
        &self,
        transaction_id: Uuid,
        reason: String,
        actor: &User,
    ) -> Result<EscrowTransaction, EsgrowError> {
        self.validate_string_input("reason", &reason, 300)?;

        let transaction = self.engine.dispute(transaction_id, actor.id).await?;
        self.storage
            .save_dispute(Dispute::new(transaction_id, actor.id, reason.clone()))
            .await?;

        self.logging
            .log_action(
                TRANSACTION_DISPUTED,
                json!({ "transaction_id": transaction_id, "reason": reason }),
                Some(actor.id),
            )
            .await?;
        Ok(transaction)
    }

    pub async fn get_disputes(&self, transaction_id: Uuid, actor: &User) -> Result<Vec<Dispute>, EsgrowError> {
        let transaction = self.engine.get(transaction_id).await?;
        if !transaction.is_party(actor.id) {
            return Err(EsgrowError::NotTransactionParty(actor.id.to_string()));
        }
        self.storage.get_disputes_for_transaction(transaction_id).await
    }

    pub async fn get_app_logs(&self) -> Result<Vec<crate::core::models::audit::AppLog>, EsgrowError> {
        self.logging.get_logs().await
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), EsgrowError> {
        if value.trim().is_empty() {
            return Err(EsgrowError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("Invalid {}", field),
                    description: format!("{} cannot be empty", field),
                },
            ));
        }
        if value.len() > max_length {
            return Err(EsgrowError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("{} Too Long", field),
                    description: format!("{} cannot exceed {} characters", field, max_length),
                },
            ));
        }
        Ok(())
    }
}
